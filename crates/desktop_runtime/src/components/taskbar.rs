use desktop_app_contract::{AppDescriptor, ApplicationId};

use super::*;
use crate::{
    apps,
    model::WindowId,
    taskbar::{
        activate_launcher, chooser_entries, instance_dots, launcher_dom_id, open_action,
        LauncherActivation,
    },
};

#[derive(Debug, Clone, PartialEq)]
struct ChooserState {
    app_id: ApplicationId,
    descriptor: AppDescriptor,
    window_ids: Vec<WindowId>,
}

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let chooser = create_rw_signal(None::<ChooserState>);
    let catalog = store_value(apps::app_catalog());

    let activate = move |descriptor: AppDescriptor| {
        let activation = state.with_untracked(|desktop| activate_launcher(desktop, &descriptor));
        match activation {
            LauncherActivation::Open(action) => {
                chooser.set(None);
                runtime.dispatch_action(action);
            }
            LauncherActivation::Focus(window_id) => {
                chooser.set(None);
                runtime.dispatch_action(DesktopAction::Focus { window_id });
            }
            LauncherActivation::Choose(window_ids) => {
                let Some(app_id) = descriptor.app_id.clone() else {
                    return;
                };
                let already_open = chooser
                    .with_untracked(|open| open.as_ref().is_some_and(|c| c.app_id == app_id));
                chooser.set((!already_open).then_some(ChooserState {
                    app_id,
                    descriptor,
                    window_ids,
                }));
            }
        }
    };
    let choose = move |window_id: WindowId| {
        chooser.set(None);
        runtime.dispatch_action(DesktopAction::Focus { window_id });
    };
    let toggle_window = move |window_id: WindowId| {
        runtime.dispatch_action(DesktopAction::ToggleTaskbarWindow { window_id });
    };
    let open_another = move |_| {
        let Some(ChooserState { descriptor, .. }) = chooser.get_untracked() else {
            return;
        };
        chooser.set(None);
        runtime.dispatch_action(open_action(&descriptor));
    };
    let toggle_expanded = move |_| {
        let expanded = state.with_untracked(|desktop| desktop.chrome.taskbar.expanded);
        runtime.dispatch_action(DesktopAction::SetTaskbarExpanded {
            expanded: !expanded,
        });
    };
    let expanded = move || state.with(|desktop| desktop.chrome.taskbar.expanded);

    view! {
        <nav
            class=move || {
                format!(
                    "taskbar taskbar-{}",
                    state.with(|desktop| desktop.chrome.taskbar.placement.token())
                )
            }
            aria-label="Taskbar"
        >
            <ul class="taskbar-launchers">
                {catalog
                    .get_value()
                    .into_iter()
                    .map(|descriptor| {
                        let app_id = descriptor.app_id.clone();
                        let dom_id = app_id.as_ref().map(launcher_dom_id);
                        let title = descriptor.title.clone();
                        let icon = descriptor.icon.clone();
                        let dots_app_id = app_id.clone();
                        let dots = move || {
                            dots_app_id
                                .as_ref()
                                .map(|id| state.with(|desktop| instance_dots(desktop, id)))
                                .unwrap_or_default()
                        };
                        view! {
                            <li class="taskbar-launcher-item">
                                <button
                                    id=dom_id
                                    class="taskbar-launcher"
                                    title=title.clone()
                                    on:mousedown=move |ev| stop_mouse_event(&ev)
                                    on:click=move |_| activate(descriptor.clone())
                                >
                                    <span class="taskbar-launcher-icon" aria-hidden="true">
                                        {icon}
                                    </span>
                                    <Show when=expanded fallback=|| ()>
                                        <span class="taskbar-launcher-label">{title.clone()}</span>
                                    </Show>
                                </button>
                                <div class="taskbar-instance-dots">
                                    <For each=dots key=|dot| *dot let:dot>
                                        <button
                                            type="button"
                                            class=dot.class_name()
                                            aria-label=format!("Window {}", dot.window_id.0)
                                            aria-pressed=dot.focused.to_string()
                                            on:mousedown=move |ev| stop_mouse_event(&ev)
                                            on:click=move |_| toggle_window(dot.window_id)
                                        />
                                    </For>
                                </div>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
            <Show when=move || chooser.with(Option::is_some) fallback=|| ()>
                <ul class="taskbar-chooser" role="menu">
                    {move || {
                        let window_ids = chooser
                            .get()
                            .map(|c| c.window_ids)
                            .unwrap_or_default();
                        state
                            .with(|desktop| chooser_entries(desktop, &window_ids))
                            .into_iter()
                            .map(|entry| {
                                let window_id = entry.window_id;
                                view! {
                                    <li role="menuitem">
                                        <button
                                            type="button"
                                            class:minimized=entry.minimized
                                            on:click=move |_| choose(window_id)
                                        >
                                            {entry.label}
                                        </button>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                    <li role="menuitem" class="taskbar-chooser-new">
                        <button type="button" on:click=open_another>
                            "New window"
                        </button>
                    </li>
                </ul>
            </Show>
            <button
                type="button"
                class="taskbar-expand-toggle"
                aria-pressed=move || expanded().to_string()
                on:click=toggle_expanded
            >
                {move || if expanded() { "<" } else { ">" }}
            </button>
        </nav>
    }
}

//! Built-in app catalog. Each entry is a small placeholder app that talks to the shell only
//! through its [`WindowControl`] and the message bus.

use desktop_app_contract::{AppContent, AppDescriptor, ApplicationId, Size, WindowControl};
use leptos::*;
use serde_json::{json, Value};

use crate::{app_bus::MessageBus, shell_service::SHELL_SERVICE};

pub const ME_APP_ID: &str = "me";
pub const EXPLORER_APP_ID: &str = "explorer";
pub const BROWSER_APP_ID: &str = "browser";
pub const SETTINGS_APP_ID: &str = "settings";

/// Channel the explorer broadcasts item selections on.
pub const EXPLORER_SELECTION_CHANNEL: &str = "explorer.selection";

const EXPLORER_ITEMS: [&str; 4] = ["Projects", "Resume.pdf", "Photos", "notes.txt"];

/// Every app the taskbar can launch, in launcher order.
pub fn app_catalog() -> Vec<AppDescriptor> {
    vec![
        AppDescriptor::new("About me", AppContent::new(mount_me), Size::new(520, 420))
            .with_app_id(ApplicationId::trusted(ME_APP_ID))
            .with_icon("person"),
        AppDescriptor::new(
            "Explorer",
            AppContent::new(mount_explorer),
            Size::new(640, 440),
        )
        .with_app_id(ApplicationId::trusted(EXPLORER_APP_ID))
        .with_icon("folder")
        .with_min_size(Size::new(320, 220)),
        AppDescriptor::new("Browser", AppContent::new(mount_browser), Size::new(800, 560))
            .with_app_id(ApplicationId::trusted(BROWSER_APP_ID))
            .with_icon("globe")
            .with_min_size(Size::new(360, 240)),
        AppDescriptor::new(
            "Settings",
            AppContent::new(mount_settings),
            Size::new(460, 380),
        )
        .with_app_id(ApplicationId::trusted(SETTINGS_APP_ID))
        .with_icon("gear"),
    ]
}

pub fn descriptor_for(app_id: &ApplicationId) -> Option<AppDescriptor> {
    app_catalog()
        .into_iter()
        .find(|descriptor| descriptor.app_id.as_ref() == Some(app_id))
}

fn mount_me(control: WindowControl) -> View {
    view! { <MeApp control=control /> }.into_view()
}

fn mount_explorer(control: WindowControl) -> View {
    view! { <ExplorerApp control=control /> }.into_view()
}

fn mount_browser(control: WindowControl) -> View {
    view! { <BrowserApp control=control /> }.into_view()
}

fn mount_settings(control: WindowControl) -> View {
    view! { <SettingsApp control=control /> }.into_view()
}

#[component]
fn MeApp(control: WindowControl) -> impl IntoView {
    let last_selection = create_rw_signal(None::<String>);

    if let Some(bus) = use_context::<MessageBus>() {
        let subscription = bus.subscribe(ME_APP_ID, EXPLORER_SELECTION_CHANNEL, move |message| {
            let name = message
                .data
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| "selection message without a name".to_string())?;
            last_selection.set(Some(name.to_string()));
            Ok(())
        });
        on_cleanup(move || subscription.unsubscribe());
    }

    let window_id = control.window_id();
    view! {
        <div class="app-shell app-me">
            <h2>"Hello!"</h2>
            <p>"This desktop runs entirely in your browser."</p>
            <p class="app-muted">{format!("Window #{window_id}")}</p>
            <Show when=move || last_selection.get().is_some() fallback=|| ()>
                <p class="app-note">
                    {move || format!("You just looked at {}.", last_selection.get().unwrap_or_default())}
                </p>
            </Show>
        </div>
    }
}

#[component]
fn ExplorerApp(control: WindowControl) -> impl IntoView {
    let selected = create_rw_signal(None::<&'static str>);
    let bus = use_context::<MessageBus>();

    let refresh_control = control.clone();
    control.set_free_slot(Some(
        view! {
            <button
                type="button"
                class="titlebar-slot-button"
                on:click=move |_| {
                    selected.set(None);
                    refresh_control.set_subtitle(Some(format!("{} items", EXPLORER_ITEMS.len())));
                }
            >
                "Refresh"
            </button>
        }
        .into_view(),
    ));

    let select = move |name: &'static str| {
        selected.set(Some(name));
        control.set_subtitle(Some(name.to_string()));
        if let Some(bus) = bus.as_ref() {
            bus.send_message(
                EXPLORER_APP_ID,
                EXPLORER_SELECTION_CHANNEL,
                json!({ "name": name }),
                None,
            );
        }
    };

    view! {
        <div class="app-shell app-explorer">
            <ul class="explorer-list" role="listbox">
                {EXPLORER_ITEMS
                    .iter()
                    .map(|name| {
                        let select = select.clone();
                        let name = *name;
                        view! {
                            <li
                                role="option"
                                class:selected=move || selected.get() == Some(name)
                                on:click=move |_| select(name)
                            >
                                {name}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}

#[component]
fn BrowserApp(control: WindowControl) -> impl IntoView {
    let address = create_rw_signal("https://example.org".to_string());
    let dark_frame = create_rw_signal(false);

    let navigate_control = control.clone();
    let navigate = move |_| {
        navigate_control.set_subtitle(Some(address.get_untracked()));
    };
    let toggle_frame = move |_| {
        let dark = !dark_frame.get_untracked();
        dark_frame.set(dark);
        control.set_window_color(dark.then(|| "#1f2933".to_string()));
    };

    view! {
        <div class="app-shell app-browser">
            <div class="app-toolbar">
                <input
                    type="url"
                    class="browser-address"
                    prop:value=move || address.get()
                    on:input=move |ev| address.set(event_target_value(&ev))
                />
                <button type="button" on:click=navigate>"Go"</button>
                <button type="button" on:click=toggle_frame>
                    {move || if dark_frame.get() { "Light frame" } else { "Dark frame" }}
                </button>
            </div>
            <div class="browser-viewport">
                <p>{move || format!("Viewing {}", address.get())}</p>
            </div>
        </div>
    }
}

#[component]
fn SettingsApp(control: WindowControl) -> impl IntoView {
    let status = create_rw_signal(String::new());
    let bus = use_context::<MessageBus>();

    let call_shell = move |method: &'static str, args: Vec<Value>| {
        let Some(bus) = bus.clone() else {
            status.set("message bus unavailable".to_string());
            return;
        };
        spawn_local(async move {
            match bus.call_service(SHELL_SERVICE, method, args).await {
                Ok(_) => status.set(format!("{method} applied")),
                Err(err) => {
                    logging::warn!("settings request failed: {err}");
                    status.set(err.to_string());
                }
            }
        });
    };

    let about_control = control.clone();
    let show_about = move |_| {
        let close_control = about_control.clone();
        about_control.set_modal(Some(
            view! {
                <div class="window-modal-card">
                    <p>"Desktop shell settings are stored in the system folder."</p>
                    <button type="button" on:click=move |_| close_control.set_modal(None)>
                        "Close"
                    </button>
                </div>
            }
            .into_view(),
        ));
    };

    view! {
        <div class="app-shell app-settings">
            <fieldset>
                <legend>"Taskbar position"</legend>
                {["left", "bottom", "right"]
                    .into_iter()
                    .map(|placement| {
                        let call_shell = call_shell.clone();
                        view! {
                            <button
                                type="button"
                                on:click=move |_| call_shell("setTaskbarPlacement", vec![json!(placement)])
                            >
                                {placement}
                            </button>
                        }
                    })
                    .collect_view()}
            </fieldset>
            <fieldset>
                <legend>"Taskbar size"</legend>
                <button
                    type="button"
                    on:click={
                        let call_shell = call_shell.clone();
                        move |_| call_shell("setTaskbarExpanded", vec![json!(true)])
                    }
                >
                    "Expanded"
                </button>
                <button
                    type="button"
                    on:click={
                        let call_shell = call_shell.clone();
                        move |_| call_shell("setTaskbarExpanded", vec![json!(false)])
                    }
                >
                    "Compact"
                </button>
            </fieldset>
            <div class="app-toolbar">
                <button
                    type="button"
                    on:click={
                        let call_shell = call_shell.clone();
                        move |_| call_shell("openApp", vec![json!(ME_APP_ID)])
                    }
                >
                    "Open About me"
                </button>
                <button
                    type="button"
                    on:click={
                        let call_shell = call_shell.clone();
                        move |_| call_shell("rememberOpenApps", Vec::new())
                    }
                >
                    "Reopen these apps at startup"
                </button>
                <button type="button" on:click=show_about>"About"</button>
            </div>
            <p class="app-statusbar" role="status">{move || status.get()}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn catalog_ids_are_valid_and_unique() {
        let ids: Vec<String> = app_catalog()
            .into_iter()
            .map(|descriptor| descriptor.app_id.expect("catalog apps have ids").to_string())
            .collect();
        for id in &ids {
            assert!(ApplicationId::new(id.clone()).is_ok(), "{id}");
        }
        let unique: BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn descriptor_lookup_by_app_id() {
        let explorer = descriptor_for(&ApplicationId::trusted(EXPLORER_APP_ID)).expect("explorer");
        assert_eq!(explorer.title, "Explorer");
        assert_eq!(explorer.min_size, Some(Size::new(320, 220)));
        assert!(descriptor_for(&ApplicationId::trusted("calculator")).is_none());
    }
}

//! Desktop shell UI composition and interaction surfaces.

mod taskbar;
mod window;

use desktop_app_contract::Point;
use leptos::*;

use self::{taskbar::Taskbar, window::DesktopWindow};
use crate::{
    geometry::ResizeEdge, interaction::GestureUpdate, reducer::DesktopAction,
    window_manager::taskbar_thickness,
};

pub use crate::runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};

#[component]
/// Renders the status bar, window layer, and taskbar, and routes pointer gestures to the reducer.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;

    let status_bar = create_node_ref::<html::Header>();
    let sync_status_bar_height = move || {
        let Some(header) = status_bar.get_untracked() else {
            return;
        };
        let height = header.offset_height();
        // Zero means the header is not laid out yet.
        if height > 0 {
            runtime.dispatch_action(DesktopAction::SetStatusBarHeight { height });
        }
    };
    create_effect(move |_| {
        if status_bar.get().is_some() {
            sync_status_bar_height();
        }
    });

    let resize_listener = window_event_listener(ev::resize, move |_| {
        runtime.dispatch_action(DesktopAction::SetViewport {
            viewport: runtime.host.get_value().viewport_size(),
        });
        sync_status_bar_height();
    });
    on_cleanup(move || resize_listener.remove());

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        if !runtime.gesture.with_untracked(|gesture| gesture.is_active()) {
            return;
        }
        let pointer = pointer_from_pointer_event(&ev);
        let (viewport, borders) =
            state.with_untracked(|desktop| (desktop.viewport, desktop.borders));
        let mut update = GestureUpdate::Ignored;
        runtime
            .gesture
            .update(|gesture| update = gesture.pointer_move(pointer, viewport, borders));
        for action in update.into_actions() {
            runtime.dispatch_action(action);
        }
    };
    let on_pointer_end = move |_| {
        if runtime.gesture.with_untracked(|gesture| gesture.is_active()) {
            runtime.gesture.update(|gesture| gesture.end());
        }
    };

    let status_bar_style = move || {
        format!(
            "min-height:{}px;",
            state.with(|desktop| desktop.chrome.status_bar_height)
        )
    };
    let focused_title = move || {
        state.with(|desktop| {
            desktop
                .focused_window_id()
                .and_then(|id| desktop.window(id))
                .map(|w| w.title.clone())
                .unwrap_or_default()
        })
    };
    let taskbar_class = move || {
        let taskbar = state.with(|desktop| desktop.chrome.taskbar);
        format!(
            "desktop-shell taskbar-{}{}",
            taskbar.placement.token(),
            if taskbar.expanded { " taskbar-expanded" } else { "" }
        )
    };
    let taskbar_style = move || {
        format!(
            "--taskbar-thickness:{}px;",
            taskbar_thickness(state.with(|desktop| desktop.chrome.taskbar))
        )
    };

    view! {
        <div
            id="desktop-shell-root"
            class=taskbar_class
            style=taskbar_style
            tabindex="-1"
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_end
            on:pointercancel=on_pointer_end
        >
            <header
                node_ref=status_bar
                class="desktop-status-bar"
                style=status_bar_style
                role="status"
            >
                <span class="status-bar-title">{focused_title}</span>
            </header>
            <main class="desktop-window-layer">
                <For each=move || state.get().windows key=|win| win.id.0 let:win>
                    <DesktopWindow window_id=win.id />
                </For>
            </main>
            <Taskbar />
        </div>
    }
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> Point {
    Point::new(ev.client_x(), ev.client_y())
}

fn resize_edge_class(edge: ResizeEdge) -> &'static str {
    match edge {
        ResizeEdge::North => "edge-n",
        ResizeEdge::South => "edge-s",
        ResizeEdge::East => "edge-e",
        ResizeEdge::West => "edge-w",
        ResizeEdge::NorthEast => "edge-ne",
        ResizeEdge::NorthWest => "edge-nw",
        ResizeEdge::SouthEast => "edge-se",
        ResizeEdge::SouthWest => "edge-sw",
    }
}

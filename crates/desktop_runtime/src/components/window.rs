use std::rc::Rc;

use desktop_app_contract::{Point, WindowCommand, WindowControl};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use super::*;
use crate::{
    geometry::{detect_resize_edge, Rect, RESIZE_THRESHOLD_PX},
    host::window_body_dom_id,
    model::{WindowId, WindowRecord},
    window_manager::effective_rect,
};

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

#[component]
pub(super) fn DesktopWindow(window_id: WindowId) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;

    let window = Signal::derive(move || state.with(|desktop| desktop.window(window_id).cloned()));
    let rect = Signal::derive(move || {
        state.with(|desktop| {
            desktop
                .window(window_id)
                .map(|w| effective_rect(w, desktop.viewport, desktop.borders))
        })
    });
    let hover_edge = create_rw_signal(None::<ResizeEdge>);
    let modal = create_rw_signal(None::<View>);
    let free_slot = create_rw_signal(None::<View>);

    let edge_at = move |pointer: Point| -> Option<ResizeEdge> {
        let win = window.get_untracked()?;
        if win.is_maximized {
            return None;
        }
        detect_resize_edge(pointer, rect.get_untracked()?, RESIZE_THRESHOLD_PX)
    };

    // Focus may pull the window back on screen, so gestures start from the record it leaves.
    let focus_for_gesture = move || -> Option<WindowRecord> {
        if !window.get_untracked()?.is_focused {
            runtime.dispatch_action(DesktopAction::Focus { window_id });
        }
        window.get_untracked()
    };

    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        let Some(win) = focus_for_gesture() else {
            return;
        };
        let pointer = pointer_from_pointer_event(&ev);
        let Some(edge) = edge_at(pointer) else {
            return;
        };
        let mut started = false;
        runtime
            .gesture
            .update(|gesture| started = gesture.begin_resize(&win, edge, pointer));
        if started {
            try_set_pointer_capture(&ev);
            ev.prevent_default();
        }
    };
    let on_hover = move |ev: web_sys::PointerEvent| {
        if runtime.gesture.with_untracked(|gesture| gesture.is_active()) {
            return;
        }
        let edge = edge_at(pointer_from_pointer_event(&ev));
        if hover_edge.get_untracked() != edge {
            hover_edge.set(edge);
        }
    };
    let begin_move = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        let Some(win) = focus_for_gesture() else {
            return;
        };
        let pointer = pointer_from_pointer_event(&ev);
        // Edge presses on the title bar belong to the resize gesture.
        if edge_at(pointer).is_some() {
            return;
        }
        let mut started = false;
        runtime
            .gesture
            .update(|gesture| started = gesture.begin_drag(&win, pointer));
        if started {
            try_set_pointer_capture(&ev);
            ev.prevent_default();
        }
    };
    let toggle_maximize = move || runtime.dispatch_action(DesktopAction::Maximize { window_id });
    let titlebar_double_click = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        toggle_maximize();
    };

    let section_class = move || {
        let Some(win) = window.get() else {
            return "desktop-window".to_string();
        };
        let dragging = runtime.gesture.with(|gesture| gesture.active_window()) == Some(window_id);
        format!(
            "desktop-window{}{}{}{}",
            if win.is_focused { " focused" } else { "" },
            if win.is_minimized { " minimized" } else { "" },
            if win.is_maximized { " maximized" } else { "" },
            if dragging { " interacting" } else { "" },
        )
    };
    let section_style = move || {
        let Some(win) = window.get() else {
            return String::new();
        };
        let Rect {
            x,
            y,
            width,
            height,
        } = rect.get().unwrap_or_else(|| win.rect());
        let cursor = hover_edge
            .get()
            .map(|edge| format!("cursor:{};", edge.cursor()))
            .unwrap_or_default();
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};{}",
            x, y, width, height, win.z_index, cursor
        )
    };
    let titlebar_style = move || {
        window
            .get()
            .and_then(|w| w.window_color)
            .map(|color| format!("background-color:{color};"))
            .unwrap_or_default()
    };
    let title_text = move || {
        window
            .get()
            .map(|w| match w.subtitle {
                Some(subtitle) if !subtitle.is_empty() => format!("{} - {subtitle}", w.title),
                _ => w.title,
            })
            .unwrap_or_default()
    };
    let stop_pointer = move |ev: web_sys::PointerEvent| {
        ev.prevent_default();
        ev.stop_propagation();
    };

    view! {
        <Show when=move || window.with(Option::is_some) fallback=|| ()>
            <section
                class=section_class
                style=section_style
                data-resize-edge=move || hover_edge.get().map(resize_edge_class)
                data-launcher=move || window.get().and_then(|w| w.launcher_ref)
                on:pointerdown=on_pointerdown
                on:pointermove=on_hover
                role="dialog"
                aria-label=move || window.get().map(|w| w.title).unwrap_or_default()
            >
                <header
                    class="titlebar"
                    style=titlebar_style
                    on:pointerdown=begin_move
                    on:dblclick=titlebar_double_click
                >
                    <div class="titlebar-title">
                        <span class="titlebar-app-icon" aria-hidden="true">
                            {move || window.get().and_then(|w| w.icon)}
                        </span>
                        <span>{title_text}</span>
                    </div>
                    <div class="titlebar-free-slot">{move || free_slot.get()}</div>
                    <div class="titlebar-controls">
                        <button
                            aria-label="Minimize window"
                            on:pointerdown=stop_pointer
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                runtime.dispatch_action(DesktopAction::Minimize { window_id });
                            }
                        >
                            "_"
                        </button>
                        <button
                            aria-label=move || {
                                if window.get().is_some_and(|w| w.is_maximized) {
                                    "Restore window"
                                } else {
                                    "Maximize window"
                                }
                            }
                            on:pointerdown=stop_pointer
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                toggle_maximize();
                            }
                        >
                            "[]"
                        </button>
                        <button
                            aria-label="Close window"
                            on:pointerdown=stop_pointer
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                runtime.dispatch_action(DesktopAction::Close { window_id });
                            }
                        >
                            "x"
                        </button>
                    </div>
                </header>
                <div class="window-body">
                    <WindowBody window_id=window_id modal=modal free_slot=free_slot />
                </div>
            </section>
        </Show>
    }
}

/// Mounts the hosted content once and routes its [`WindowControl`] requests.
#[component]
fn WindowBody(
    window_id: WindowId,
    modal: RwSignal<Option<View>>,
    free_slot: RwSignal<Option<View>>,
) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;

    let sender: Rc<dyn Fn(WindowCommand)> = Rc::new(move |command| match command {
        WindowCommand::SetModal(node) => modal.set(node),
        WindowCommand::SetFreeSlot(node) => free_slot.set(node),
        WindowCommand::SetSubtitle(subtitle) => {
            runtime.dispatch_action(DesktopAction::SetSubtitle {
                window_id,
                subtitle,
            })
        }
        WindowCommand::SetWindowColor(color) => {
            runtime.dispatch_action(DesktopAction::SetWindowColor { window_id, color })
        }
    });
    let position: Rc<dyn Fn() -> Point> = Rc::new(move || {
        state.with_untracked(|desktop| {
            desktop
                .window(window_id)
                .map(|w| w.position)
                .unwrap_or(Point::ORIGIN)
        })
    });
    let control = WindowControl::new(window_id.0, sender, position);

    let mounted = state.with_untracked(|desktop| {
        desktop
            .window(window_id)
            .map(|w| (w.app_id.clone(), w.content.clone()))
    });
    let contents = match mounted {
        Some((app_id, content)) => {
            if let Some(app_id) = app_id {
                runtime
                    .bus
                    .with_value(|bus| bus.register_app(app_id.as_str(), window_id.0));
            }
            content.mount(control)
        }
        None => view! { <p>"Closed"</p> }.into_view(),
    };

    view! {
        <div id=window_body_dom_id(window_id) class="window-body-content" tabindex="-1">
            {contents}
        </div>
        <Show when=move || modal.with(Option::is_some) fallback=|| ()>
            <div class="window-modal" role="dialog" aria-modal="true">
                {move || modal.get()}
            </div>
        </Show>
    }
}

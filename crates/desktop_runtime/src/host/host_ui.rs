use desktop_app_contract::Size;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

use crate::model::{WindowId, DEFAULT_VIEWPORT};

pub(crate) fn window_body_dom_id(window_id: WindowId) -> String {
    format!("desktop-window-body-{}", window_id.0)
}

pub(super) fn focus_window_input(window_id: WindowId) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let dom_id = window_body_dom_id(window_id);
        // The body may not be mounted yet when the window was just added.
        let callback = Closure::once_into_js(move || {
            let Some(element) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&dom_id))
            else {
                return;
            };
            if let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() {
                let _ = element.focus();
            }
        });
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0);
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = window_id;
}

pub(super) fn viewport_size() -> Size {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let read = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
                value.ok().and_then(|v| v.as_f64()).map(|v| v as i32)
            };
            if let (Some(width), Some(height)) =
                (read(window.inner_width()), read(window.inner_height()))
            {
                return Size::new(width.max(320), height.max(240));
            }
        }
    }

    DEFAULT_VIEWPORT
}

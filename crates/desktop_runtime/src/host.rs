//! Host-side runtime helpers for executing reducer effects and querying browser environment state.
//!
//! Reducer semantics stay pure; everything that touches the blob store, the DOM, or the message
//! bus on behalf of an effect lives behind [`DesktopHostContext`].

mod boot;
mod host_ui;

use std::rc::Rc;

use desktop_app_contract::Size;
use leptos::{logging, spawn_local, Callback, SignalGetUntracked, SignalUpdate};
use platform_host::BlobStore;

pub use self::boot::startup_actions;
pub(crate) use self::host_ui::window_body_dom_id;
use crate::{
    model::WindowId,
    persistence::{self, StartupApp},
    reducer::{DesktopAction, RuntimeEffect},
    runtime_context::DesktopRuntimeContext,
};

#[derive(Clone)]
/// Host service bundle for desktop runtime side effects.
pub struct DesktopHostContext {
    blob_store: Rc<dyn BlobStore>,
}

impl Default for DesktopHostContext {
    fn default() -> Self {
        Self::new(Rc::new(platform_host_web::blob_store()))
    }
}

impl DesktopHostContext {
    /// Builds a host context over an explicit blob store (tests and alternative hosts).
    pub fn new(blob_store: Rc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }

    pub fn blob_store(&self) -> Rc<dyn BlobStore> {
        self.blob_store.clone()
    }

    /// Loads taskbar settings and startup apps, then hydrates the reducer and opens the startup
    /// windows.
    pub fn install_boot_hydration(&self, dispatch: Callback<DesktopAction>) {
        boot::install_boot_hydration(self.clone(), dispatch);
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, runtime: DesktopRuntimeContext, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistTaskbarSettings => {
                let settings = runtime.state.get_untracked().chrome.taskbar;
                let store = self.blob_store();
                spawn_local(async move {
                    if let Err(err) = persistence::save_taskbar_settings(&*store, settings).await {
                        logging::warn!("persist taskbar settings failed: {err}");
                    }
                });
            }
            RuntimeEffect::FocusWindowInput(window_id) => self.focus_window_input(window_id),
            RuntimeEffect::WindowClosed { window_id, app_id } => {
                runtime.gesture.update(|gesture| gesture.forget_window(window_id));
                if let Some(app_id) = app_id {
                    runtime
                        .bus
                        .with_value(|bus| bus.release_window(app_id.as_str(), window_id.0));
                }
            }
        }
    }

    /// Saves the startup app list in the background.
    pub fn save_startup_apps(&self, apps: Vec<StartupApp>) {
        let store = self.blob_store();
        spawn_local(async move {
            if let Err(err) = persistence::save_startup_apps(&*store, &apps).await {
                logging::warn!("persist startup apps failed: {err}");
            }
        });
    }

    /// Moves keyboard focus into a window body once it is in the DOM.
    pub fn focus_window_input(&self, window_id: WindowId) {
        host_ui::focus_window_input(window_id);
    }

    /// Current browser viewport size.
    pub fn viewport_size(&self) -> Size {
        host_ui::viewport_size()
    }
}


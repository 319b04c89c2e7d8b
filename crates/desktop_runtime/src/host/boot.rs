use leptos::{create_effect, logging, spawn_local, Callable, Callback};

use crate::{
    apps,
    host::DesktopHostContext,
    persistence::{self, StartupApp},
    reducer::DesktopAction,
};

pub(super) fn install_boot_hydration(host: DesktopHostContext, dispatch: Callback<DesktopAction>) {
    create_effect(move |_| {
        let store = host.blob_store();
        spawn_local(async move {
            let settings = persistence::load_taskbar_settings(&*store).await;
            dispatch.call(DesktopAction::HydrateTaskbarSettings { settings });

            let startup = persistence::load_startup_apps(&*store).await;
            for action in startup_actions(&startup) {
                dispatch.call(action);
            }
        });
    });
}

/// `AddWindow` actions for the startup list; ids missing from the catalog are skipped.
pub fn startup_actions(startup: &[StartupApp]) -> Vec<DesktopAction> {
    startup
        .iter()
        .filter_map(|app| {
            let Some(mut descriptor) = apps::descriptor_for(&app.app_id) else {
                logging::warn!("startup app `{}` is not installed", app.app_id);
                return None;
            };
            if let Some(position) = app.position {
                descriptor.position = Some(position);
            }
            Some(DesktopAction::AddWindow {
                descriptor,
                launcher_ref: None,
            })
        })
        .collect()
}

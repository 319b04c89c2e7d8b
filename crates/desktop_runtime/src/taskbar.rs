//! Taskbar launcher contract: what activating an app launcher does, and the per-app instance
//! indicators derived from the window collection.

use desktop_app_contract::{AppDescriptor, ApplicationId};

use crate::{
    model::{DesktopState, WindowId},
    reducer::DesktopAction,
};

/// Outcome of clicking an app launcher.
#[derive(Debug, Clone, PartialEq)]
pub enum LauncherActivation {
    /// No instance is open; dispatch this `AddWindow`.
    Open(DesktopAction),
    /// Exactly one instance is open; focus it.
    Focus(WindowId),
    /// Several instances are open; let the user pick one (bottom to top).
    Choose(Vec<WindowId>),
}

/// DOM id of the launcher button for `app_id`, used as the minimize animation anchor.
pub fn launcher_dom_id(app_id: &ApplicationId) -> String {
    format!("taskbar-launcher-{app_id}")
}

/// Decides what a launcher click does for `descriptor`.
///
/// Descriptors without an app id never group, so they always open a new window.
pub fn activate_launcher(state: &DesktopState, descriptor: &AppDescriptor) -> LauncherActivation {
    let Some(app_id) = descriptor.app_id.as_ref() else {
        return LauncherActivation::Open(open_action(descriptor));
    };
    let instances: Vec<WindowId> = state.windows_for_app(app_id).map(|w| w.id).collect();
    match instances.as_slice() {
        [] => LauncherActivation::Open(open_action(descriptor)),
        [only] => LauncherActivation::Focus(*only),
        _ => LauncherActivation::Choose(instances),
    }
}

/// `AddWindow` for a launcher click, anchored to that launcher.
pub fn open_action(descriptor: &AppDescriptor) -> DesktopAction {
    DesktopAction::AddWindow {
        descriptor: descriptor.clone(),
        launcher_ref: descriptor.app_id.as_ref().map(launcher_dom_id),
    }
}

/// One running-instance indicator under a launcher.
///
/// The whole value doubles as the render key, so a focus or minimize change remounts the dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceDot {
    pub window_id: WindowId,
    pub focused: bool,
    pub minimized: bool,
}

impl InstanceDot {
    pub fn class_name(self) -> String {
        format!(
            "taskbar-instance-dot{}{}",
            if self.focused { " focused" } else { "" },
            if self.minimized { " minimized" } else { "" },
        )
    }
}

/// Instance indicators for `app_id`, in stack order.
pub fn instance_dots(state: &DesktopState, app_id: &ApplicationId) -> Vec<InstanceDot> {
    state
        .windows_for_app(app_id)
        .map(|w| InstanceDot {
            window_id: w.id,
            focused: w.is_focused,
            minimized: w.is_minimized,
        })
        .collect()
}

/// Row shown in the instance chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserEntry {
    pub window_id: WindowId,
    pub label: String,
    pub minimized: bool,
}

pub fn chooser_entries(state: &DesktopState, window_ids: &[WindowId]) -> Vec<ChooserEntry> {
    window_ids
        .iter()
        .filter_map(|id| state.window(*id))
        .map(|w| ChooserEntry {
            window_id: w.id,
            label: match w.subtitle.as_deref() {
                Some(subtitle) if !subtitle.is_empty() => format!("{} - {subtitle}", w.title),
                _ => w.title.clone(),
            },
            minimized: w.is_minimized,
        })
        .collect()
}

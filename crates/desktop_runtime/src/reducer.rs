//! Reducer actions, side-effect intents, and transition logic for the desktop runtime.

use desktop_app_contract::{AppDescriptor, ApplicationId, Point, Size};

use crate::{
    model::{
        DesktopState, TaskbarPlacement, TaskbarSettings, WindowId, WindowRecord,
        DEFAULT_MIN_WINDOW_SIZE,
    },
    window_manager::{
        border_constraints, centered_position, clamp_on_screen, normalize_window_stack,
        raise_window,
    },
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`].
pub enum DesktopAction {
    /// Open a new window from an app descriptor.
    AddWindow {
        /// What to open.
        descriptor: AppDescriptor,
        /// DOM id of the launcher that requested it, if any.
        launcher_ref: Option<String>,
    },
    /// Raise a window to the top, un-minimizing it and pulling it back on screen.
    Focus {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Hide a window while keeping its state.
    Minimize {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Toggle the maximized flag.
    Maximize {
        /// Window to toggle.
        window_id: WindowId,
    },
    /// Bring a minimized window back and focus it.
    Restore {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Taskbar button behavior: minimize when focused, restore when minimized, focus otherwise.
    ToggleTaskbarWindow {
        /// Window associated with the taskbar button.
        window_id: WindowId,
    },
    /// Replace a window's stored position.
    Move {
        /// Window to move.
        window_id: WindowId,
        /// New top-left corner.
        position: Point,
    },
    /// Replace a window's stored size.
    Resize {
        /// Window to resize.
        window_id: WindowId,
        /// New size, already floored by the geometry engine.
        size: Size,
    },
    /// Remove a window.
    Close {
        /// Window to close.
        window_id: WindowId,
    },
    /// Subtitle update requested by hosted content.
    SetSubtitle {
        /// Target window.
        window_id: WindowId,
        /// New subtitle.
        subtitle: Option<String>,
    },
    /// Accent color update requested by hosted content.
    SetWindowColor {
        /// Target window.
        window_id: WindowId,
        /// CSS color, or `None` for the theme default.
        color: Option<String>,
    },
    /// Browser viewport size changed.
    SetViewport {
        /// New viewport size.
        viewport: Size,
    },
    /// Status bar height changed.
    SetStatusBarHeight {
        /// New height in px.
        height: i32,
    },
    /// Move the taskbar to another screen edge.
    SetTaskbarPlacement {
        /// New placement.
        placement: TaskbarPlacement,
    },
    /// Expand or collapse the taskbar.
    SetTaskbarExpanded {
        /// Whether labels are shown.
        expanded: bool,
    },
    /// Apply persisted taskbar settings at boot without persisting them again.
    HydrateTaskbarSettings {
        /// Loaded settings.
        settings: TaskbarSettings,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the shell runtime to execute.
pub enum RuntimeEffect {
    /// Write the current taskbar settings to the blob store.
    PersistTaskbarSettings,
    /// Move keyboard focus into the window's content.
    FocusWindowInput(WindowId),
    /// A window left the collection; per-window resources can be released.
    WindowClosed {
        /// Removed window.
        window_id: WindowId,
        /// App the window hosted.
        app_id: Option<ApplicationId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Output of one reducer step.
pub struct Transition {
    /// Next state snapshot.
    pub state: DesktopState,
    /// Effects for the shell to run after committing `state`.
    pub effects: Vec<RuntimeEffect>,
}

impl Transition {
    fn unchanged(state: &DesktopState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// Computes the state that follows `action`.
///
/// `state` is never mutated. Actions that reference a window id not in the collection yield an
/// unchanged snapshot and no effects. After every change the stack is renumbered and the top-most
/// non-minimized window is the focused one.
pub fn reduce_desktop(state: &DesktopState, action: DesktopAction) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        DesktopAction::AddWindow {
            descriptor,
            launcher_ref,
        } => {
            let window_id = WindowId(next.next_window_id);
            next.next_window_id = next.next_window_id.saturating_add(1);
            let record = new_window_record(&next, window_id, descriptor, launcher_ref);
            let opens_hidden = record.is_minimized;
            next.windows.push(record);
            if !opens_hidden {
                effects.push(RuntimeEffect::FocusWindowInput(window_id));
            }
        }
        DesktopAction::Focus { window_id } | DesktopAction::Restore { window_id } => {
            if !focus_window(&mut next, window_id) {
                return Transition::unchanged(state);
            }
            effects.push(RuntimeEffect::FocusWindowInput(window_id));
        }
        DesktopAction::Minimize { window_id } => {
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.is_minimized = true;
        }
        DesktopAction::Maximize { window_id } => {
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.is_maximized = !window.is_maximized;
        }
        DesktopAction::ToggleTaskbarWindow { window_id } => {
            let Some(window) = state.window(window_id) else {
                return Transition::unchanged(state);
            };
            let follow_up = if window.is_minimized {
                DesktopAction::Restore { window_id }
            } else if window.is_focused {
                DesktopAction::Minimize { window_id }
            } else {
                DesktopAction::Focus { window_id }
            };
            return reduce_desktop(state, follow_up);
        }
        DesktopAction::Move {
            window_id,
            position,
        } => {
            let top = next.borders.top;
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.position = Point::new(position.x, position.y.max(top));
        }
        DesktopAction::Resize { window_id, size } => {
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.size = size;
        }
        DesktopAction::Close { window_id } => {
            let Some(index) = window_index(&next, window_id) else {
                return Transition::unchanged(state);
            };
            let closed = next.windows.remove(index);
            effects.push(RuntimeEffect::WindowClosed {
                window_id,
                app_id: closed.app_id,
            });
        }
        DesktopAction::SetSubtitle {
            window_id,
            subtitle,
        } => {
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.subtitle = subtitle;
        }
        DesktopAction::SetWindowColor { window_id, color } => {
            let Some(window) = window_mut(&mut next, window_id) else {
                return Transition::unchanged(state);
            };
            window.window_color = color;
        }
        DesktopAction::SetViewport { viewport } => {
            next.viewport = viewport;
        }
        DesktopAction::SetStatusBarHeight { height } => {
            next.chrome.status_bar_height = height.max(0);
            next.borders = border_constraints(&next.chrome);
        }
        DesktopAction::SetTaskbarPlacement { placement } => {
            if next.chrome.taskbar.placement == placement {
                return Transition::unchanged(state);
            }
            next.chrome.taskbar.placement = placement;
            next.borders = border_constraints(&next.chrome);
            effects.push(RuntimeEffect::PersistTaskbarSettings);
        }
        DesktopAction::SetTaskbarExpanded { expanded } => {
            if next.chrome.taskbar.expanded == expanded {
                return Transition::unchanged(state);
            }
            next.chrome.taskbar.expanded = expanded;
            next.borders = border_constraints(&next.chrome);
            effects.push(RuntimeEffect::PersistTaskbarSettings);
        }
        DesktopAction::HydrateTaskbarSettings { settings } => {
            next.chrome.taskbar = settings;
            next.borders = border_constraints(&next.chrome);
        }
    }

    normalize_window_stack(&mut next.windows);
    Transition {
        state: next,
        effects,
    }
}

fn new_window_record(
    state: &DesktopState,
    id: WindowId,
    descriptor: AppDescriptor,
    launcher_ref: Option<String>,
) -> WindowRecord {
    let min_size = descriptor.min_size.unwrap_or(DEFAULT_MIN_WINDOW_SIZE);
    let size = descriptor.size.at_least(min_size);
    let position = match descriptor.position {
        Some(position) if position != Point::ORIGIN => position,
        _ => centered_position(size, state.viewport, state.borders),
    };
    WindowRecord {
        id,
        app_id: descriptor.app_id,
        title: descriptor.title,
        subtitle: descriptor.subtitle,
        icon: descriptor.icon,
        z_index: 0,
        is_focused: false,
        is_minimized: descriptor.is_minimized,
        is_maximized: descriptor.is_maximized,
        position,
        size,
        min_size,
        window_color: None,
        content: descriptor.content,
        launcher_ref,
    }
}

fn window_index(state: &DesktopState, window_id: WindowId) -> Option<usize> {
    state.windows.iter().position(|w| w.id == window_id)
}

fn window_mut(state: &mut DesktopState, window_id: WindowId) -> Option<&mut WindowRecord> {
    state.windows.iter_mut().find(|w| w.id == window_id)
}

fn focus_window(state: &mut DesktopState, window_id: WindowId) -> bool {
    let Some(index) = window_index(state, window_id) else {
        return false;
    };
    let (viewport, borders) = (state.viewport, state.borders);
    let window = &mut state.windows[index];
    if !window.is_maximized {
        window.position = clamp_on_screen(window.rect(), viewport, borders);
    }
    raise_window(&mut state.windows, index);
    true
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use desktop_app_contract::AppContent;
    use leptos::IntoView;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::BorderConstraints;

    fn descriptor(app_id: &str) -> AppDescriptor {
        AppDescriptor::new(
            app_id.to_string(),
            AppContent::new(|_| ().into_view()),
            Size::new(400, 300),
        )
        .with_app_id(ApplicationId::trusted(app_id))
    }

    fn open(state: &DesktopState, app_id: &str) -> (DesktopState, WindowId) {
        let transition = reduce_desktop(
            state,
            DesktopAction::AddWindow {
                descriptor: descriptor(app_id),
                launcher_ref: None,
            },
        );
        let id = transition.state.windows.last().expect("window").id;
        (transition.state, id)
    }

    fn step(state: &DesktopState, action: DesktopAction) -> DesktopState {
        reduce_desktop(state, action).state
    }

    fn order(state: &DesktopState) -> Vec<WindowId> {
        state.window_ids()
    }

    #[test]
    fn added_windows_get_distinct_ids_and_focus() {
        let mut state = DesktopState::default();
        for app in ["me", "me", "explorer", "me", "browser"] {
            state = open(&state, app).0;
        }
        let ids: BTreeSet<WindowId> = state.window_ids().into_iter().collect();
        assert_eq!(ids.len(), 5);

        let (state, last) = open(&state, "settings");
        assert_eq!(state.focused_window_id(), Some(last));
        assert_eq!(state.windows.iter().filter(|w| w.is_focused).count(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_close() {
        let (state, first) = open(&DesktopState::default(), "me");
        let state = step(&state, DesktopAction::Close { window_id: first });
        let (_, second) = open(&state, "me");
        assert_ne!(first, second);
    }

    #[test]
    fn add_window_emits_focus_input_effect() {
        let transition = reduce_desktop(
            &DesktopState::default(),
            DesktopAction::AddWindow {
                descriptor: descriptor("me"),
                launcher_ref: Some("launcher-me".to_string()),
            },
        );
        let window = &transition.state.windows[0];
        assert_eq!(
            transition.effects,
            vec![RuntimeEffect::FocusWindowInput(window.id)]
        );
        assert_eq!(window.launcher_ref.as_deref(), Some("launcher-me"));
    }

    #[test]
    fn origin_position_opens_centered_in_usable_region() {
        let state = DesktopState::default();
        let mut at_origin = descriptor("me");
        at_origin.position = Some(Point::ORIGIN);
        let state = step(
            &state,
            DesktopAction::AddWindow {
                descriptor: at_origin,
                launcher_ref: None,
            },
        );
        // 1280x800 viewport, 28 px status bar, 48 px bottom taskbar.
        assert_eq!(state.windows[0].position, Point::new(440, 240));

        let placed = descriptor("me").with_position(Point::new(5, 60));
        let state = step(
            &state,
            DesktopAction::AddWindow {
                descriptor: placed,
                launcher_ref: None,
            },
        );
        assert_eq!(state.windows[1].position, Point::new(5, 60));
    }

    #[test]
    fn initial_size_respects_minimum() {
        let tiny = AppDescriptor::new(
            "tiny",
            AppContent::new(|_| ().into_view()),
            Size::new(10, 500),
        )
        .with_min_size(Size::new(200, 100));
        let state = step(
            &DesktopState::default(),
            DesktopAction::AddWindow {
                descriptor: tiny,
                launcher_ref: None,
            },
        );
        assert_eq!(state.windows[0].size, Size::new(200, 500));
        assert_eq!(state.windows[0].min_size, Size::new(200, 100));
    }

    #[test]
    fn focus_moves_window_to_top_and_clears_minimized() {
        let (state, first) = open(&DesktopState::default(), "me");
        let (state, second) = open(&state, "me");
        let state = step(&state, DesktopAction::Minimize { window_id: first });

        let transition = reduce_desktop(&state, DesktopAction::Focus { window_id: first });
        let state = transition.state;

        assert_eq!(order(&state), vec![second, first]);
        let top = state.windows.last().expect("top");
        assert!(!top.is_minimized);
        assert!(top.is_focused);
        assert_eq!(top.z_index, 2);
        assert_eq!(
            transition.effects,
            vec![RuntimeEffect::FocusWindowInput(first)]
        );
    }

    #[test]
    fn focus_pulls_offscreen_window_back_into_view() {
        let (state, id) = open(&DesktopState::default(), "me");
        let state = step(
            &state,
            DesktopAction::Move {
                window_id: id,
                position: Point::new(1200, 700),
            },
        );
        let state = step(&state, DesktopAction::Focus { window_id: id });
        let window = state.window(id).expect("window");
        // 400x300 window inside 1280x(800-28-48) usable area.
        assert_eq!(window.position, Point::new(880, 452));
        assert_eq!(window.size, Size::new(400, 300));
    }

    #[test]
    fn minimize_hides_but_keeps_window() {
        let (state, first) = open(&DesktopState::default(), "me");
        let (state, second) = open(&state, "me");
        let state = step(&state, DesktopAction::Minimize { window_id: second });

        assert_eq!(state.windows.len(), 2);
        assert!(state.window(second).expect("second").is_minimized);
        assert_eq!(state.focused_window_id(), Some(first));
        let visible: Vec<WindowId> = state.visible_windows().map(|w| w.id).collect();
        assert_eq!(visible, vec![first]);
    }

    #[test]
    fn maximize_toggles_without_touching_stored_geometry() {
        let (state, id) = open(&DesktopState::default(), "me");
        let before = state.window(id).expect("window").rect();

        let state = step(&state, DesktopAction::Maximize { window_id: id });
        let window = state.window(id).expect("window");
        assert!(window.is_maximized);
        assert_eq!(window.rect(), before);

        let state = step(&state, DesktopAction::Maximize { window_id: id });
        assert!(!state.window(id).expect("window").is_maximized);
    }

    #[test]
    fn move_clamps_only_the_top_edge() {
        let (state, id) = open(&DesktopState::default(), "me");
        let state = step(
            &state,
            DesktopAction::Move {
                window_id: id,
                position: Point::new(-300, -50),
            },
        );
        assert_eq!(state.window(id).expect("window").position, Point::new(-300, 28));

        let state = step(
            &state,
            DesktopAction::Move {
                window_id: id,
                position: Point::new(5000, 5000),
            },
        );
        assert_eq!(
            state.window(id).expect("window").position,
            Point::new(5000, 5000)
        );
    }

    #[test]
    fn resize_replaces_size_unconditionally() {
        let (state, id) = open(&DesktopState::default(), "me");
        let state = step(
            &state,
            DesktopAction::Resize {
                window_id: id,
                size: Size::new(10, 10),
            },
        );
        assert_eq!(state.window(id).expect("window").size, Size::new(10, 10));
    }

    #[test]
    fn close_removes_exactly_one_window() {
        let (state, a) = open(&DesktopState::default(), "me");
        let (state, b) = open(&state, "explorer");
        let (state, c) = open(&state, "me");

        let transition = reduce_desktop(&state, DesktopAction::Close { window_id: b });
        assert_eq!(order(&transition.state), vec![a, c]);
        assert_eq!(
            transition.effects,
            vec![RuntimeEffect::WindowClosed {
                window_id: b,
                app_id: Some(ApplicationId::trusted("explorer")),
            }]
        );
    }

    #[test]
    fn actions_on_unknown_windows_are_noops() {
        let (state, _) = open(&DesktopState::default(), "me");
        let ghost = WindowId(999);
        let actions = vec![
            DesktopAction::Focus { window_id: ghost },
            DesktopAction::Minimize { window_id: ghost },
            DesktopAction::Maximize { window_id: ghost },
            DesktopAction::Restore { window_id: ghost },
            DesktopAction::ToggleTaskbarWindow { window_id: ghost },
            DesktopAction::Move {
                window_id: ghost,
                position: Point::new(1, 1),
            },
            DesktopAction::Resize {
                window_id: ghost,
                size: Size::new(1, 1),
            },
            DesktopAction::Close { window_id: ghost },
            DesktopAction::SetSubtitle {
                window_id: ghost,
                subtitle: Some("x".to_string()),
            },
        ];
        for action in actions {
            let transition = reduce_desktop(&state, action.clone());
            assert_eq!(transition.state, state, "{action:?}");
            assert!(transition.effects.is_empty(), "{action:?}");
        }
    }

    #[test]
    fn taskbar_toggle_minimizes_focused_and_restores_minimized() {
        let (state, first) = open(&DesktopState::default(), "me");
        let (state, second) = open(&state, "me");

        let state = step(&state, DesktopAction::ToggleTaskbarWindow { window_id: second });
        assert!(state.window(second).expect("second").is_minimized);

        let state = step(&state, DesktopAction::ToggleTaskbarWindow { window_id: second });
        assert!(!state.window(second).expect("second").is_minimized);
        assert_eq!(state.focused_window_id(), Some(second));

        let state = step(&state, DesktopAction::ToggleTaskbarWindow { window_id: first });
        assert_eq!(state.focused_window_id(), Some(first));
    }

    #[test]
    fn taskbar_changes_recompute_borders_and_request_persistence() {
        let state = DesktopState::default();
        let transition = reduce_desktop(
            &state,
            DesktopAction::SetTaskbarPlacement {
                placement: TaskbarPlacement::Left,
            },
        );
        assert_eq!(
            transition.state.borders,
            BorderConstraints {
                top: 28,
                right: 0,
                bottom: 0,
                left: 48,
            }
        );
        assert_eq!(transition.effects, vec![RuntimeEffect::PersistTaskbarSettings]);

        let same = reduce_desktop(
            &transition.state,
            DesktopAction::SetTaskbarPlacement {
                placement: TaskbarPlacement::Left,
            },
        );
        assert!(same.effects.is_empty());

        let hydrated = reduce_desktop(
            &state,
            DesktopAction::HydrateTaskbarSettings {
                settings: TaskbarSettings {
                    placement: TaskbarPlacement::Right,
                    expanded: true,
                },
            },
        );
        assert_eq!(hydrated.state.borders.right, 72);
        assert!(hydrated.effects.is_empty());
    }

    #[test]
    fn content_requests_update_window_metadata() {
        let (state, id) = open(&DesktopState::default(), "browser");
        let state = step(
            &state,
            DesktopAction::SetSubtitle {
                window_id: id,
                subtitle: Some("https://example.org".to_string()),
            },
        );
        let state = step(
            &state,
            DesktopAction::SetWindowColor {
                window_id: id,
                color: Some("#224466".to_string()),
            },
        );
        let window = state.window(id).expect("window");
        assert_eq!(window.subtitle.as_deref(), Some("https://example.org"));
        assert_eq!(window.window_color.as_deref(), Some("#224466"));
    }

    #[test]
    fn status_bar_height_moves_the_top_border() {
        let (state, id) = open(&DesktopState::default(), "me");
        let state = step(
            &state,
            DesktopAction::Move {
                window_id: id,
                position: Point::new(200, 30),
            },
        );

        let state = step(&state, DesktopAction::SetStatusBarHeight { height: 40 });
        assert_eq!(state.chrome.status_bar_height, 40);
        assert_eq!(state.borders.top, 40);
        assert_eq!(state.borders.bottom, 48);

        let state = step(&state, DesktopAction::Focus { window_id: id });
        assert_eq!(state.window(id).expect("window").position, Point::new(200, 40));

        let state = step(&state, DesktopAction::SetStatusBarHeight { height: -5 });
        assert_eq!(state.borders.top, 0);
    }

    #[test]
    fn input_snapshot_is_left_untouched() {
        let (state, id) = open(&DesktopState::default(), "me");
        let snapshot = state.clone();
        let _ = reduce_desktop(&state, DesktopAction::Close { window_id: id });
        assert_eq!(state, snapshot);
    }
}

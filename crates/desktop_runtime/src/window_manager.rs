//! Layout constraints derived from shell chrome, plus the stack/focus helpers the reducer uses.

use desktop_app_contract::{Point, Size};

use crate::{
    geometry::Rect,
    model::{BorderConstraints, ChromeMetrics, TaskbarPlacement, TaskbarSettings, WindowRecord},
};

/// Taskbar thickness when collapsed.
pub const TASKBAR_THICKNESS_PX: i32 = 48;
/// Taskbar thickness when expanded (labels shown next to launcher icons).
pub const TASKBAR_EXPANDED_THICKNESS_PX: i32 = 72;

pub fn taskbar_thickness(settings: TaskbarSettings) -> i32 {
    if settings.expanded {
        TASKBAR_EXPANDED_THICKNESS_PX
    } else {
        TASKBAR_THICKNESS_PX
    }
}

/// Recomputes the insets windows may not cover for the given chrome.
pub fn border_constraints(chrome: &ChromeMetrics) -> BorderConstraints {
    let thickness = taskbar_thickness(chrome.taskbar);
    let mut borders = BorderConstraints {
        top: chrome.status_bar_height.max(0),
        ..BorderConstraints::default()
    };
    match chrome.taskbar.placement {
        TaskbarPlacement::Left => borders.left = thickness,
        TaskbarPlacement::Right => borders.right = thickness,
        TaskbarPlacement::Bottom => borders.bottom = thickness,
    }
    borders
}

/// The region inside `viewport` left over after removing chrome insets.
pub fn usable_rect(viewport: Size, borders: BorderConstraints) -> Rect {
    Rect {
        x: borders.left,
        y: borders.top,
        width: (viewport.width - borders.left - borders.right).max(0),
        height: (viewport.height - borders.top - borders.bottom).max(0),
    }
}

/// Top-left position that centers `size` in the usable region.
///
/// Windows larger than the region are pinned to its top-left corner.
pub fn centered_position(size: Size, viewport: Size, borders: BorderConstraints) -> Point {
    let usable = usable_rect(viewport, borders);
    Point::new(
        usable.x + ((usable.width - size.width) / 2).max(0),
        usable.y + ((usable.height - size.height) / 2).max(0),
    )
}

/// Moves `rect` back inside the usable region without resizing it.
///
/// Overflow past the right/bottom edge is pulled back first; the top-left anchor is applied last
/// so it wins when the window is larger than the region.
pub fn clamp_on_screen(rect: Rect, viewport: Size, borders: BorderConstraints) -> Point {
    let usable = usable_rect(viewport, borders);
    let mut position = rect.position();
    if rect.x + rect.width > usable.right() {
        position.x = usable.right() - rect.width;
    }
    if rect.y + rect.height > usable.bottom() {
        position.y = usable.bottom() - rect.height;
    }
    position.x = position.x.max(usable.x);
    position.y = position.y.max(usable.y);
    position
}

/// On-screen rectangle for a window: maximized windows fill the usable region live, everything
/// else uses stored geometry.
pub fn effective_rect(window: &WindowRecord, viewport: Size, borders: BorderConstraints) -> Rect {
    if window.is_maximized {
        usable_rect(viewport, borders)
    } else {
        window.rect()
    }
}

/// Renumbers z-indexes from collection order and focuses the top-most non-minimized window.
pub fn normalize_window_stack(windows: &mut [WindowRecord]) {
    let top_visible = windows.iter().rposition(|w| !w.is_minimized);
    for (idx, window) in windows.iter_mut().enumerate() {
        window.z_index = (idx + 1) as u32;
        window.is_focused = Some(idx) == top_visible;
    }
}

/// Raises `index` to the top of the stack and un-minimizes it.
pub fn raise_window(windows: &mut Vec<WindowRecord>, index: usize) {
    let mut window = windows.remove(index);
    window.is_minimized = false;
    windows.push(window);
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{AppContent, ApplicationId};
    use leptos::IntoView;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::WindowId;

    fn record(id: u64, minimized: bool) -> WindowRecord {
        WindowRecord {
            id: WindowId(id),
            app_id: Some(ApplicationId::trusted("me")),
            title: format!("Window {id}"),
            subtitle: None,
            icon: None,
            z_index: 0,
            is_focused: false,
            is_minimized: minimized,
            is_maximized: false,
            position: Point::new(10, 10),
            size: Size::new(300, 200),
            min_size: Size::new(100, 100),
            window_color: None,
            content: AppContent::new(|_| ().into_view()),
            launcher_ref: None,
        }
    }

    #[test]
    fn borders_follow_taskbar_placement_and_expansion() {
        let mut chrome = ChromeMetrics::default();
        assert_eq!(
            border_constraints(&chrome),
            BorderConstraints {
                top: 28,
                right: 0,
                bottom: 48,
                left: 0,
            }
        );

        chrome.taskbar.placement = TaskbarPlacement::Left;
        chrome.taskbar.expanded = true;
        assert_eq!(
            border_constraints(&chrome),
            BorderConstraints {
                top: 28,
                right: 0,
                bottom: 0,
                left: 72,
            }
        );
    }

    #[test]
    fn centers_inside_usable_region() {
        let borders = BorderConstraints {
            top: 20,
            right: 0,
            bottom: 60,
            left: 40,
        };
        let position = centered_position(Size::new(400, 200), Size::new(1040, 580), borders);
        assert_eq!(position, Point::new(340, 170));
    }

    #[test]
    fn oversized_window_centers_to_top_left_of_region() {
        let borders = BorderConstraints {
            top: 20,
            ..BorderConstraints::default()
        };
        let position = centered_position(Size::new(2000, 2000), Size::new(800, 600), borders);
        assert_eq!(position, Point::new(0, 20));
    }

    #[test]
    fn clamp_pulls_overflowing_window_back_on_screen() {
        let borders = BorderConstraints {
            top: 20,
            right: 0,
            bottom: 50,
            left: 0,
        };
        let viewport = Size::new(800, 600);
        let rect = Rect {
            x: 700,
            y: 500,
            width: 300,
            height: 200,
        };
        assert_eq!(clamp_on_screen(rect, viewport, borders), Point::new(500, 330));

        let above = Rect { y: -40, ..rect };
        assert_eq!(clamp_on_screen(above, viewport, borders).y, 20);
    }

    #[test]
    fn clamp_prefers_top_left_anchor_for_oversized_windows() {
        let rect = Rect {
            x: 50,
            y: 50,
            width: 1200,
            height: 900,
        };
        let position = clamp_on_screen(rect, Size::new(800, 600), BorderConstraints::default());
        assert_eq!(position, Point::new(0, 0));
    }

    #[test]
    fn maximized_geometry_is_derived_from_borders() {
        let mut window = record(1, false);
        window.is_maximized = true;
        let borders = BorderConstraints {
            top: 28,
            right: 48,
            bottom: 0,
            left: 0,
        };
        let rect = effective_rect(&window, Size::new(1000, 700), borders);
        assert_eq!(
            rect,
            Rect {
                x: 0,
                y: 28,
                width: 952,
                height: 672,
            }
        );
        assert_eq!(window.position, Point::new(10, 10));
    }

    #[test]
    fn normalize_focuses_top_visible_window() {
        let mut windows = vec![record(1, false), record(2, false), record(3, true)];
        normalize_window_stack(&mut windows);

        let focus: Vec<bool> = windows.iter().map(|w| w.is_focused).collect();
        let z: Vec<u32> = windows.iter().map(|w| w.z_index).collect();
        assert_eq!(focus, vec![false, true, false]);
        assert_eq!(z, vec![1, 2, 3]);
    }

    #[test]
    fn normalize_with_everything_minimized_focuses_nothing() {
        let mut windows = vec![record(1, true), record(2, true)];
        normalize_window_stack(&mut windows);
        assert!(windows.iter().all(|w| !w.is_focused));
    }
}

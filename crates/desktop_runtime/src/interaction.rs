//! UI-local pointer gesture state for window drag and resize.
//!
//! The tracker never touches [`crate::model::DesktopState`]; it turns pointer positions into
//! proposed geometry that the shell dispatches as `Move`/`Resize` actions.

use desktop_app_contract::{Point, Size};

use crate::{
    geometry::{confine_resize, drag_offset, dragged_position, resize_rect, Rect, ResizeEdge},
    model::{BorderConstraints, WindowId, WindowRecord},
    reducer::DesktopAction,
    window_manager::usable_rect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    /// Pointer position relative to the window origin at grab time.
    pub offset: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: Point,
    pub rect_start: Rect,
    pub min_size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

/// Result of feeding one pointer position to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureUpdate {
    /// No gesture in progress.
    Ignored,
    Move {
        window_id: WindowId,
        position: Point,
    },
    /// New geometry for a resize; position changes only for west/north edges.
    Resize { window_id: WindowId, rect: Rect },
    /// Pointer left the permitted region; the gesture is cleared and earlier updates stand.
    Aborted,
}

impl GestureUpdate {
    /// Reducer actions that apply this update.
    pub fn into_actions(self) -> Vec<DesktopAction> {
        match self {
            Self::Ignored | Self::Aborted => Vec::new(),
            Self::Move {
                window_id,
                position,
            } => vec![DesktopAction::Move {
                window_id,
                position,
            }],
            Self::Resize { window_id, rect } => vec![
                DesktopAction::Move {
                    window_id,
                    position: rect.position(),
                },
                DesktopAction::Resize {
                    window_id,
                    size: rect.size(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureTracker {
    gesture: Gesture,
}

impl GestureTracker {
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn active_window(&self) -> Option<WindowId> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging(session) => Some(session.window_id),
            Gesture::Resizing(session) => Some(session.window_id),
        }
    }

    /// Starts dragging `window` from `pointer`. Returns `false` (and stays idle) for maximized
    /// windows.
    pub fn begin_drag(&mut self, window: &WindowRecord, pointer: Point) -> bool {
        if window.is_maximized {
            return false;
        }
        self.gesture = Gesture::Dragging(DragSession {
            window_id: window.id,
            offset: drag_offset(pointer, window.position),
        });
        true
    }

    /// Starts resizing `window` along `edge`. Returns `false` for maximized windows.
    pub fn begin_resize(&mut self, window: &WindowRecord, edge: ResizeEdge, pointer: Point) -> bool {
        if window.is_maximized {
            return false;
        }
        self.gesture = Gesture::Resizing(ResizeSession {
            window_id: window.id,
            edge,
            pointer_start: pointer,
            rect_start: window.rect(),
            min_size: window.min_size,
        });
        true
    }

    /// Maps the current pointer position to proposed geometry.
    ///
    /// A pointer above the top chrome boundary aborts the gesture. Otherwise the result stays tied
    /// to the usable region: a drag pins the grab point inside it, so part of the window may hang
    /// off the left, right or bottom but never all of it, and a resize stops its moving edges at
    /// the region's bounds.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        viewport: Size,
        borders: BorderConstraints,
    ) -> GestureUpdate {
        if self.gesture == Gesture::Idle {
            return GestureUpdate::Ignored;
        }
        if pointer.y < borders.top {
            self.end();
            return GestureUpdate::Aborted;
        }
        let usable = usable_rect(viewport, borders);
        match self.gesture {
            Gesture::Idle => GestureUpdate::Ignored,
            Gesture::Dragging(session) => GestureUpdate::Move {
                window_id: session.window_id,
                position: dragged_position(usable.clamp_point(pointer), session.offset),
            },
            Gesture::Resizing(session) => {
                let delta = pointer.minus(session.pointer_start);
                let rect = resize_rect(
                    session.rect_start,
                    session.edge,
                    delta.x,
                    delta.y,
                    session.min_size,
                );
                GestureUpdate::Resize {
                    window_id: session.window_id,
                    rect: confine_resize(rect, session.edge, usable, session.min_size),
                }
            }
        }
    }

    /// Ends the gesture normally (pointer up / touch end / cancel).
    pub fn end(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Clears the gesture if it belongs to a window that no longer exists.
    pub fn forget_window(&mut self, window_id: WindowId) {
        if self.active_window() == Some(window_id) {
            self.end();
        }
    }
}

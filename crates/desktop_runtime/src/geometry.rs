//! Pure drag/resize geometry: hit-testing resize zones, pointer-to-position mapping, and
//! minimum-size clamping that keeps the non-dragged edge anchored.

use desktop_app_contract::{Point, Size};
use serde::{Deserialize, Serialize};

/// Distance (px) from a window edge that still counts as grabbing that edge.
pub const RESIZE_THRESHOLD_PX: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Axis-aligned rectangle in viewport pixels.
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    pub const fn position(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// Nearest point to `point` that lies inside this rectangle, edges included.
    pub fn clamp_point(self, point: Point) -> Point {
        Point::new(
            point.x.min(self.right()).max(self.x),
            point.y.min(self.bottom()).max(self.y),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Edge or corner grabbed by a resize gesture.
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub const fn touches_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub const fn touches_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub const fn touches_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub const fn touches_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    /// CSS cursor shown while hovering this zone.
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::North | Self::South => "ns-resize",
            Self::East | Self::West => "ew-resize",
            Self::NorthEast | Self::SouthWest => "nesw-resize",
            Self::NorthWest | Self::SouthEast => "nwse-resize",
        }
    }
}

/// Returns the resize zone under `pointer`, if any.
///
/// A pointer grabs an edge when it is within `threshold` px of that edge line and inside the
/// rectangle grown by `threshold` on every side. Corners win over edges.
pub fn detect_resize_edge(pointer: Point, rect: Rect, threshold: i32) -> Option<ResizeEdge> {
    let inside_x = pointer.x >= rect.x - threshold && pointer.x <= rect.right() + threshold;
    let inside_y = pointer.y >= rect.y - threshold && pointer.y <= rect.bottom() + threshold;
    if !(inside_x && inside_y) {
        return None;
    }

    let west = (pointer.x - rect.x).abs() <= threshold;
    let east = !west && (pointer.x - rect.right()).abs() <= threshold;
    let north = (pointer.y - rect.y).abs() <= threshold;
    let south = !north && (pointer.y - rect.bottom()).abs() <= threshold;

    match (north, south, east, west) {
        (true, _, _, true) => Some(ResizeEdge::NorthWest),
        (true, _, true, _) => Some(ResizeEdge::NorthEast),
        (_, true, _, true) => Some(ResizeEdge::SouthWest),
        (_, true, true, _) => Some(ResizeEdge::SouthEast),
        (true, ..) => Some(ResizeEdge::North),
        (_, true, ..) => Some(ResizeEdge::South),
        (.., true, _) => Some(ResizeEdge::East),
        (.., true) => Some(ResizeEdge::West),
        _ => None,
    }
}

/// Offset between the pointer and the window origin at drag start.
pub fn drag_offset(pointer_start: Point, window_start: Point) -> Point {
    pointer_start.minus(window_start)
}

/// Window position that keeps the grab offset under `pointer`.
pub fn dragged_position(pointer: Point, offset: Point) -> Point {
    pointer.minus(offset)
}

/// Applies a resize of `start` by the pointer delta `(dx, dy)` on `edge`.
///
/// East/south edges grow toward the pointer. West/north edges move the origin with the pointer so
/// the opposite edge stays put. When an axis would drop below `min_size`, that axis is pinned to
/// the minimum and, for a west/north drag, the origin is recomputed from the fixed opposite edge
/// so the window never jumps.
pub fn resize_rect(start: Rect, edge: ResizeEdge, dx: i32, dy: i32, min_size: Size) -> Rect {
    let mut next = start;

    if edge.touches_east() {
        next.width = start.width + dx;
    }
    if edge.touches_west() {
        next.x = start.x + dx;
        next.width = start.width - dx;
    }
    if edge.touches_south() {
        next.height = start.height + dy;
    }
    if edge.touches_north() {
        next.y = start.y + dy;
        next.height = start.height - dy;
    }

    if next.width < min_size.width {
        next.width = min_size.width;
        if edge.touches_west() {
            next.x = start.right() - min_size.width;
        }
    }
    if next.height < min_size.height {
        next.height = min_size.height;
        if edge.touches_north() {
            next.y = start.bottom() - min_size.height;
        }
    }

    next
}

/// Pulls the edges moved by `edge` back inside `bounds`.
///
/// The anchored opposite edge is left alone, and an axis that gets pulled in never drops below
/// `min_size`.
pub fn confine_resize(rect: Rect, edge: ResizeEdge, bounds: Rect, min_size: Size) -> Rect {
    let mut next = rect;

    if edge.touches_east() && next.right() > bounds.right() {
        next.width = (bounds.right() - next.x).max(min_size.width);
    }
    if edge.touches_west() && next.x < bounds.x {
        let right = next.right();
        next.width = (right - bounds.x).max(min_size.width);
        next.x = right - next.width;
    }
    if edge.touches_south() && next.bottom() > bounds.bottom() {
        next.height = (bounds.bottom() - next.y).max(min_size.height);
    }
    if edge.touches_north() && next.y < bounds.y {
        let bottom = next.bottom();
        next.height = (bottom - bounds.y).max(min_size.height);
        next.y = bottom - next.height;
    }

    next
}

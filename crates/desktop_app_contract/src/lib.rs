//! Shared contract types between the desktop window manager runtime and hosted apps.
//!
//! Hosted apps never see window-manager state. They receive an [`AppContent`] mount call with a
//! [`WindowControl`] handle for their own window, and talk to other apps through bus messages and
//! service calls whose value types live here.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{fmt, future::Future, rc::Rc};

use futures::future::LocalBoxFuture;
use leptos::View;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for a runtime-managed window.
pub type WindowRuntimeId = u64;

/// Logical application identifier shared by every window instance of one app.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` is a lowercase `[a-z0-9-.]` token.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected lowercase letters, digits, `-` or `.`"
            ))
        }
    }

    /// Creates an id without validation for compile-time trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }
    let bytes = raw.as_bytes();
    if !bytes[0].is_ascii_lowercase() {
        return false;
    }
    if raw.ends_with('-') || raw.ends_with('.') || raw.contains("..") {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-' || *b == b'.')
}

/// Viewport-pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the viewport's left edge.
    pub x: i32,
    /// Vertical offset from the viewport's top edge.
    pub y: i32,
}

impl Point {
    /// The origin sentinel; an `ADD_WINDOW` at this position is opened centered.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub const fn minus(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Width/height pair in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Raises each axis to at least the matching axis of `floor`.
    pub fn at_least(self, floor: Self) -> Self {
        Self {
            width: self.width.max(floor.width),
            height: self.height.max(floor.height),
        }
    }
}

/// Requests a hosted app can make against its own window.
#[derive(Clone)]
pub enum WindowCommand {
    /// Show (or clear) a modal overlay above the window body.
    SetModal(Option<View>),
    /// Inject (or clear) controls in the title bar slot.
    SetFreeSlot(Option<View>),
    /// Replace the title bar subtitle.
    SetSubtitle(Option<String>),
    /// Replace the window accent color (any CSS color string).
    SetWindowColor(Option<String>),
}

/// Control handle threaded to a window's hosted content.
///
/// This is the only channel content has into the window manager. All requests are forwarded to
/// the owning runtime, which applies them through its reducer.
#[derive(Clone)]
pub struct WindowControl {
    window_id: WindowRuntimeId,
    sender: Rc<dyn Fn(WindowCommand)>,
    position: Rc<dyn Fn() -> Point>,
}

impl WindowControl {
    /// Creates a control handle for `window_id`.
    pub fn new(
        window_id: WindowRuntimeId,
        sender: Rc<dyn Fn(WindowCommand)>,
        position: Rc<dyn Fn() -> Point>,
    ) -> Self {
        Self {
            window_id,
            sender,
            position,
        }
    }

    /// Runtime id of the window hosting this content.
    pub fn window_id(&self) -> WindowRuntimeId {
        self.window_id
    }

    /// Current stored top-left position of the window.
    pub fn position(&self) -> Point {
        (self.position)()
    }

    /// Shows `node` as a modal over the window body, or clears it with `None`.
    pub fn set_modal(&self, node: Option<View>) {
        (self.sender)(WindowCommand::SetModal(node));
    }

    /// Places `node` in the title bar slot, or clears it with `None`.
    pub fn set_free_slot(&self, node: Option<View>) {
        (self.sender)(WindowCommand::SetFreeSlot(node));
    }

    /// Updates the subtitle shown next to the window title.
    pub fn set_subtitle(&self, subtitle: Option<String>) {
        (self.sender)(WindowCommand::SetSubtitle(subtitle));
    }

    /// Updates the window accent color.
    pub fn set_window_color(&self, color: Option<String>) {
        (self.sender)(WindowCommand::SetWindowColor(color));
    }
}

impl fmt::Debug for WindowControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowControl")
            .field("window_id", &self.window_id)
            .finish_non_exhaustive()
    }
}

/// Opaque render capability for a hosted app.
///
/// The runtime never inspects it; it only mounts it once per window with that window's
/// [`WindowControl`]. Two values are equal when they share the same mount closure.
#[derive(Clone)]
pub struct AppContent {
    mount: Rc<dyn Fn(WindowControl) -> View>,
}

impl AppContent {
    /// Wraps a mount function.
    pub fn new(mount: impl Fn(WindowControl) -> View + 'static) -> Self {
        Self {
            mount: Rc::new(mount),
        }
    }

    /// Mounts the content for one window.
    pub fn mount(&self, control: WindowControl) -> View {
        (self.mount)(control)
    }
}

impl PartialEq for AppContent {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.mount, &other.mount)
    }
}

impl fmt::Debug for AppContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppContent(..)")
    }
}

/// Static description of an app the taskbar or a bus request can spawn windows from.
#[derive(Debug, Clone, PartialEq)]
pub struct AppDescriptor {
    /// Window title.
    pub title: String,
    /// Logical app id; windows without one never group in the taskbar.
    pub app_id: Option<ApplicationId>,
    /// Icon token rendered in the title bar and launcher.
    pub icon: Option<String>,
    /// Initial subtitle.
    pub subtitle: Option<String>,
    /// Hosted content.
    pub content: AppContent,
    /// Initial size.
    pub size: Size,
    /// Resize floor; the runtime default applies when absent.
    pub min_size: Option<Size>,
    /// Initial position; `None` or [`Point::ORIGIN`] opens centered.
    pub position: Option<Point>,
    /// Open maximized.
    pub is_maximized: bool,
    /// Open minimized.
    pub is_minimized: bool,
}

impl AppDescriptor {
    /// Creates a descriptor with no app id and default flags.
    pub fn new(title: impl Into<String>, content: AppContent, size: Size) -> Self {
        Self {
            title: title.into(),
            app_id: None,
            icon: None,
            subtitle: None,
            content,
            size,
            min_size: None,
            position: None,
            is_maximized: false,
            is_minimized: false,
        }
    }

    /// Sets the logical app id.
    pub fn with_app_id(mut self, app_id: ApplicationId) -> Self {
        self.app_id = Some(app_id);
        self
    }

    /// Sets the icon token.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the resize floor.
    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = Some(min_size);
        self
    }

    /// Sets the initial position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Opens the window maximized.
    pub fn maximized(mut self) -> Self {
        self.is_maximized = true;
        self
    }
}

/// Message delivered to bus subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    /// Sending app id.
    pub sender: String,
    /// Addressed app id for unicast messages.
    pub target: Option<String>,
    /// Channel name.
    pub channel: String,
    /// Payload.
    pub data: Value,
    /// Delivery time in unix milliseconds.
    pub timestamp_unix_ms: u64,
}

/// Async service method invoked through the bus with positional JSON arguments.
pub type ServiceMethod = Rc<dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, Result<Value, String>>>;

/// Wraps an async closure as a [`ServiceMethod`].
pub fn service_method<F, Fut>(method: F) -> ServiceMethod
where
    F: Fn(Vec<Value>) -> Fut + 'static,
    Fut: Future<Output = Result<Value, String>> + 'static,
{
    Rc::new(move |args| Box::pin(method(args)))
}

use desktop_app_contract::{AppContent, ApplicationId, Point, Size};
use serde::{Deserialize, Serialize};

use crate::{geometry::Rect, window_manager::border_constraints};

pub const DEFAULT_WINDOW_WIDTH: i32 = 640;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 440;
pub const DEFAULT_MIN_WINDOW_WIDTH: i32 = 240;
pub const DEFAULT_MIN_WINDOW_HEIGHT: i32 = 160;
pub const DEFAULT_STATUS_BAR_HEIGHT: i32 = 28;
pub const DEFAULT_VIEWPORT: Size = Size::new(1280, 800);

pub const DEFAULT_MIN_WINDOW_SIZE: Size =
    Size::new(DEFAULT_MIN_WINDOW_WIDTH, DEFAULT_MIN_WINDOW_HEIGHT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open window instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app_id: Option<ApplicationId>,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Option<String>,
    /// 1-based stack position, renumbered from collection order after every transition.
    pub z_index: u32,
    pub is_focused: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    /// Stored geometry; kept untouched underneath a maximized window for restore.
    pub position: Point,
    pub size: Size,
    pub min_size: Size,
    pub window_color: Option<String>,
    pub content: AppContent,
    /// DOM id of the taskbar launcher, used as the minimize/restore animation anchor.
    pub launcher_ref: Option<String>,
}

impl WindowRecord {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn belongs_to(&self, app_id: &ApplicationId) -> bool {
        self.app_id.as_ref() == Some(app_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskbarPlacement {
    Left,
    Right,
    #[default]
    Bottom,
}

impl TaskbarPlacement {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskbarSettings {
    pub placement: TaskbarPlacement,
    pub expanded: bool,
}

/// Sizes of the shell chrome that windows must stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeMetrics {
    pub status_bar_height: i32,
    pub taskbar: TaskbarSettings,
}

impl Default for ChromeMetrics {
    fn default() -> Self {
        Self {
            status_bar_height: DEFAULT_STATUS_BAR_HEIGHT,
            taskbar: TaskbarSettings::default(),
        }
    }
}

/// Pixel insets carved out of the viewport by the status bar and taskbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorderConstraints {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopState {
    pub next_window_id: u64,
    /// Stack order: the last element is top-most.
    pub windows: Vec<WindowRecord>,
    pub viewport: Size,
    pub chrome: ChromeMetrics,
    pub borders: BorderConstraints,
}

impl Default for DesktopState {
    fn default() -> Self {
        let chrome = ChromeMetrics::default();
        Self {
            next_window_id: 1,
            windows: Vec::new(),
            viewport: DEFAULT_VIEWPORT,
            chrome,
            borders: border_constraints(&chrome),
        }
    }
}

impl DesktopState {
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.is_focused).map(|w| w.id)
    }

    pub fn window(&self, window_id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    /// Windows that are rendered and can receive pointer input, bottom to top.
    pub fn visible_windows(&self) -> impl Iterator<Item = &WindowRecord> {
        self.windows.iter().filter(|w| !w.is_minimized)
    }

    pub fn windows_for_app<'a>(
        &'a self,
        app_id: &'a ApplicationId,
    ) -> impl Iterator<Item = &'a WindowRecord> + 'a {
        self.windows.iter().filter(move |w| w.belongs_to(app_id))
    }
}

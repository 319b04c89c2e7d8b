//! Browser desktop-environment core: window reducer, drag/resize geometry, app message bus,
//! layout host, and taskbar launcher contract, plus the Leptos shell that wires them together.

pub mod app_bus;
pub mod apps;
pub mod components;
mod effect_executor;
pub mod geometry;
pub mod host;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod reducer;
mod runtime_context;
pub mod shell_service;
pub mod taskbar;
pub mod window_manager;

pub use app_bus::{BusError, MessageBus, Subscription};
pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use host::DesktopHostContext;
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, RuntimeEffect, Transition};

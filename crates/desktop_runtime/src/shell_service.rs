//! The `shell` bus service: lets hosted apps open apps and change taskbar settings without
//! holding a reference to window-manager state.

use std::{collections::HashMap, rc::Rc};

use desktop_app_contract::{service_method, ApplicationId, Point, ServiceMethod};
use serde_json::{json, Value};

use crate::{
    apps,
    model::{DesktopState, TaskbarPlacement, WindowId},
    persistence::{startup_apps_from_state, StartupApp},
    reducer::DesktopAction,
};

/// Service name the shell registers under.
pub const SHELL_SERVICE: &str = "shell";
/// App id the shell itself uses on the bus.
pub const SHELL_APP_ID: &str = "shell";

/// Reducer access handed to the service methods.
#[derive(Clone)]
pub struct ShellPort {
    pub dispatch: Rc<dyn Fn(DesktopAction)>,
    pub snapshot: Rc<dyn Fn() -> DesktopState>,
    /// Stores the boot list; persistence runs in the background.
    pub save_startup_apps: Rc<dyn Fn(Vec<StartupApp>)>,
}

/// Builds the method table for [`SHELL_SERVICE`].
///
/// - `openApp(appId, [x, y])` opens a catalog app and returns the new window id.
/// - `focusWindow(id)` / `closeWindow(id)` act on an open window.
/// - `listWindows()` returns `[{id, appId, title, minimized, focused}]` in stack order.
/// - `setTaskbarPlacement("left" | "right" | "bottom")`, `setTaskbarExpanded(bool)`.
/// - `rememberOpenApps()` saves the visible windows as the startup list and returns its length.
pub fn shell_service_methods(port: ShellPort) -> HashMap<String, ServiceMethod> {
    let mut methods = HashMap::new();

    let open_port = port.clone();
    methods.insert(
        "openApp".to_string(),
        service_method(move |args: Vec<Value>| {
            let port = open_port.clone();
            async move { open_app(&port, &args) }
        }),
    );

    let focus_port = port.clone();
    methods.insert(
        "focusWindow".to_string(),
        service_method(move |args: Vec<Value>| {
            let port = focus_port.clone();
            async move {
                let window_id = window_id_arg(&args)?;
                (port.dispatch)(DesktopAction::Focus { window_id });
                Ok(Value::Null)
            }
        }),
    );

    let close_port = port.clone();
    methods.insert(
        "closeWindow".to_string(),
        service_method(move |args: Vec<Value>| {
            let port = close_port.clone();
            async move {
                let window_id = window_id_arg(&args)?;
                (port.dispatch)(DesktopAction::Close { window_id });
                Ok(Value::Null)
            }
        }),
    );

    let list_port = port.clone();
    methods.insert(
        "listWindows".to_string(),
        service_method(move |_args: Vec<Value>| {
            let port = list_port.clone();
            async move { Ok(list_windows(&(port.snapshot)())) }
        }),
    );

    let placement_port = port.clone();
    methods.insert(
        "setTaskbarPlacement".to_string(),
        service_method(move |args: Vec<Value>| {
            let port = placement_port.clone();
            async move {
                let raw = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| "expected placement string".to_string())?;
                let placement = TaskbarPlacement::parse(raw)
                    .ok_or_else(|| format!("unknown taskbar placement `{raw}`"))?;
                (port.dispatch)(DesktopAction::SetTaskbarPlacement { placement });
                Ok(Value::Null)
            }
        }),
    );

    let expanded_port = port.clone();
    methods.insert(
        "setTaskbarExpanded".to_string(),
        service_method(move |args: Vec<Value>| {
            let port = expanded_port.clone();
            async move {
                let expanded = args
                    .first()
                    .and_then(Value::as_bool)
                    .ok_or_else(|| "expected boolean".to_string())?;
                (port.dispatch)(DesktopAction::SetTaskbarExpanded { expanded });
                Ok(Value::Null)
            }
        }),
    );

    methods.insert(
        "rememberOpenApps".to_string(),
        service_method(move |_args: Vec<Value>| {
            let port = port.clone();
            async move {
                let startup = startup_apps_from_state(&(port.snapshot)());
                let count = startup.len();
                (port.save_startup_apps)(startup);
                Ok(json!(count))
            }
        }),
    );

    methods
}

fn open_app(port: &ShellPort, args: &[Value]) -> Result<Value, String> {
    let raw = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| "expected app id string".to_string())?;
    let app_id = ApplicationId::new(raw)?;
    let mut descriptor =
        apps::descriptor_for(&app_id).ok_or_else(|| format!("unknown app `{app_id}`"))?;
    if let (Some(x), Some(y)) = (
        args.get(1).and_then(Value::as_i64),
        args.get(2).and_then(Value::as_i64),
    ) {
        let coordinate = |value: i64| {
            i32::try_from(value).map_err(|_| format!("position {value} is out of range"))
        };
        descriptor.position = Some(Point::new(coordinate(x)?, coordinate(y)?));
    }

    let next_id = (port.snapshot)().next_window_id;
    (port.dispatch)(DesktopAction::AddWindow {
        descriptor,
        launcher_ref: None,
    });
    Ok(json!(next_id))
}

fn window_id_arg(args: &[Value]) -> Result<WindowId, String> {
    args.first()
        .and_then(Value::as_u64)
        .map(WindowId)
        .ok_or_else(|| "expected window id".to_string())
}

fn list_windows(state: &DesktopState) -> Value {
    Value::Array(
        state
            .windows
            .iter()
            .map(|w| {
                json!({
                    "id": w.id.0,
                    "appId": w.app_id.as_ref().map(ApplicationId::as_str),
                    "title": w.title,
                    "minimized": w.is_minimized,
                    "focused": w.is_focused,
                })
            })
            .collect(),
    )
}

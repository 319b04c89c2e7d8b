//! Persistence of taskbar settings and the startup app list through the host blob store.
//!
//! Both records are plain text: taskbar settings as `key=value` lines, startup apps as
//! `appId[,x:y]` lines. Loading never fails; missing or unreadable records fall back to defaults.

use desktop_app_contract::{ApplicationId, Point};
use leptos::logging;
use platform_host::BlobStore;

use crate::model::{DesktopState, TaskbarPlacement, TaskbarSettings};

pub const SYSTEM_FOLDER_ID: &str = "system";
const SYSTEM_FOLDER_NAME: &str = "System";
pub const TASKBAR_SETTINGS_FILE_ID: &str = "system.taskbar";
const TASKBAR_SETTINGS_FILE_NAME: &str = "taskbar.conf";
pub const STARTUP_APPS_FILE_ID: &str = "system.startup-apps";
const STARTUP_APPS_FILE_NAME: &str = "startup-apps.conf";

/// App opened automatically at boot, optionally at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupApp {
    pub app_id: ApplicationId,
    pub position: Option<Point>,
}

impl StartupApp {
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            position: None,
        }
    }
}

/// Startup list used when none has been saved yet.
pub fn default_startup_apps() -> Vec<StartupApp> {
    vec![StartupApp::new(ApplicationId::trusted("me"))]
}

/// Startup list matching the visible app windows, bottom to top.
pub fn startup_apps_from_state(state: &DesktopState) -> Vec<StartupApp> {
    state
        .visible_windows()
        .filter_map(|w| {
            Some(StartupApp {
                app_id: w.app_id.clone()?,
                position: Some(w.position),
            })
        })
        .collect()
}

pub fn encode_taskbar_settings(settings: TaskbarSettings) -> String {
    format!(
        "placement={}\nexpanded={}\n",
        settings.placement.token(),
        settings.expanded
    )
}

/// Parses `key=value` lines; unknown keys and bad values leave the default in place.
pub fn decode_taskbar_settings(raw: &str) -> TaskbarSettings {
    let mut settings = TaskbarSettings::default();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            logging::warn!("ignoring malformed taskbar setting line `{line}`");
            continue;
        };
        match key.trim() {
            "placement" => match TaskbarPlacement::parse(value) {
                Some(placement) => settings.placement = placement,
                None => logging::warn!("ignoring unknown taskbar placement `{value}`"),
            },
            "expanded" => match parse_flag(value) {
                Some(expanded) => settings.expanded = expanded,
                None => logging::warn!("ignoring invalid taskbar expanded flag `{value}`"),
            },
            _ => {}
        }
    }
    settings
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn encode_startup_apps(apps: &[StartupApp]) -> String {
    let mut out = String::new();
    for app in apps {
        out.push_str(app.app_id.as_str());
        if let Some(position) = app.position {
            out.push_str(&format!(",{}:{}", position.x, position.y));
        }
        out.push('\n');
    }
    out
}

/// Parses `appId[,x:y]` lines.
///
/// Lines with an invalid app id are dropped; an unparsable position drops only the position.
pub fn decode_startup_apps(raw: &str) -> Vec<StartupApp> {
    let mut apps = Vec::new();
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (id_part, position_part) = match line.split_once(',') {
            Some((id, position)) => (id.trim(), Some(position.trim())),
            None => (line, None),
        };
        let app_id = match ApplicationId::new(id_part) {
            Ok(app_id) => app_id,
            Err(err) => {
                logging::warn!("ignoring startup app line `{line}`: {err}");
                continue;
            }
        };
        let position = position_part.and_then(|raw| {
            let parsed = parse_position(raw);
            if parsed.is_none() {
                logging::warn!("ignoring startup position `{raw}` for `{app_id}`");
            }
            parsed
        });
        apps.push(StartupApp { app_id, position });
    }
    apps
}

fn parse_position(raw: &str) -> Option<Point> {
    let (x, y) = raw.split_once(':')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

async fn load_text(store: &dyn BlobStore, file_id: &str) -> Option<String> {
    match store.load_file(file_id).await {
        Ok(Some(file)) => match String::from_utf8(file.blob) {
            Ok(text) => Some(text),
            Err(err) => {
                logging::warn!("`{file_id}` is not valid utf-8, using defaults: {err}");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            logging::warn!("loading `{file_id}` failed, using defaults: {err}");
            None
        }
    }
}

async fn save_text(
    store: &dyn BlobStore,
    file_id: &str,
    file_name: &str,
    text: &str,
) -> Result<(), String> {
    store
        .create_folder(SYSTEM_FOLDER_ID, SYSTEM_FOLDER_NAME, None)
        .await?;
    store
        .save_file(file_id, file_name, SYSTEM_FOLDER_ID, text.as_bytes())
        .await
}

pub async fn load_taskbar_settings(store: &dyn BlobStore) -> TaskbarSettings {
    load_text(store, TASKBAR_SETTINGS_FILE_ID)
        .await
        .map(|raw| decode_taskbar_settings(&raw))
        .unwrap_or_default()
}

pub async fn save_taskbar_settings(
    store: &dyn BlobStore,
    settings: TaskbarSettings,
) -> Result<(), String> {
    save_text(
        store,
        TASKBAR_SETTINGS_FILE_ID,
        TASKBAR_SETTINGS_FILE_NAME,
        &encode_taskbar_settings(settings),
    )
    .await
}

pub async fn load_startup_apps(store: &dyn BlobStore) -> Vec<StartupApp> {
    load_text(store, STARTUP_APPS_FILE_ID)
        .await
        .map(|raw| decode_startup_apps(&raw))
        .unwrap_or_else(default_startup_apps)
}

pub async fn save_startup_apps(store: &dyn BlobStore, apps: &[StartupApp]) -> Result<(), String> {
    save_text(
        store,
        STARTUP_APPS_FILE_ID,
        STARTUP_APPS_FILE_NAME,
        &encode_startup_apps(apps),
    )
    .await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{FolderChild, MemoryBlobStore};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn taskbar_settings_decode_skips_noise() {
        let raw = "# shell\nplacement = left\nexpanded=yes\ncolor=red\nbroken line\nexpanded=1\n";
        assert_eq!(
            decode_taskbar_settings(raw),
            TaskbarSettings {
                placement: TaskbarPlacement::Left,
                expanded: true,
            }
        );
    }

    #[test]
    fn corrupt_taskbar_settings_fall_back_to_defaults() {
        let settings = decode_taskbar_settings("placement=top\n\u{0}\u{1}");
        assert_eq!(settings, TaskbarSettings::default());
        assert_eq!(settings.placement, TaskbarPlacement::Bottom);
    }

    #[test]
    fn taskbar_settings_text_format() {
        let text = encode_taskbar_settings(TaskbarSettings {
            placement: TaskbarPlacement::Right,
            expanded: false,
        });
        assert_eq!(text, "placement=right\nexpanded=false\n");
    }

    #[test]
    fn startup_apps_keep_app_when_position_is_bad() {
        let raw = "me\nexplorer,120:80\n\nbrowser,nope\nBad App\nsettings, -5 : 40 \n";
        assert_eq!(
            decode_startup_apps(raw),
            vec![
                StartupApp::new(ApplicationId::trusted("me")),
                StartupApp {
                    app_id: ApplicationId::trusted("explorer"),
                    position: Some(Point::new(120, 80)),
                },
                StartupApp::new(ApplicationId::trusted("browser")),
                StartupApp {
                    app_id: ApplicationId::trusted("settings"),
                    position: Some(Point::new(-5, 40)),
                },
            ]
        );
    }

    #[test]
    fn startup_apps_text_format() {
        let apps = vec![
            StartupApp::new(ApplicationId::trusted("me")),
            StartupApp {
                app_id: ApplicationId::trusted("explorer"),
                position: Some(Point::new(10, 20)),
            },
        ];
        assert_eq!(encode_startup_apps(&apps), "me\nexplorer,10:20\n");
    }

    #[test]
    fn missing_records_load_defaults() {
        let store = MemoryBlobStore::default();
        assert_eq!(
            block_on(load_taskbar_settings(&store)),
            TaskbarSettings::default()
        );
        assert_eq!(block_on(load_startup_apps(&store)), default_startup_apps());
    }

    #[test]
    fn saved_records_live_in_system_folder_and_load_back() {
        let store = MemoryBlobStore::default();
        let settings = TaskbarSettings {
            placement: TaskbarPlacement::Left,
            expanded: true,
        };
        block_on(save_taskbar_settings(&store, settings)).expect("save settings");
        block_on(save_startup_apps(
            &store,
            &[StartupApp::new(ApplicationId::trusted("browser"))],
        ))
        .expect("save startup");

        assert_eq!(block_on(load_taskbar_settings(&store)), settings);
        assert_eq!(
            block_on(load_startup_apps(&store)),
            vec![StartupApp::new(ApplicationId::trusted("browser"))]
        );

        let children = block_on(store.load_folder_children(SYSTEM_FOLDER_ID)).expect("list");
        assert_eq!(
            children,
            vec![
                FolderChild::File {
                    id: STARTUP_APPS_FILE_ID.to_string(),
                    name: STARTUP_APPS_FILE_NAME.to_string(),
                },
                FolderChild::File {
                    id: TASKBAR_SETTINGS_FILE_ID.to_string(),
                    name: TASKBAR_SETTINGS_FILE_NAME.to_string(),
                },
            ]
        );
    }

    #[test]
    fn non_utf8_blob_falls_back_to_defaults() {
        let store = MemoryBlobStore::default();
        block_on(store.save_file(TASKBAR_SETTINGS_FILE_ID, "x", SYSTEM_FOLDER_ID, &[0xff, 0xfe]))
            .expect("raw save");
        assert_eq!(
            block_on(load_taskbar_settings(&store)),
            TaskbarSettings::default()
        );
    }
}

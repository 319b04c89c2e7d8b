//! `localStorage`-backed blob store implementation.
//!
//! Each file and folder is one JSON record under a prefixed key. Listing a folder scans the
//! prefixed keys, which is fine for the handful of shell records this store holds.

use platform_host::{BlobStore, BlobStoreFuture, FolderChild, StoredFile};
use serde::{Deserialize, Serialize};

const FILE_KEY_PREFIX: &str = "desktop.blob.file.";
const FOLDER_KEY_PREFIX: &str = "desktop.blob.folder.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FolderRecord {
    name: String,
    parent_id: Option<String>,
}

fn file_key(id: &str) -> String {
    format!("{FILE_KEY_PREFIX}{id}")
}

fn folder_key(id: &str) -> String {
    format!("{FOLDER_KEY_PREFIX}{id}")
}

/// Builds a folder listing from raw `(key, json)` records.
fn children_from_records(
    folder_id: &str,
    records: impl IntoIterator<Item = (String, String)>,
) -> Vec<FolderChild> {
    let mut folders = Vec::new();
    let mut files = Vec::new();
    for (key, raw) in records {
        if let Some(id) = key.strip_prefix(FOLDER_KEY_PREFIX) {
            if let Ok(record) = serde_json::from_str::<FolderRecord>(&raw) {
                if record.parent_id.as_deref() == Some(folder_id) {
                    folders.push(FolderChild::Folder {
                        id: id.to_string(),
                        name: record.name,
                    });
                }
            }
        } else if key.starts_with(FILE_KEY_PREFIX) {
            if let Ok(file) = serde_json::from_str::<StoredFile>(&raw) {
                if file.folder_id == folder_id {
                    files.push(FolderChild::File {
                        id: file.id,
                        name: file.name,
                    });
                }
            }
        }
    }
    let sort_key = |child: &FolderChild| match child {
        FolderChild::Folder { id, .. } | FolderChild::File { id, .. } => id.clone(),
    };
    folders.sort_by_key(sort_key);
    files.sort_by_key(sort_key);
    folders.extend(files);
    folders
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser blob store backed by `window.localStorage`.
pub struct WebBlobStore;

impl WebBlobStore {
    #[cfg(target_arch = "wasm32")]
    fn storage() -> Result<web_sys::Storage, String> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| "localStorage unavailable".to_string())
    }

    fn get_raw(key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::storage()?
                .get_item(key)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn set_raw(key: &str, raw: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::storage()?
                .set_item(key, raw)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw);
            Ok(())
        }
    }

    fn remove_raw(key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::storage()?
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }

    fn all_records() -> Result<Vec<(String, String)>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = Self::storage()?;
            let len = storage
                .length()
                .map_err(|e| format!("localStorage length failed: {e:?}"))?;
            let mut records = Vec::new();
            for index in 0..len {
                let Some(key) = storage.key(index).ok().flatten() else {
                    continue;
                };
                if !key.starts_with(FILE_KEY_PREFIX) && !key.starts_with(FOLDER_KEY_PREFIX) {
                    continue;
                }
                if let Some(raw) = storage.get_item(&key).ok().flatten() {
                    records.push((key, raw));
                }
            }
            Ok(records)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(Vec::new())
        }
    }

    fn delete_folder_tree(id: &str) -> Result<(), String> {
        let records = Self::all_records()?;
        let mut doomed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor].clone();
            for child in children_from_records(&parent, records.iter().cloned()) {
                match child {
                    FolderChild::Folder { id, .. } => doomed.push(id),
                    FolderChild::File { id, .. } => Self::remove_raw(&file_key(&id))?,
                }
            }
            cursor += 1;
        }
        for folder in doomed {
            Self::remove_raw(&folder_key(&folder))?;
        }
        Ok(())
    }
}

impl BlobStore for WebBlobStore {
    fn load_file<'a>(
        &'a self,
        id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Option<StoredFile>, String>> {
        Box::pin(async move {
            let Some(raw) = Self::get_raw(&file_key(id))? else {
                return Ok(None);
            };
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| format!("corrupt blob record `{id}`: {e}"))
        })
    }

    fn save_file<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        folder_id: &'a str,
        blob: &'a [u8],
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let record = StoredFile {
                id: id.to_string(),
                name: name.to_string(),
                folder_id: folder_id.to_string(),
                blob: blob.to_vec(),
            };
            let raw = serde_json::to_string(&record).map_err(|e| e.to_string())?;
            Self::set_raw(&file_key(id), &raw)
        })
    }

    fn delete_file<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { Self::remove_raw(&file_key(id)) })
    }

    fn create_folder<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        parent_id: Option<&'a str>,
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let existing_parent = match Self::get_raw(&folder_key(id))? {
                Some(raw) => serde_json::from_str::<FolderRecord>(&raw)
                    .ok()
                    .and_then(|record| record.parent_id),
                None => parent_id.map(str::to_string),
            };
            let record = FolderRecord {
                name: name.to_string(),
                parent_id: existing_parent,
            };
            let raw = serde_json::to_string(&record).map_err(|e| e.to_string())?;
            Self::set_raw(&folder_key(id), &raw)
        })
    }

    fn load_folder_children<'a>(
        &'a self,
        folder_id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Vec<FolderChild>, String>> {
        Box::pin(async move { Ok(children_from_records(folder_id, Self::all_records()?)) })
    }

    fn delete_folder<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { Self::delete_folder_tree(id) })
    }
}

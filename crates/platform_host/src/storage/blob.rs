//! Key-value blob store and hierarchical folder namespace contracts.
//!
//! Files are opaque byte blobs addressed by id and filed under a folder id. Folders form a tree
//! rooted at folders created without a parent.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`BlobStore`] async methods.
pub type BlobStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A stored file record.
pub struct StoredFile {
    /// File id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning folder id.
    pub folder_id: String,
    /// File contents.
    pub blob: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry returned by [`BlobStore::load_folder_children`].
pub enum FolderChild {
    /// Nested folder.
    Folder {
        /// Folder id.
        id: String,
        /// Display name.
        name: String,
    },
    /// File in the folder.
    File {
        /// File id.
        id: String,
        /// Display name.
        name: String,
    },
}

/// Host service for persisting small blobs in a folder namespace.
pub trait BlobStore {
    /// Loads a file by id.
    fn load_file<'a>(&'a self, id: &'a str)
        -> BlobStoreFuture<'a, Result<Option<StoredFile>, String>>;

    /// Creates or replaces a file.
    fn save_file<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        folder_id: &'a str,
        blob: &'a [u8],
    ) -> BlobStoreFuture<'a, Result<(), String>>;

    /// Deletes a file; missing ids are not an error.
    fn delete_file<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>>;

    /// Creates a folder; creating an existing folder id only renames it.
    fn create_folder<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        parent_id: Option<&'a str>,
    ) -> BlobStoreFuture<'a, Result<(), String>>;

    /// Lists direct children of a folder, folders first, each group ordered by id.
    fn load_folder_children<'a>(
        &'a self,
        folder_id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Vec<FolderChild>, String>>;

    /// Deletes a folder with every nested folder and file.
    fn delete_folder<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op blob store for unsupported targets and baseline tests.
pub struct NoopBlobStore;

impl BlobStore for NoopBlobStore {
    fn load_file<'a>(
        &'a self,
        _id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Option<StoredFile>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_file<'a>(
        &'a self,
        _id: &'a str,
        _name: &'a str,
        _folder_id: &'a str,
        _blob: &'a [u8],
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_file<'a>(&'a self, _id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn create_folder<'a>(
        &'a self,
        _id: &'a str,
        _name: &'a str,
        _parent_id: Option<&'a str>,
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn load_folder_children<'a>(
        &'a self,
        _folder_id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Vec<FolderChild>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn delete_folder<'a>(&'a self, _id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone)]
struct FolderRecord {
    name: String,
    parent_id: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryBlobs {
    files: BTreeMap<String, StoredFile>,
    folders: BTreeMap<String, FolderRecord>,
}

impl MemoryBlobs {
    fn descendant_folders(&self, root: &str) -> Vec<String> {
        let mut found = vec![root.to_string()];
        let mut cursor = 0;
        while cursor < found.len() {
            let parent = found[cursor].clone();
            found.extend(
                self.folders
                    .iter()
                    .filter(|(_, folder)| folder.parent_id.as_deref() == Some(parent.as_str()))
                    .map(|(id, _)| id.clone()),
            );
            cursor += 1;
        }
        found
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory blob store keyed by id.
pub struct MemoryBlobStore {
    inner: Rc<RefCell<MemoryBlobs>>,
}

impl BlobStore for MemoryBlobStore {
    fn load_file<'a>(
        &'a self,
        id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Option<StoredFile>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().files.get(id).cloned()) })
    }

    fn save_file<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        folder_id: &'a str,
        blob: &'a [u8],
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().files.insert(
                id.to_string(),
                StoredFile {
                    id: id.to_string(),
                    name: name.to_string(),
                    folder_id: folder_id.to_string(),
                    blob: blob.to_vec(),
                },
            );
            Ok(())
        })
    }

    fn delete_file<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().files.remove(id);
            Ok(())
        })
    }

    fn create_folder<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
        parent_id: Option<&'a str>,
    ) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            if let Some(parent) = parent_id {
                if !inner.folders.contains_key(parent) {
                    return Err(format!("parent folder `{parent}` does not exist"));
                }
            }
            let record = inner.folders.entry(id.to_string()).or_insert(FolderRecord {
                name: String::new(),
                parent_id: parent_id.map(str::to_string),
            });
            record.name = name.to_string();
            Ok(())
        })
    }

    fn load_folder_children<'a>(
        &'a self,
        folder_id: &'a str,
    ) -> BlobStoreFuture<'a, Result<Vec<FolderChild>, String>> {
        Box::pin(async move {
            let inner = self.inner.borrow();
            let folders = inner
                .folders
                .iter()
                .filter(|(_, folder)| folder.parent_id.as_deref() == Some(folder_id))
                .map(|(id, folder)| FolderChild::Folder {
                    id: id.clone(),
                    name: folder.name.clone(),
                });
            let files = inner
                .files
                .values()
                .filter(|file| file.folder_id == folder_id)
                .map(|file| FolderChild::File {
                    id: file.id.clone(),
                    name: file.name.clone(),
                });
            Ok(folders.chain(files).collect())
        })
    }

    fn delete_folder<'a>(&'a self, id: &'a str) -> BlobStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            let doomed = inner.descendant_folders(id);
            for folder in &doomed {
                inner.folders.remove(folder);
            }
            inner
                .files
                .retain(|_, file| !doomed.iter().any(|folder| *folder == file.folder_id));
            Ok(())
        })
    }
}

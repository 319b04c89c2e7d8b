//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Only the blob store is implemented here; it persists into `window.localStorage` and degrades
//! to an always-empty store on native targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::local_blob::WebBlobStore;

/// Returns the blob store adapter for the current target.
pub fn blob_store() -> WebBlobStore {
    WebBlobStore
}

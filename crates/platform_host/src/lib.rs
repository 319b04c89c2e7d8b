//! Typed host-domain contracts used by the desktop runtime and browser adapters.
//!
//! This crate is the API-first boundary for the external storage collaborator. It exposes the
//! key-value blob store and folder namespace contract with in-memory/no-op adapters, plus time
//! helpers. Concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;

pub use storage::blob::{
    BlobStore, BlobStoreFuture, FolderChild, MemoryBlobStore, NoopBlobStore, StoredFile,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};

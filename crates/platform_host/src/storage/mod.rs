//! Persistence contracts for host-provided storage.

pub mod blob;

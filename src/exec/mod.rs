// src/exec/mod.rs

//! Action layer.
//!
//! [`backend`] defines the seams through which sync and rebuild actions
//! leave the watch loop, plus a logging implementation used by the binary.

pub mod backend;

pub use backend::{BackendFuture, LogBackend, RebuildBackend, SyncBackend};

// src/watch/mod.rs

//! File watching and change triage.
//!
//! This module is responsible for:
//! - Abstracting the OS filesystem watcher behind [`FileWatcher`], with a
//!   `notify`-backed implementation and a manually driven one for tests.
//! - Compiling per-trigger ignore patterns.
//! - Classifying raw change events into sync or rebuild mappings.
//!
//! It does **not** perform syncs or rebuilds; it only produces
//! [`crate::types::FileMapping`]s for the engine to act on.

pub mod ignore;
pub mod mock;
pub mod path_utils;
pub mod triage;
pub mod watcher;

pub use ignore::IgnoreMatcher;
pub use mock::{ManualWatcher, ManualWatcherHandle};
pub use triage::{run_triage, Classification, TriggerSet, SINK_CAPACITY};
pub use watcher::{ErrorStream, EventStream, FileEvent, FileWatcher, NotifyWatcher};

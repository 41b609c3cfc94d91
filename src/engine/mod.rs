// src/engine/mod.rs

//! Orchestration engine for devloop.
//!
//! This module ties together:
//! - the per-service triage tasks (see [`crate::watch::triage`]),
//! - the shared rebuild [`debounce`]r,
//! - the sync/rebuild backends,
//!
//! under a single cancellation token owned by the [`session`].

pub mod debounce;
pub mod session;

pub use debounce::{Debouncer, QUIET_PERIOD};
pub use session::WatchSession;

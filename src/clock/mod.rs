// src/clock/mod.rs

//! Time source for the debouncer.
//!
//! The debouncer never reads wall-clock time directly; it asks a [`Clock`]
//! for `now` and for a future that resolves at a deadline. Production code
//! uses [`TokioClock`]; tests drive [`ManualClock`] forward explicitly.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

pub mod manual;

pub use manual::ManualClock;

/// Future returned by [`Clock::sleep_until`].
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;

    /// Resolve once `now() >= deadline`.
    fn sleep_until(&self, deadline: Instant) -> Sleep;
}

/// Clock backed by `tokio::time`.
///
/// Because it goes through Tokio, it also follows a paused test runtime
/// (`#[tokio::test(start_paused = true)]`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep_until(&self, deadline: Instant) -> Sleep {
        Box::pin(tokio::time::sleep_until(tokio::time::Instant::from_std(
            deadline,
        )))
    }
}

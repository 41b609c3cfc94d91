pub mod builders;
pub mod recording_backend;

use std::future::Future;
use std::pin::Pin;
use std::sync::Once;
use std::time::Duration;

use devloop::types::RebuildServices;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Yield to other tasks a few times.
///
/// On the single-threaded test runtime this lets every woken task run until
/// it is blocked again.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Wait until the receiving side has taken every message sent on `tx`.
pub async fn wait_until_drained<T>(tx: &mpsc::Sender<T>) {
    while tx.capacity() < tx.max_capacity() {
        tokio::task::yield_now().await;
    }
    settle().await;
}

pub type RecorderFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A debouncer callback that forwards every batch to the returned receiver.
pub fn rebuild_recorder() -> (
    impl FnMut(RebuildServices) -> RecorderFuture + Send + 'static,
    mpsc::Receiver<RebuildServices>,
) {
    let (tx, rx) = mpsc::channel(16);
    let callback = move |services: RebuildServices| -> RecorderFuture {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(services).await;
        })
    };
    (callback, rx)
}

/// Build a `RebuildServices` set from names.
pub fn services(names: &[&str]) -> RebuildServices {
    names.iter().map(|s| s.to_string()).collect()
}

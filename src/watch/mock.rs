// src/watch/mock.rs

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::watcher::{ErrorStream, EventStream, FileEvent, FileWatcher, WATCHER_BUFFER};

#[derive(Debug, Default)]
struct ManualState {
    started: AtomicBool,
    closes: AtomicUsize,
    start_error: Mutex<Option<String>>,
}

/// [`FileWatcher`] whose events are fed by hand through a
/// [`ManualWatcherHandle`].
#[derive(Debug)]
pub struct ManualWatcher {
    events: Option<EventStream>,
    errors: Option<ErrorStream>,
    state: Arc<ManualState>,
}

/// Test-side end of a [`ManualWatcher`].
#[derive(Debug, Clone)]
pub struct ManualWatcherHandle {
    events: mpsc::Sender<FileEvent>,
    errors: mpsc::Sender<notify::Error>,
    state: Arc<ManualState>,
}

impl ManualWatcher {
    pub fn new() -> (Self, ManualWatcherHandle) {
        let (event_tx, event_rx) = mpsc::channel(WATCHER_BUFFER);
        let (error_tx, error_rx) = mpsc::channel(WATCHER_BUFFER);
        let state = Arc::new(ManualState::default());

        let watcher = Self {
            events: Some(event_rx),
            errors: Some(error_rx),
            state: Arc::clone(&state),
        };
        let handle = ManualWatcherHandle {
            events: event_tx,
            errors: error_tx,
            state,
        };
        (watcher, handle)
    }
}

impl FileWatcher for ManualWatcher {
    fn start(&mut self) -> notify::Result<()> {
        if let Some(msg) = self.state.start_error.lock().unwrap().take() {
            return Err(notify::Error::generic(&msg));
        }
        self.state.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> notify::Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn events(&mut self) -> Option<EventStream> {
        self.events.take()
    }

    fn errors(&mut self) -> Option<ErrorStream> {
        self.errors.take()
    }
}

impl ManualWatcherHandle {
    /// Deliver a change event. Returns false once the consumer is gone.
    pub async fn emit(&self, path: impl Into<PathBuf>) -> bool {
        self.events.send(FileEvent::new(path)).await.is_ok()
    }

    /// Deliver an asynchronous watcher failure.
    pub async fn fail(&self, err: notify::Error) -> bool {
        self.errors.send(err).await.is_ok()
    }

    /// Make the next `start()` fail with the given message.
    pub fn fail_start(&self, msg: impl Into<String>) {
        *self.state.start_error.lock().unwrap() = Some(msg.into());
    }

    pub fn is_started(&self) -> bool {
        self.state.started.load(Ordering::SeqCst)
    }

    /// How many times `close()` has been called.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

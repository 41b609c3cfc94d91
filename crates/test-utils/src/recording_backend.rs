use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use devloop::exec::{BackendFuture, RebuildBackend, SyncBackend};
use devloop::types::{FileMapping, RebuildServices};

/// A backend that records every sync and rebuild it is asked to perform.
///
/// Clones share the same records, so a test can keep one clone and hand
/// the others to the session.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    syncs: Arc<Mutex<Vec<FileMapping>>>,
    rebuilds: Arc<Mutex<Vec<RebuildServices>>>,
    changed: Arc<Notify>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn syncs(&self) -> Vec<FileMapping> {
        self.syncs.lock().unwrap().clone()
    }

    pub fn rebuilds(&self) -> Vec<RebuildServices> {
        self.rebuilds.lock().unwrap().clone()
    }

    /// Wait until at least `n` syncs have been recorded.
    pub async fn wait_for_syncs(&self, n: usize) -> Vec<FileMapping> {
        loop {
            let notified = self.changed.notified();
            {
                let guard = self.syncs.lock().unwrap();
                if guard.len() >= n {
                    return guard.clone();
                }
            }
            notified.await;
        }
    }

    /// Wait until at least `n` rebuild batches have been recorded.
    pub async fn wait_for_rebuilds(&self, n: usize) -> Vec<RebuildServices> {
        loop {
            let notified = self.changed.notified();
            {
                let guard = self.rebuilds.lock().unwrap();
                if guard.len() >= n {
                    return guard.clone();
                }
            }
            notified.await;
        }
    }
}

impl SyncBackend for RecordingBackend {
    fn sync(&mut self, mapping: FileMapping) -> BackendFuture<'_> {
        Box::pin(async move {
            self.syncs.lock().unwrap().push(mapping);
            self.changed.notify_waiters();
            Ok(())
        })
    }
}

impl RebuildBackend for RecordingBackend {
    fn rebuild(&mut self, services: RebuildServices) -> BackendFuture<'_> {
        Box::pin(async move {
            self.rebuilds.lock().unwrap().push(services);
            self.changed.notify_waiters();
            Ok(())
        })
    }
}

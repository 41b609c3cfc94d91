// src/engine/session.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::ServiceWatch;
use crate::engine::debounce::{Debouncer, QUIET_PERIOD};
use crate::errors::{DevloopError, Result};
use crate::exec::{RebuildBackend, SyncBackend};
use crate::types::FileMapping;
use crate::watch::triage::{run_triage, SINK_CAPACITY};
use crate::watch::watcher::FileWatcher;

/// One watch session over a set of services.
///
/// Running the session spawns:
/// - one triage task per service, each owning its watcher,
/// - one task draining sync mappings into the [`SyncBackend`],
/// - one shared [`Debouncer`] feeding the [`RebuildBackend`].
///
/// All of them observe the same cancellation token. A failing service is
/// reported but does not stop the others.
pub struct WatchSession<C: Clock + 'static> {
    cancel: CancellationToken,
    clock: C,
    quiet_period: Duration,
    services: Vec<(ServiceWatch, Box<dyn FileWatcher>)>,
}

impl<C: Clock + 'static> fmt::Debug for WatchSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.services.iter().map(|(w, _)| w.service.as_str()).collect();
        f.debug_struct("WatchSession")
            .field("services", &names)
            .field("quiet_period", &self.quiet_period)
            .finish_non_exhaustive()
    }
}

impl<C: Clock + 'static> WatchSession<C> {
    pub fn new(cancel: CancellationToken, clock: C) -> Self {
        Self {
            cancel,
            clock,
            quiet_period: QUIET_PERIOD,
            services: Vec::new(),
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn add_service<W: FileWatcher + 'static>(&mut self, watch: ServiceWatch, watcher: W) {
        self.services.push((watch, Box::new(watcher)));
    }

    /// Run until cancellation or until every service's triage has ended.
    ///
    /// Returns the first service failure, if any; the others are logged.
    pub async fn run<S, R>(self, sync_backend: S, rebuild_backend: R) -> Result<()>
    where
        S: SyncBackend + 'static,
        R: RebuildBackend + 'static,
    {
        let WatchSession {
            cancel,
            clock,
            quiet_period,
            services,
        } = self;

        let (sync_tx, sync_rx) = mpsc::channel::<FileMapping>(SINK_CAPACITY);
        let (rebuild_tx, rebuild_rx) = mpsc::channel::<FileMapping>(SINK_CAPACITY);

        let sync_task = tokio::spawn(drain_sync(cancel.clone(), sync_rx, sync_backend));

        let rebuild_backend = Arc::new(Mutex::new(rebuild_backend));
        let debounce_task = tokio::spawn(Debouncer::new(clock, quiet_period).run(
            cancel.clone(),
            rebuild_rx,
            move |services| {
                let backend = Arc::clone(&rebuild_backend);
                async move {
                    let mut backend = backend.lock().await;
                    if let Err(err) = backend.rebuild(services).await {
                        warn!(error = %err, "rebuild backend failed");
                    }
                }
            },
        ));

        let mut triage = JoinSet::new();
        for (watch, watcher) in services {
            let cancel = cancel.clone();
            let sync_tx = sync_tx.clone();
            let rebuild_tx = rebuild_tx.clone();
            info!(service = %watch.service, "watch enabled");
            triage.spawn(async move {
                run_triage(
                    cancel,
                    &watch.service,
                    watcher,
                    watch.triggers,
                    sync_tx,
                    rebuild_tx,
                )
                .await
            });
        }
        // Only the triage tasks hold senders now; once they all end, both
        // consumers see their input close.
        drop(sync_tx);
        drop(rebuild_tx);

        let mut failures: Vec<DevloopError> = Vec::new();
        while let Some(joined) = triage.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(service = err.service().unwrap_or("?"), error = %err, "service watch failed");
                    failures.push(err);
                }
                Err(join_err) => {
                    error!(error = %join_err, "watch task panicked or was aborted");
                    failures.push(DevloopError::Other(anyhow!(join_err)));
                }
            }
        }
        debug!("all triage tasks finished");

        if let Err(err) = sync_task.await {
            warn!(error = %err, "sync task did not finish cleanly");
        }
        if let Err(err) = debounce_task.await {
            warn!(error = %err, "debounce task did not finish cleanly");
        }

        info!(failed = failures.len(), "watch session finished");
        match failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn drain_sync<S: SyncBackend>(
    cancel: CancellationToken,
    mut rx: mpsc::Receiver<FileMapping>,
    mut backend: S,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            msg = rx.recv() => {
                let Some(mapping) = msg else { break };
                let service = mapping.service.clone();
                if let Err(err) = backend.sync(mapping).await {
                    warn!(service = %service, error = %err, "sync backend failed");
                }
            }
        }
    }
    debug!("sync drain stopped");
}

// src/watch/triage.rs

//! Per-service classification of raw watcher events.
//!
//! Each event path is matched against the service's triggers in declaration
//! order. The first trigger whose root contains the path decides what
//! happens: the event is ignored by pattern, forwarded as a sync mapping, or
//! forwarded as a rebuild request.

use std::fmt;
use std::path::Path;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::Trigger;
use crate::errors::{DevloopError, Result};
use crate::types::{FileMapping, ServiceName, TriggerAction};
use crate::watch::ignore::IgnoreMatcher;
use crate::watch::path_utils::{container_join, relative_str};
use crate::watch::watcher::FileWatcher;

/// Capacity of the `need_sync` / `need_rebuild` sinks. Producers wait when a
/// sink is full.
pub const SINK_CAPACITY: usize = 64;

/// Outcome of matching one path against a service's triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Sync(FileMapping),
    Rebuild(FileMapping),
    /// Under a trigger root but excluded by an ignore pattern.
    Ignored,
    /// Outside every trigger root.
    Unmatched,
}

struct CompiledTrigger {
    trigger: Trigger,
    ignore: IgnoreMatcher,
}

/// A service's triggers with their ignore patterns compiled.
pub struct TriggerSet {
    service: ServiceName,
    triggers: Vec<CompiledTrigger>,
}

impl fmt::Debug for TriggerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSet")
            .field("service", &self.service)
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

impl TriggerSet {
    pub fn new(service: impl Into<ServiceName>, triggers: Vec<Trigger>) -> Result<Self> {
        let service = service.into();
        let mut compiled = Vec::with_capacity(triggers.len());
        for (index, trigger) in triggers.into_iter().enumerate() {
            let ignore = IgnoreMatcher::new(&trigger.ignore).map_err(|err| {
                DevloopError::InvalidTrigger {
                    service: service.clone(),
                    index,
                    reason: format!("`ignore`: {err:#}"),
                }
            })?;
            compiled.push(CompiledTrigger { trigger, ignore });
        }
        Ok(Self {
            service,
            triggers: compiled,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Classify a changed path. The first trigger containing the path wins,
    /// even if its ignore patterns then discard the event.
    pub fn classify(&self, path: &Path) -> Classification {
        for ct in &self.triggers {
            let Some(rel) = relative_str(&ct.trigger.path, path) else {
                continue;
            };

            if ct.ignore.is_ignored(&rel) {
                return Classification::Ignored;
            }

            return match ct.trigger.action {
                TriggerAction::Sync => {
                    let target = ct.trigger.target.as_deref().unwrap_or("/");
                    Classification::Sync(FileMapping::sync(
                        self.service.clone(),
                        path,
                        container_join(target, &rel),
                    ))
                }
                TriggerAction::Rebuild => {
                    Classification::Rebuild(FileMapping::rebuild(self.service.clone()))
                }
            };
        }
        Classification::Unmatched
    }
}

/// Run one service's watch session until cancellation, a watcher error, or
/// the watcher's event stream ending.
///
/// The watcher is started here and closed on every exit path.
pub async fn run_triage<W: FileWatcher>(
    cancel: CancellationToken,
    service: &str,
    mut watcher: W,
    triggers: Vec<Trigger>,
    need_sync: mpsc::Sender<FileMapping>,
    need_rebuild: mpsc::Sender<FileMapping>,
) -> Result<()> {
    let set = TriggerSet::new(service, triggers)?;

    if let Err(source) = watcher.start() {
        // A partial start may still hold OS handles.
        if let Err(err) = watcher.close() {
            warn!(service = %service, error = %err, "failed to close file watcher");
        }
        return Err(DevloopError::WatchStart {
            service: service.to_string(),
            source,
        });
    }

    info!(service = %service, triggers = set.triggers.len(), "watch session started");

    let result = triage_loop(&cancel, &set, &mut watcher, &need_sync, &need_rebuild).await;

    if let Err(err) = watcher.close() {
        warn!(service = %service, error = %err, "failed to close file watcher");
    }

    match &result {
        Ok(()) => info!(service = %service, "watch session ended"),
        Err(err) => warn!(service = %service, error = %err, "watch session failed"),
    }
    result
}

async fn triage_loop<W: FileWatcher>(
    cancel: &CancellationToken,
    set: &TriggerSet,
    watcher: &mut W,
    need_sync: &mpsc::Sender<FileMapping>,
    need_rebuild: &mpsc::Sender<FileMapping>,
) -> Result<()> {
    let service = set.service();
    let mut events = watcher
        .events()
        .ok_or_else(|| anyhow!("service '{service}': watcher event stream already taken"))?;
    let mut errors = watcher
        .errors()
        .ok_or_else(|| anyhow!("service '{service}': watcher error stream already taken"))?;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(service = %service, "cancellation requested");
                return Ok(());
            }

            Some(source) = errors.recv() => {
                return Err(DevloopError::WatcherRuntime {
                    service: service.to_string(),
                    source,
                });
            }

            event = events.recv() => {
                let Some(event) = event else {
                    debug!(service = %service, "watcher event stream closed");
                    return Ok(());
                };

                let (sink, mapping) = match set.classify(&event.path) {
                    Classification::Unmatched => {
                        trace!(service = %service, path = ?event.path, "no trigger matched");
                        continue;
                    }
                    Classification::Ignored => {
                        debug!(service = %service, path = ?event.path, "ignored by pattern");
                        continue;
                    }
                    Classification::Sync(m) => (need_sync, m),
                    Classification::Rebuild(m) => (need_rebuild, m),
                };

                debug!(service = %service, path = ?event.path, ?mapping, "classified change");

                if !forward(cancel, sink, mapping).await {
                    if cancel.is_cancelled() {
                        return Ok(());
                    }
                    warn!(service = %service, "downstream sink closed; stopping watch session");
                    return Ok(());
                }
            }
        }
    }
}

/// Send onto a sink, giving up if cancellation fires while the sink is full.
/// Returns false if the mapping was not delivered.
async fn forward(
    cancel: &CancellationToken,
    sink: &mpsc::Sender<FileMapping>,
    mapping: FileMapping,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        res = sink.send(mapping) => res.is_ok(),
    }
}

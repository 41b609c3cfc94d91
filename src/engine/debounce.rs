// src/engine/debounce.rs

//! Coalescing of rebuild requests.
//!
//! Rebuild mappings from every service flow into one [`Debouncer`]. Each
//! arrival adds its service to the pending set and pushes the deadline out to
//! `now + quiet_period`. When the deadline passes with no new arrival, the
//! callback receives the whole set once and a fresh set starts.
//!
//! Cancellation while a batch is pending discards the batch: the session is
//! tearing down, so a rebuild would be moot. If the input channel closes
//! instead, the pending batch is flushed first, since no further arrival can
//! extend its window.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::types::{FileMapping, RebuildServices};

/// Default quiet period before a batch of rebuilds is released.
pub const QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Debouncer<C: Clock> {
    clock: C,
    quiet_period: Duration,
}

impl<C: Clock> Debouncer<C> {
    pub fn new(clock: C, quiet_period: Duration) -> Self {
        Self {
            clock,
            quiet_period,
        }
    }

    /// Consume `input` until cancellation or until every sender is gone.
    ///
    /// `on_rebuild` is awaited inline, so invocations never overlap. While it
    /// runs, new mappings stay queued in `input` and land in the next batch.
    /// Cancellation also interrupts an in-flight callback.
    pub async fn run<F, Fut>(
        self,
        cancel: CancellationToken,
        mut input: mpsc::Receiver<FileMapping>,
        mut on_rebuild: F,
    ) where
        F: FnMut(RebuildServices) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut pending = RebuildServices::new();
        let mut deadline: Option<Instant> = None;

        debug!(quiet_period = ?self.quiet_period, "debouncer started");

        loop {
            let timer = async {
                match deadline {
                    Some(at) => self.clock.sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    if !pending.is_empty() {
                        debug!(discarded = ?pending, "cancelled with pending rebuilds; discarding");
                    }
                    break;
                }

                // Queued arrivals are taken before the deadline is checked, so a
                // mapping sent before the deadline always extends the window.
                msg = input.recv() => {
                    match msg {
                        Some(mapping) => {
                            if pending.insert(mapping.service.clone()) {
                                debug!(service = %mapping.service, "service queued for rebuild");
                            }
                            deadline = Some(self.clock.now() + self.quiet_period);
                        }
                        None => {
                            if !pending.is_empty() {
                                let batch = std::mem::take(&mut pending);
                                info!(services = ?batch, "input closed; flushing pending rebuilds");
                                on_rebuild(batch).await;
                            }
                            break;
                        }
                    }
                }

                _ = timer => {
                    deadline = None;
                    let batch = std::mem::take(&mut pending);
                    if batch.is_empty() {
                        continue;
                    }
                    info!(services = ?batch, "quiet period elapsed; requesting rebuild");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!("cancelled during rebuild callback");
                            break;
                        }
                        _ = on_rebuild(batch) => {}
                    }
                }
            }
        }

        debug!("debouncer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn empty_input_stops_without_callback() {
        let (tx, rx) = mpsc::channel::<FileMapping>(4);
        drop(tx);
        let mut calls = 0;
        Debouncer::new(ManualClock::new(), QUIET_PERIOD)
            .run(CancellationToken::new(), rx, |_| {
                calls += 1;
                std::future::ready(())
            })
            .await;
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn closed_input_flushes_pending_batch() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(FileMapping::rebuild("api")).await.unwrap();
        tx.send(FileMapping::rebuild("api")).await.unwrap();
        tx.send(FileMapping::rebuild("web")).await.unwrap();
        drop(tx);

        let mut got = Vec::new();
        Debouncer::new(ManualClock::new(), QUIET_PERIOD)
            .run(CancellationToken::new(), rx, |services| {
                got.push(services);
                std::future::ready(())
            })
            .await;

        assert_eq!(got.len(), 1);
        assert_eq!(
            got[0].iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["api", "web"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_fires_after_quiet_period() {
        use crate::clock::TokioClock;

        let (tx, rx) = mpsc::channel(4);
        let (fired_tx, mut fired_rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();

        let start = tokio::time::Instant::now();
        tx.send(FileMapping::rebuild("app")).await.unwrap();

        let task = tokio::spawn(Debouncer::new(TokioClock, QUIET_PERIOD).run(
            cancel.clone(),
            rx,
            move |services| {
                let fired_tx = fired_tx.clone();
                async move {
                    let _ = fired_tx.send((tokio::time::Instant::now(), services)).await;
                }
            },
        ));

        let (at, services) = fired_rx.recv().await.unwrap();
        assert!(at - start >= QUIET_PERIOD);
        assert!(services.contains("app"));

        cancel.cancel();
        task.await.unwrap();
    }
}

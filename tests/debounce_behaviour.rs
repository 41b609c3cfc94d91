// tests/debounce_behaviour.rs

mod common;
use crate::common::{init_tracing, rebuild_recorder, services, settle, wait_until_drained, with_timeout};

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use devloop::clock::ManualClock;
use devloop::engine::{Debouncer, QUIET_PERIOD};
use devloop::types::{FileMapping, RebuildServices};

type TestResult = Result<(), Box<dyn Error>>;

const MS: Duration = Duration::from_millis(1);

struct Harness {
    clock: ManualClock,
    cancel: CancellationToken,
    input: mpsc::Sender<FileMapping>,
    fired: mpsc::Receiver<RebuildServices>,
    task: JoinHandle<()>,
}

impl Harness {
    fn start() -> Self {
        let clock = ManualClock::new();
        let cancel = CancellationToken::new();
        let (input, rx) = mpsc::channel(128);
        let (callback, fired) = rebuild_recorder();

        let task = tokio::spawn(
            Debouncer::new(clock.clone(), QUIET_PERIOD).run(cancel.clone(), rx, callback),
        );

        Self {
            clock,
            cancel,
            input,
            fired,
            task,
        }
    }

    async fn request(&self, service: &str) -> TestResult {
        self.input.send(FileMapping::rebuild(service)).await?;
        wait_until_drained(&self.input).await;
        Ok(())
    }

    async fn advance(&self, by: Duration) {
        self.clock.advance(by);
        settle().await;
    }

    fn assert_idle(&mut self) {
        assert!(
            self.fired.try_recv().is_err(),
            "rebuild callback fired before the quiet period elapsed"
        );
    }

    async fn next_batch(&mut self) -> Result<RebuildServices, Box<dyn Error>> {
        Ok(with_timeout(self.fired.recv())
            .await
            .ok_or("debouncer stopped")?)
    }

    async fn shutdown(self) -> TestResult {
        self.cancel.cancel();
        with_timeout(self.task).await?;
        Ok(())
    }
}

#[tokio::test]
async fn burst_of_requests_yields_one_callback() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    for _ in 0..100 {
        h.input.send(FileMapping::rebuild("api")).await?;
    }
    wait_until_drained(&h.input).await;

    h.advance(QUIET_PERIOD).await;
    assert_eq!(h.next_batch().await?, services(&["api"]));

    h.advance(QUIET_PERIOD * 4).await;
    h.assert_idle();

    h.shutdown().await
}

#[tokio::test]
async fn fires_exactly_when_quiet_period_elapses() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    h.request("app").await?;

    h.advance(QUIET_PERIOD - MS).await;
    h.assert_idle();

    h.advance(MS).await;
    assert_eq!(h.next_batch().await?, services(&["app"]));

    h.shutdown().await
}

#[tokio::test]
async fn new_arrival_restarts_quiet_period() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    h.request("A").await?;
    h.advance(Duration::from_millis(400)).await;
    h.assert_idle();

    h.request("B").await?;
    h.advance(Duration::from_millis(400)).await;
    // 800ms since A, but only 400ms since B.
    h.assert_idle();

    h.advance(Duration::from_millis(100)).await;
    assert_eq!(h.next_batch().await?, services(&["A", "B"]));

    h.shutdown().await
}

#[tokio::test]
async fn arrival_queued_just_before_deadline_joins_the_batch() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    h.request("A").await?;
    h.advance(QUIET_PERIOD - MS).await;

    // Still sitting in the channel when the deadline passes.
    h.input.send(FileMapping::rebuild("B")).await?;
    h.advance(MS).await;
    h.assert_idle();

    h.advance(QUIET_PERIOD).await;
    assert_eq!(h.next_batch().await?, services(&["A", "B"]));

    h.advance(QUIET_PERIOD * 2).await;
    h.assert_idle();

    h.shutdown().await
}

#[tokio::test]
async fn each_quiet_period_starts_a_fresh_set() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    h.request("A").await?;
    h.request("A").await?;
    h.advance(QUIET_PERIOD).await;
    assert_eq!(h.next_batch().await?, services(&["A"]));

    h.request("B").await?;
    h.advance(QUIET_PERIOD).await;
    assert_eq!(h.next_batch().await?, services(&["B"]));

    h.shutdown().await
}

#[tokio::test]
async fn cancellation_discards_pending_batch() -> TestResult {
    init_tracing();
    let mut h = Harness::start();

    h.request("A").await?;
    h.advance(QUIET_PERIOD / 2).await;
    assert_eq!(h.clock.sleepers(), 1, "debouncer should be waiting on the deadline");

    h.cancel.cancel();
    with_timeout(&mut h.task).await?;
    assert_eq!(h.clock.sleepers(), 0, "timer must be dropped on cancellation");

    // The callback went away with the task without ever being invoked.
    assert_eq!(with_timeout(h.fired.recv()).await, None);
    Ok(())
}

#[tokio::test]
async fn callbacks_run_one_at_a_time() -> TestResult {
    init_tracing();

    let clock = ManualClock::new();
    let cancel = CancellationToken::new();
    let (input, rx) = mpsc::channel(16);
    let (started_tx, mut started) = mpsc::channel::<RebuildServices>(4);
    let gate = Arc::new(Semaphore::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let callback = {
        let gate = Arc::clone(&gate);
        let in_flight = Arc::clone(&in_flight);
        let max_in_flight = Arc::clone(&max_in_flight);
        move |batch: RebuildServices| {
            let gate = Arc::clone(&gate);
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            let started_tx = started_tx.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                let _ = started_tx.send(batch).await;
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        }
    };

    let task = tokio::spawn(
        Debouncer::new(clock.clone(), QUIET_PERIOD).run(cancel.clone(), rx, callback),
    );

    input.send(FileMapping::rebuild("A")).await?;
    wait_until_drained(&input).await;
    clock.advance(QUIET_PERIOD);
    let first = with_timeout(started.recv()).await.ok_or("callback never ran")?;
    assert_eq!(first, services(&["A"]));

    // Arrives while the first callback is still running.
    input.send(FileMapping::rebuild("B")).await?;
    settle().await;
    clock.advance(QUIET_PERIOD * 2);
    settle().await;
    assert!(started.try_recv().is_err(), "second callback overlapped the first");

    gate.add_permits(1);
    wait_until_drained(&input).await;
    clock.advance(QUIET_PERIOD);
    let second = with_timeout(started.recv()).await.ok_or("callback never ran")?;
    assert_eq!(second, services(&["B"]));

    gate.add_permits(1);
    settle().await;
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);

    cancel.cancel();
    with_timeout(task).await?;
    Ok(())
}

#[tokio::test]
async fn cancellation_interrupts_running_callback() -> TestResult {
    init_tracing();

    let clock = ManualClock::new();
    let cancel = CancellationToken::new();
    let (input, rx) = mpsc::channel(4);

    let task = tokio::spawn(Debouncer::new(clock.clone(), QUIET_PERIOD).run(
        cancel.clone(),
        rx,
        |_| std::future::pending::<()>(),
    ));

    input.send(FileMapping::rebuild("slow")).await?;
    wait_until_drained(&input).await;
    clock.advance(QUIET_PERIOD);
    settle().await;
    assert!(!task.is_finished());

    cancel.cancel();
    with_timeout(task).await?;
    Ok(())
}

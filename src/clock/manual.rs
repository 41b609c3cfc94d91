// src/clock/manual.rs

use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::{Clock, Sleep};

/// Virtual clock that only moves when [`ManualClock::advance`] is called.
///
/// Pending sleepers are woken on every advance and resolve once the virtual
/// time has reached their deadline. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: watch::Sender<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        let (now, _) = watch::channel(Instant::now());
        Self { now }
    }

    /// Move virtual time forward by `by`, waking any sleeper whose deadline
    /// has been reached.
    pub fn advance(&self, by: Duration) {
        self.now.send_modify(|now| *now += by);
    }

    /// Number of futures currently waiting on this clock.
    pub fn sleepers(&self) -> usize {
        self.now.receiver_count()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.borrow()
    }

    fn sleep_until(&self, deadline: Instant) -> Sleep {
        let mut rx = self.now.subscribe();
        Box::pin(async move {
            loop {
                if *rx.borrow_and_update() >= deadline {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Clock dropped: time can no longer advance.
                    std::future::pending::<()>().await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleeper_resolves_only_after_deadline() {
        let clock = ManualClock::new();
        let deadline = clock.now() + Duration::from_secs(2);
        let handle = tokio::spawn(clock.sleep_until(deadline));

        clock.advance(Duration::from_secs(1));
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        clock.advance(Duration::from_secs(1));
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sleeper should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn past_deadline_resolves_immediately() {
        let clock = ManualClock::new();
        let deadline = clock.now();
        clock.advance(Duration::from_millis(5));
        tokio::time::timeout(Duration::from_secs(1), clock.sleep_until(deadline))
            .await
            .expect("deadline already passed");
    }

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let start = a.now();
        b.advance(Duration::from_millis(250));
        assert_eq!(a.now() - start, Duration::from_millis(250));
    }
}

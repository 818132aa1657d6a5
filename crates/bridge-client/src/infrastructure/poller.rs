//! Cancellable repeating task.
//!
//! A [`PollingTask`] runs an async closure immediately and then once per
//! period until it is cancelled.  It is an RAII guard: dropping it cancels the
//! task, which is how a view stops its status polls when it is unmounted.
//!
//! # Why the in-flight poll is cancelled too
//!
//! The closure's future is awaited inside the same `select!` as the
//! cancellation token.  When the token fires, the pending future (and the
//! HTTP request inside it) is dropped on the spot, so a response that arrives
//! after unmount can never write into the view's state.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Shortest period a poll loop accepts; a zero period is raised to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running poll loop.  Cancelled on drop.
#[derive(Debug)]
pub struct PollingTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollingTask {
    /// Spawns a loop calling `poll` now and every `period` afterwards.
    ///
    /// A poll that takes longer than `period` delays the next tick instead of
    /// causing a burst of catch-up polls.  Must be called from within a Tokio
    /// runtime.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut poll: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period < MIN_PERIOD {
            warn!(task = name, ?period, "poll period too short, using {MIN_PERIOD:?}");
        }
        let period = period.max(MIN_PERIOD);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    () = token.cancelled() => break,
                    () = poll() => {}
                }
            }
            debug!(task = name, "polling task stopped");
        });

        debug!(task = name, ?period, "polling task started");
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stops the loop.  Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the spawned loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_every_period() {
        // Arrange
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);

        // Act
        let _task = PollingTask::spawn("test", Duration::from_secs(5), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        time::sleep(Duration::from_millis(10)).await;
        let after_start = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(10_100)).await;

        // Assert: t=0, t=5, t=10
        assert_eq!(after_start, 1);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_keeps_polling() {
        // Arrange
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);

        // Act
        let task = PollingTask::spawn("zero", Duration::ZERO, move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        time::sleep(Duration::from_millis(10)).await;

        // Assert: the loop is alive and ticking at the minimum period
        assert!(!task.is_finished());
        assert!(count.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let task = PollingTask::spawn("test", Duration::from_secs(1), move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        time::sleep(Duration::from_millis(10)).await;

        drop(task);
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_in_flight_poll() {
        // Arrange: the poll takes 3 s and only then records completion
        let completed = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&completed);
        let task = PollingTask::spawn("slow", Duration::from_secs(5), move || {
            let c = Arc::clone(&c);
            async move {
                time::sleep(Duration::from_secs(3)).await;
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        time::sleep(Duration::from_secs(1)).await;

        // Act: cancel while the first poll is still waiting
        task.cancel();
        time::sleep(Duration::from_secs(10)).await;

        // Assert
        assert!(task.is_cancelled());
        assert!(task.is_finished());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }
}

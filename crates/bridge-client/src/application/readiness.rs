//! Device readiness polling shared by the printer and scanner panels.

use std::future::Future;
use std::time::Duration;

use bridge_core::Readiness;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::infrastructure::api_client::ApiError;
use crate::infrastructure::poller::PollingTask;

/// Spawns a poll loop that runs `check` now and every `period`, publishing
/// the outcome as a [`Readiness`].
///
/// The channel starts at [`Readiness::Unknown`] and only ever changes to one
/// of the three poll outcomes.  Dropping the returned [`PollingTask`] stops
/// the loop and closes the channel.
pub(crate) fn spawn_readiness_poll<F, Fut>(
    name: &'static str,
    period: Duration,
    check: F,
) -> (PollingTask, watch::Receiver<Readiness>)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<bool, ApiError>> + Send + 'static,
{
    let (tx, rx) = watch::channel(Readiness::Unknown);
    let tx = std::sync::Arc::new(tx);

    let task = PollingTask::spawn(name, period, move || {
        let fut = check();
        let tx = std::sync::Arc::clone(&tx);
        async move {
            let result = fut.await;
            if let Err(e) = &result {
                debug!(task = name, error = %e, "status poll failed");
            }
            publish(name, &tx, Readiness::from_poll(&result));
        }
    });

    (task, rx)
}

/// Waits until the first poll has completed and returns its outcome.
pub(crate) async fn wait_for_first_poll(mut rx: watch::Receiver<Readiness>) -> Readiness {
    if let Ok(r) = rx.wait_for(|r| *r != Readiness::Unknown).await {
        return *r;
    }
    // The poll loop has stopped; report whatever it last saw.
    let last = *rx.borrow();
    last
}

fn publish(name: &'static str, tx: &watch::Sender<Readiness>, readiness: Readiness) {
    tx.send_if_modified(|current| {
        if *current == readiness {
            return false;
        }
        info!(task = name, from = ?*current, to = ?readiness, "device readiness changed");
        *current = readiness;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_poll_result_is_published() {
        let (_task, rx) =
            spawn_readiness_poll("test", Duration::from_secs(5), || async { Ok(false) });

        assert_eq!(wait_for_first_poll(rx).await, Readiness::NotReady);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_outcome_does_not_notify() {
        // Arrange
        let polls = Arc::new(AtomicU32::new(0));
        let p = Arc::clone(&polls);
        let (_task, mut rx) = spawn_readiness_poll("test", Duration::from_secs(5), move || {
            p.fetch_add(1, Ordering::SeqCst);
            async { Ok(true) }
        });
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        // Act: two more polls with the same answer
        tokio::time::sleep(Duration::from_millis(10_100)).await;

        // Assert
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), Readiness::Ready);
    }

    #[tokio::test]
    async fn test_closed_channel_reports_last_value() {
        let (task, rx) =
            spawn_readiness_poll("test", Duration::from_secs(5), || async { Ok(true) });
        let ready = wait_for_first_poll(rx.clone()).await;

        drop(task);

        assert_eq!(ready, Readiness::Ready);
        assert_eq!(wait_for_first_poll(rx).await, Readiness::Ready);
    }
}

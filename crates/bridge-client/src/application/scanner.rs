//! Scanner panel of the dashboard.
//!
//! Besides polling `/scanner/status` like the printer panel, the scanner
//! panel listens to the realtime hub.  The bridge pushes one event per
//! scanned item, and the panel prepends a line for each to its scan log:
//!
//! | Event                  | Log line                                         | Status                    |
//! |------------------------|--------------------------------------------------|---------------------------|
//! | `SINGLE_SCAN_RESULT`   | `[Single scan] {content}`                        | "Single scan completed."  |
//! | `BATCH_SCAN_PROGRESS`  | `[Batch {currentPage}/{totalPages}] {content}`   | unchanged                 |
//! | `BATCH_SCAN_COMPLETED` | `Batch scan completed: {totalScans} pages in total.` | "Batch scan completed." |
//!
//! The handlers run on the realtime client's task, so the log and status
//! live behind a mutex shared with the panel.  The three [`Subscription`]
//! guards unregister the handlers when the panel is dropped.

use std::sync::Arc;
use std::time::Duration;

use bridge_core::{EventKind, Readiness, ReadinessBadge, RealtimeEvent, ScanLog, SessionToken};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::ports::{RealtimeHub, ScannerApi, Subscription};
use crate::application::readiness::{spawn_readiness_poll, wait_for_first_poll};
use crate::infrastructure::poller::PollingTask;

pub const SCANNER_NOT_READY: &str = "The scanner is not ready.";
pub const REQUESTING_SCAN: &str = "Requesting scan…";
pub const SCAN_COMPLETED: &str = "Scan request completed.";
pub const SINGLE_SCAN_DONE: &str = "Single scan completed.";
pub const BATCH_SCAN_DONE: &str = "Batch scan completed.";

/// What the scanner view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSnapshot {
    pub readiness: Readiness,
    pub badge: ReadinessBadge,
    /// Newest first.
    pub log: Vec<String>,
    pub status: Option<String>,
}

#[derive(Debug)]
struct ScannerState {
    log: ScanLog,
    status: Option<String>,
}

impl ScannerState {
    fn apply(&mut self, event: &RealtimeEvent) {
        self.log.record(event);
        match event {
            RealtimeEvent::SingleScanResult(_) => self.status = Some(SINGLE_SCAN_DONE.to_string()),
            RealtimeEvent::BatchScanCompleted(_) => self.status = Some(BATCH_SCAN_DONE.to_string()),
            RealtimeEvent::BatchScanProgress(_) => {}
        }
    }
}

pub struct ScannerPanel {
    api: Arc<dyn ScannerApi>,
    token: SessionToken,
    readiness: watch::Receiver<Readiness>,
    state: Arc<Mutex<ScannerState>>,
    _subscriptions: Vec<Subscription>,
    poll: PollingTask,
}

impl ScannerPanel {
    /// Mounts the panel: subscribes to the scan events on `hub` and starts
    /// polling `/scanner/status`.
    ///
    /// `scan_log_capacity` of `None` keeps every line.  Must be called from
    /// within a Tokio runtime.
    pub fn mount(
        api: Arc<dyn ScannerApi>,
        hub: Arc<dyn RealtimeHub>,
        token: SessionToken,
        poll_interval: Duration,
        scan_log_capacity: Option<usize>,
    ) -> Self {
        let state = Arc::new(Mutex::new(ScannerState {
            log: ScanLog::with_capacity(scan_log_capacity),
            status: None,
        }));

        let subscriptions: Vec<Subscription> = EventKind::ALL
            .into_iter()
            .map(|kind| {
                let state = Arc::clone(&state);
                Subscription::register(
                    Arc::clone(&hub),
                    kind,
                    Arc::new(move |event: &RealtimeEvent| {
                        debug!(event = %event.kind(), "scan event received");
                        state.lock().apply(event);
                    }),
                )
            })
            .collect();

        let poll_api = Arc::clone(&api);
        let poll_token = token.clone();
        let (poll, readiness) =
            spawn_readiness_poll("scanner-status", poll_interval, move || {
                let api = Arc::clone(&poll_api);
                let token = poll_token.clone();
                async move { api.scanner_status(&token).await }
            });

        Self {
            api,
            token,
            readiness,
            state,
            _subscriptions: subscriptions,
            poll,
        }
    }

    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.readiness.clone()
    }

    /// Waits until the first status poll has completed.
    pub async fn wait_for_status(&self) -> Readiness {
        wait_for_first_poll(self.readiness.clone()).await
    }

    pub fn status(&self) -> Option<String> {
        self.state.lock().status.clone()
    }

    /// Scan log lines, newest first.
    pub fn log(&self) -> Vec<String> {
        self.state.lock().log.to_vec()
    }

    /// Asks the bridge to start a scan.  Results arrive as realtime events.
    ///
    /// Returns whether the bridge accepted the request; the status message
    /// says why when it did not.
    pub async fn scan(&self) -> bool {
        if !self.readiness().is_ready() {
            self.set_status(SCANNER_NOT_READY);
            return false;
        }

        self.set_status(REQUESTING_SCAN);
        let (accepted, status) = match self.api.scan(&self.token).await {
            Ok(response) => {
                info!("scan request accepted");
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| SCAN_COMPLETED.to_string());
                (true, message)
            }
            Err(e) => {
                warn!(error = %e, "scan request failed");
                (false, e.user_message())
            }
        };
        self.set_status(status);
        accepted
    }

    pub fn is_polling(&self) -> bool {
        !self.poll.is_cancelled()
    }

    pub fn snapshot(&self) -> ScannerSnapshot {
        let readiness = self.readiness();
        let state = self.state.lock();
        ScannerSnapshot {
            readiness,
            badge: readiness.badge(),
            log: state.log.to_vec(),
            status: state.status.clone(),
        }
    }

    fn set_status(&self, status: impl Into<String>) {
        self.state.lock().status = Some(status.into());
    }
}

impl std::fmt::Debug for ScannerPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerPanel")
            .field("readiness", &self.readiness())
            .field("log_len", &self.state.lock().log.len())
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

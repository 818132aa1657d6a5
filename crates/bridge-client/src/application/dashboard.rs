//! Dashboard view model.
//!
//! Mounting the dashboard does three things:
//!
//! 1. mounts the printer and scanner panels, each with its own status poll,
//! 2. asks the realtime hub to connect (a no-op if it already is),
//! 3. starts a fast poll of the hub's connection state for the header
//!    indicator.
//!
//! Dropping the dashboard stops all three polls and removes the scanner's
//! event handlers.  The realtime connection itself stays up, so navigating
//! away and back does not reconnect.

use std::sync::Arc;
use std::time::Duration;

use bridge_core::domain::scan_log::DEFAULT_SCAN_LOG_CAPACITY;
use bridge_core::SessionToken;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::application::ports::{PrinterApi, RealtimeHub, ScannerApi};
use crate::application::printer::{PrinterPanel, PrinterSnapshot};
use crate::application::scanner::{ScannerPanel, ScannerSnapshot};
use crate::infrastructure::poller::PollingTask;

/// Timing and sizing knobs for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub status_poll_interval: Duration,
    pub connection_poll_interval: Duration,
    /// `None` keeps every scan log line.
    pub scan_log_capacity: Option<usize>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            status_poll_interval: Duration::from_secs(5),
            connection_poll_interval: Duration::from_secs(1),
            scan_log_capacity: Some(DEFAULT_SCAN_LOG_CAPACITY),
        }
    }
}

/// The collaborators a dashboard needs.  Cheap to clone.
#[derive(Clone)]
pub struct DashboardServices {
    pub printer_api: Arc<dyn PrinterApi>,
    pub scanner_api: Arc<dyn ScannerApi>,
    pub realtime: Arc<dyn RealtimeHub>,
}

/// What the dashboard view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub realtime_connected: bool,
    pub printer: PrinterSnapshot,
    pub scanner: ScannerSnapshot,
}

#[derive(Debug)]
pub struct Dashboard {
    printer: PrinterPanel,
    scanner: ScannerPanel,
    realtime_connected: watch::Receiver<bool>,
    _connection_poll: PollingTask,
}

impl Dashboard {
    /// Mounts the dashboard for an authenticated session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        services: &DashboardServices,
        token: SessionToken,
        settings: &DashboardSettings,
    ) -> Self {
        let printer = PrinterPanel::mount(
            Arc::clone(&services.printer_api),
            token.clone(),
            settings.status_poll_interval,
        );
        // Subscribed before connecting, so no event from the first session
        // is missed.
        let scanner = ScannerPanel::mount(
            Arc::clone(&services.scanner_api),
            Arc::clone(&services.realtime),
            token,
            settings.status_poll_interval,
            settings.scan_log_capacity,
        );

        services.realtime.start_connection();

        let (tx, rx) = watch::channel(services.realtime.connection_state().is_connected());
        let tx = Arc::new(tx);
        let hub = Arc::clone(&services.realtime);
        let connection_poll = PollingTask::spawn(
            "realtime-indicator",
            settings.connection_poll_interval,
            move || {
                let connected = hub.connection_state().is_connected();
                let tx = Arc::clone(&tx);
                async move {
                    tx.send_if_modified(|current| {
                        if *current == connected {
                            return false;
                        }
                        debug!(connected, "realtime indicator changed");
                        *current = connected;
                        true
                    });
                }
            },
        );

        info!("dashboard mounted");
        Self {
            printer,
            scanner,
            realtime_connected: rx,
            _connection_poll: connection_poll,
        }
    }

    pub fn printer(&self) -> &PrinterPanel {
        &self.printer
    }

    pub fn printer_mut(&mut self) -> &mut PrinterPanel {
        &mut self.printer
    }

    pub fn scanner(&self) -> &ScannerPanel {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut ScannerPanel {
        &mut self.scanner
    }

    /// Value shown by the header indicator, refreshed by the connection poll.
    pub fn is_realtime_connected(&self) -> bool {
        *self.realtime_connected.borrow()
    }

    /// Waits for both panels' first status poll.
    pub async fn wait_for_status(&self) {
        tokio::join!(self.printer.wait_for_status(), self.scanner.wait_for_status());
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            realtime_connected: self.is_realtime_connected(),
            printer: self.printer.snapshot(),
            scanner: self.scanner.snapshot(),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        debug!("dashboard unmounted");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

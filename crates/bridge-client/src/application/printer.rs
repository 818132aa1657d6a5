//! Printer panel of the dashboard.
//!
//! The panel owns a [`PollingTask`] that asks the bridge for the printer's
//! readiness as soon as the panel is mounted and then on every poll period.
//! The latest [`Readiness`] is published through a `watch` channel; the
//! panel, and anyone holding a receiver from [`PrinterPanel::subscribe`],
//! always sees the most recent value.
//!
//! # Print flow
//!
//! ```text
//!   print()
//!     ├─ input blank?         → "Enter some content to print."   (no request)
//!     ├─ printer not ready?   → "The printer is not ready."      (no request)
//!     └─ "Sending print request…"
//!          ├─ Ok(resp)  → resp.message or "Print request completed.", input cleared
//!          └─ Err(e)    → e.user_message()
//! ```

use std::sync::Arc;
use std::time::Duration;

use bridge_core::domain::device::PrintContent;
use bridge_core::{Readiness, ReadinessBadge, SessionToken};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::ports::PrinterApi;
use crate::application::readiness::{spawn_readiness_poll, wait_for_first_poll};
use crate::infrastructure::poller::PollingTask;

pub const PRINTER_NOT_READY: &str = "The printer is not ready.";
pub const SENDING_PRINT: &str = "Sending print request…";
pub const PRINT_COMPLETED: &str = "Print request completed.";

/// What the printer view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterSnapshot {
    pub readiness: Readiness,
    pub badge: ReadinessBadge,
    pub input: String,
    pub status: Option<String>,
}

pub struct PrinterPanel {
    api: Arc<dyn PrinterApi>,
    token: SessionToken,
    readiness: watch::Receiver<Readiness>,
    input: String,
    status: Option<String>,
    poll: PollingTask,
}

impl PrinterPanel {
    /// Mounts the panel and starts polling `/printer/status`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(api: Arc<dyn PrinterApi>, token: SessionToken, poll_interval: Duration) -> Self {
        let poll_api = Arc::clone(&api);
        let poll_token = token.clone();
        let (poll, readiness) =
            spawn_readiness_poll("printer-status", poll_interval, move || {
                let api = Arc::clone(&poll_api);
                let token = poll_token.clone();
                async move { api.printer_status(&token).await }
            });

        Self {
            api,
            token,
            readiness,
            input: String::new(),
            status: None,
            poll,
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.readiness.clone()
    }

    /// Waits until the first poll has completed and returns its outcome.
    ///
    /// Returns the current value straight away if a poll already finished.
    pub async fn wait_for_status(&self) -> Readiness {
        wait_for_first_poll(self.readiness.clone()).await
    }

    /// Sends the current input to the printer.
    pub async fn print(&mut self) {
        let content = match PrintContent::parse(&self.input) {
            Ok(content) => content,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        if !self.readiness().is_ready() {
            self.status = Some(PRINTER_NOT_READY.to_string());
            return;
        }

        self.status = Some(SENDING_PRINT.to_string());
        match self.api.print(&self.token, content.as_str()).await {
            Ok(response) => {
                info!(chars = content.as_str().chars().count(), "print request accepted");
                self.status = Some(
                    response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| PRINT_COMPLETED.to_string()),
                );
                self.input.clear();
            }
            Err(e) => {
                warn!(error = %e, "print request failed");
                self.status = Some(e.user_message());
            }
        }
    }

    pub fn is_polling(&self) -> bool {
        !self.poll.is_cancelled()
    }

    pub fn snapshot(&self) -> PrinterSnapshot {
        let readiness = self.readiness();
        PrinterSnapshot {
            readiness,
            badge: readiness.badge(),
            input: self.input.clone(),
            status: self.status.clone(),
        }
    }
}

impl std::fmt::Debug for PrinterPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterPanel")
            .field("readiness", &self.readiness())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

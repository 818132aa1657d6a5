//! Device readiness model and print-content validation.

use std::fmt;

use crate::domain::session::ValidationError;

/// The two devices the bridge app controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Printer,
    Scanner,
}

impl DeviceKind {
    /// Human-readable panel title.
    pub fn title(self) -> &'static str {
        match self {
            DeviceKind::Printer => "Printer",
            DeviceKind::Scanner => "Scanner",
        }
    }

    /// Path of the status endpoint for this device.
    pub fn status_path(self) -> &'static str {
        match self {
            DeviceKind::Printer => "/printer/status",
            DeviceKind::Scanner => "/scanner/status",
        }
    }
}

/// Readiness of a device as last observed by its status poll.
///
/// `Unknown` only exists between mounting a panel and the first completed
/// poll.  After that, every poll produces exactly one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Unknown,
    Ready,
    NotReady,
    /// The status request itself failed (transport or server error).
    ConnectionError,
}

impl Readiness {
    /// Maps the outcome of one status poll to a readiness value.
    ///
    /// A failed poll is a connection error, never "not ready": the device
    /// might be fine, we just could not ask.
    pub fn from_poll<E>(result: &Result<bool, E>) -> Self {
        match result {
            Ok(true) => Readiness::Ready,
            Ok(false) => Readiness::NotReady,
            Err(_) => Readiness::ConnectionError,
        }
    }

    /// `true` only when the last poll reported the device ready.
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }

    /// The badge shown for this readiness.
    pub fn badge(self) -> ReadinessBadge {
        match self {
            Readiness::Ready => ReadinessBadge::Ready,
            Readiness::NotReady => ReadinessBadge::NotReady,
            // No answer yet is displayed the same way as a failed answer.
            Readiness::Unknown | Readiness::ConnectionError => ReadinessBadge::ConnectionError,
        }
    }
}

/// The three badge variants a device panel can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessBadge {
    Ready,
    NotReady,
    ConnectionError,
}

impl ReadinessBadge {
    /// Badge label text.
    pub fn label(self) -> &'static str {
        match self {
            ReadinessBadge::Ready => "ready",
            ReadinessBadge::NotReady => "not ready",
            ReadinessBadge::ConnectionError => "connection error",
        }
    }
}

impl fmt::Display for ReadinessBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Print content that has passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintContent(String);

impl PrintContent {
    /// Validates raw input.  The original text (including inner and
    /// surrounding whitespace) is kept; only blank input is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPrintContent`] for empty or
    /// whitespace-only input.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::EmptyPrintContent);
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

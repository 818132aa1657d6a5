//! Realtime events pushed by the bridge hub.
//!
//! On the wire, the hub invokes a *target* by name with a list of JSON
//! arguments.  The bridge uses three targets, each carrying one payload
//! object.  Rather than handing raw `(name, json)` pairs to subscribers, the
//! client decodes every invocation into the closed [`RealtimeEvent`] enum at
//! the subscription boundary: a subscriber can only ask for an [`EventKind`]
//! that exists, and it receives a payload that has already been type-checked.
//!
//! # Wire examples
//!
//! ```json
//! {"type":1,"target":"SINGLE_SCAN_RESULT","arguments":[{"type":"barcode","content":"4006381333931"}]}
//! {"type":1,"target":"BATCH_SCAN_PROGRESS","arguments":[{"type":"document","currentPage":2,"totalPages":5,"content":"page-2.png"}]}
//! {"type":1,"target":"BATCH_SCAN_COMPLETED","arguments":[{"totalScans":5}]}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn a hub invocation into a [`RealtimeEvent`].
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The invocation target is not one of the known event names.
    #[error("unknown realtime event target: {0}")]
    UnknownTarget(String),

    /// The invocation carried no argument where a payload was expected.
    #[error("realtime event {0} has no payload argument")]
    MissingPayload(EventKind),

    /// The payload did not match the expected shape.
    #[error("realtime event {kind} has a malformed payload: {source}")]
    MalformedPayload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

/// The closed set of event names the bridge hub emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SingleScanResult,
    BatchScanProgress,
    BatchScanCompleted,
}

impl EventKind {
    /// Every kind, in a stable order.
    pub const ALL: [EventKind; 3] = [
        EventKind::SingleScanResult,
        EventKind::BatchScanProgress,
        EventKind::BatchScanCompleted,
    ];

    /// The invocation target name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::SingleScanResult => "SINGLE_SCAN_RESULT",
            EventKind::BatchScanProgress => "BATCH_SCAN_PROGRESS",
            EventKind::BatchScanCompleted => "BATCH_SCAN_COMPLETED",
        }
    }

    /// Looks up a kind by its wire name.  Matching is exact (case-sensitive).
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wire_name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Payload of `SINGLE_SCAN_RESULT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResultPayload {
    #[serde(rename = "type", default)]
    pub scan_type: String,
    pub content: String,
}

/// Payload of `BATCH_SCAN_PROGRESS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScanProgressPayload {
    #[serde(rename = "type", default)]
    pub scan_type: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub content: String,
}

/// Payload of `BATCH_SCAN_COMPLETED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScanCompletedPayload {
    pub total_scans: u32,
}

/// A decoded realtime event, one variant per [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    SingleScanResult(ScanResultPayload),
    BatchScanProgress(BatchScanProgressPayload),
    BatchScanCompleted(BatchScanCompletedPayload),
}

impl RealtimeEvent {
    /// The kind this event is dispatched under.
    pub fn kind(&self) -> EventKind {
        match self {
            RealtimeEvent::SingleScanResult(_) => EventKind::SingleScanResult,
            RealtimeEvent::BatchScanProgress(_) => EventKind::BatchScanProgress,
            RealtimeEvent::BatchScanCompleted(_) => EventKind::BatchScanCompleted,
        }
    }

    /// Decodes a hub invocation into an event.
    ///
    /// Only the first argument is used; extra arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EventDecodeError`] for an unknown target, a missing argument,
    /// or a payload of the wrong shape.
    pub fn decode(
        target: &str,
        arguments: &[serde_json::Value],
    ) -> Result<Self, EventDecodeError> {
        let kind = EventKind::from_wire_name(target)
            .ok_or_else(|| EventDecodeError::UnknownTarget(target.to_string()))?;
        let payload = arguments
            .first()
            .cloned()
            .ok_or(EventDecodeError::MissingPayload(kind))?;
        let malformed = |source| EventDecodeError::MalformedPayload { kind, source };

        Ok(match kind {
            EventKind::SingleScanResult => {
                RealtimeEvent::SingleScanResult(serde_json::from_value(payload).map_err(malformed)?)
            }
            EventKind::BatchScanProgress => {
                RealtimeEvent::BatchScanProgress(serde_json::from_value(payload).map_err(malformed)?)
            }
            EventKind::BatchScanCompleted => RealtimeEvent::BatchScanCompleted(
                serde_json::from_value(payload).map_err(malformed)?,
            ),
        })
    }

    /// Encodes the payload as the single invocation argument.
    ///
    /// Used by test hubs and the benchmark; the client itself only decodes.
    pub fn to_arguments(&self) -> Vec<serde_json::Value> {
        let value = match self {
            RealtimeEvent::SingleScanResult(p) => serde_json::to_value(p),
            RealtimeEvent::BatchScanProgress(p) => serde_json::to_value(p),
            RealtimeEvent::BatchScanCompleted(p) => serde_json::to_value(p),
        };
        // Serializing these plain structs cannot fail.
        vec![value.unwrap_or(serde_json::Value::Null)]
    }

    /// One-line description for the scan log.
    pub fn log_line(&self) -> String {
        match self {
            RealtimeEvent::SingleScanResult(p) => format!("[Single scan] {}", p.content),
            RealtimeEvent::BatchScanProgress(p) => {
                format!("[Batch {}/{}] {}", p.current_page, p.total_pages, p.content)
            }
            RealtimeEvent::BatchScanCompleted(p) => {
                format!("Batch scan completed: {} pages in total.", p.total_scans)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

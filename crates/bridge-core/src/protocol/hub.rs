//! Codec for the SignalR JSON hub protocol used by the bridge's realtime hub.
//!
//! Wire format:
//! ```text
//! {json record}\x1E{json record}\x1E...
//! ```
//! Every record is a JSON object terminated by the ASCII record separator
//! (`0x1E`).  A single WebSocket text frame may carry several records, and a
//! reader must be prepared for a record to be split across frames.
//!
//! # Connection sequence (for beginners)
//!
//! ```text
//! Client                                   Hub
//! ──────                                   ───
//! {"protocol":"json","version":1}\x1E  ──►
//!                                      ◄── {}\x1E                (or {"error":"..."}\x1E)
//!                                      ◄── {"type":1,"target":"SINGLE_SCAN_RESULT","arguments":[...]}\x1E
//! {"type":6}\x1E                       ──►                        (keepalive ping)
//!                                      ◄── {"type":6}\x1E
//!                                      ◄── {"type":7,"error":"...","allowReconnect":true}\x1E
//! ```
//!
//! Only the message types a receiving client needs are modelled explicitly;
//! everything else decodes to [`HubMessage::Other`] and is ignored upstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Record terminator used by the JSON hub protocol.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Protocol name sent in the handshake.
pub const PROTOCOL_NAME: &str = "json";

/// Protocol version sent in the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

const TYPE_INVOCATION: u8 = 1;
const TYPE_PING: u8 = 6;
const TYPE_CLOSE: u8 = 7;

/// Errors that can occur while encoding or decoding hub records.
#[derive(Debug, Error)]
pub enum HubProtocolError {
    /// The record is not valid JSON or not a JSON object of the expected shape.
    #[error("malformed hub record: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// A field required for the given message type is absent.
    #[error("hub message type {message_type} is missing field `{field}`")]
    MissingField {
        message_type: u8,
        field: &'static str,
    },

    /// The hub answered the handshake with an error.
    #[error("hub rejected the handshake: {0}")]
    HandshakeRejected(String),
}

/// A decoded hub message.
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    /// The hub calls a client-side method (`type 1`).
    Invocation {
        invocation_id: Option<String>,
        target: String,
        arguments: Vec<Value>,
    },
    /// Keepalive (`type 6`).  Carries no data.
    Ping,
    /// The hub is closing the connection (`type 7`).
    Close {
        error: Option<String>,
        allow_reconnect: bool,
    },
    /// Any other message type (stream items, completions, …).
    Other(u8),
}

/// Raw shape shared by all record types; fields not used by a given type are
/// simply absent.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "type")]
    message_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    invocation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_reconnect: Option<bool>,
}

#[derive(Serialize)]
struct HandshakeRequest<'a> {
    protocol: &'a str,
    version: u32,
}

#[derive(Deserialize)]
struct HandshakeResponse {
    #[serde(default)]
    error: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Returns the handshake record the client sends first, separator included.
pub fn handshake_request() -> String {
    let body = serde_json::to_string(&HandshakeRequest {
        protocol: PROTOCOL_NAME,
        version: PROTOCOL_VERSION,
    })
    .unwrap_or_else(|_| format!(r#"{{"protocol":"{PROTOCOL_NAME}","version":{PROTOCOL_VERSION}}}"#));
    let mut record = body;
    record.push(RECORD_SEPARATOR);
    record
}

/// Checks the hub's handshake response record (without separator).
///
/// # Errors
///
/// Returns [`HubProtocolError::HandshakeRejected`] when the hub reported an
/// error, or [`HubProtocolError::MalformedJson`] when the record is not JSON.
pub fn parse_handshake_response(record: &str) -> Result<(), HubProtocolError> {
    let resp: HandshakeResponse = serde_json::from_str(record)?;
    match resp.error {
        Some(e) => Err(HubProtocolError::HandshakeRejected(e)),
        None => Ok(()),
    }
}

/// Encodes a [`HubMessage`] as one record, separator included.
///
/// # Errors
///
/// Returns [`HubProtocolError::MalformedJson`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use bridge_core::protocol::{encode_message, decode_message, HubMessage};
///
/// let record = encode_message(&HubMessage::Ping).unwrap();
/// assert_eq!(record, "{\"type\":6}\u{1e}");
/// assert_eq!(decode_message(record.trim_end_matches('\u{1e}')).unwrap(), HubMessage::Ping);
/// ```
pub fn encode_message(msg: &HubMessage) -> Result<String, HubProtocolError> {
    let raw = match msg {
        HubMessage::Invocation {
            invocation_id,
            target,
            arguments,
        } => RawRecord {
            message_type: TYPE_INVOCATION,
            invocation_id: invocation_id.clone(),
            target: Some(target.clone()),
            arguments: Some(arguments.clone()),
            ..RawRecord::default()
        },
        HubMessage::Ping => RawRecord {
            message_type: TYPE_PING,
            ..RawRecord::default()
        },
        HubMessage::Close {
            error,
            allow_reconnect,
        } => RawRecord {
            message_type: TYPE_CLOSE,
            error: error.clone(),
            allow_reconnect: Some(*allow_reconnect),
            ..RawRecord::default()
        },
        HubMessage::Other(t) => RawRecord {
            message_type: *t,
            ..RawRecord::default()
        },
    };
    let mut record = serde_json::to_string(&raw)?;
    record.push(RECORD_SEPARATOR);
    Ok(record)
}

/// Decodes one record (without its separator).
///
/// # Errors
///
/// Returns [`HubProtocolError`] if the record is not JSON or an invocation
/// lacks its target.
pub fn decode_message(record: &str) -> Result<HubMessage, HubProtocolError> {
    let raw: RawRecord = serde_json::from_str(record)?;
    Ok(match raw.message_type {
        TYPE_INVOCATION => HubMessage::Invocation {
            invocation_id: raw.invocation_id,
            target: raw.target.ok_or(HubProtocolError::MissingField {
                message_type: TYPE_INVOCATION,
                field: "target",
            })?,
            arguments: raw.arguments.unwrap_or_default(),
        },
        TYPE_PING => HubMessage::Ping,
        TYPE_CLOSE => HubMessage::Close {
            error: raw.error,
            allow_reconnect: raw.allow_reconnect.unwrap_or(false),
        },
        other => HubMessage::Other(other),
    })
}

// ── Streaming reader ──────────────────────────────────────────────────────────

/// Accumulates WebSocket text frames and yields complete records.
///
/// # Why a buffer is needed
///
/// The protocol makes no promise that one frame holds exactly one record:
/// it may hold several, or the tail of one and the head of the next.  The
/// reader appends every frame to `buf` and hands out records up to each
/// separator, keeping any incomplete tail for the next frame.
#[derive(Debug, Default)]
pub struct HubFrameReader {
    buf: String,
}

impl HubFrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a received text frame.
    pub fn feed(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
    }

    /// Pops the next complete record (without separator), if any.
    ///
    /// Empty records (two separators in a row) are skipped.
    pub fn next_record(&mut self) -> Option<String> {
        loop {
            let end = self.buf.find(RECORD_SEPARATOR)?;
            let record: String = self.buf.drain(..end).collect();
            // Drop the separator itself (one UTF-8 byte).
            self.buf.drain(..RECORD_SEPARATOR.len_utf8());
            if !record.trim().is_empty() {
                return Some(record);
            }
            tracing::trace!("skipping empty hub record");
        }
    }

    /// Pops and decodes the next complete record, if any.
    pub fn next_message(&mut self) -> Option<Result<HubMessage, HubProtocolError>> {
        self.next_record().map(|r| decode_message(&r))
    }

    /// Number of buffered bytes not yet forming a complete record.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

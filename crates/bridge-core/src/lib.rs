//! # bridge-core
//!
//! Shared library for the bridge console containing the domain types and the
//! realtime hub-protocol codec.
//!
//! This crate is used by both the client library and the console binary.
//! It has zero dependencies on sockets, HTTP clients, timers, or the terminal.
//!
//! # Architecture overview (for beginners)
//!
//! The bridge console talks to a small *bridge app* running on the same PC.
//! The bridge app drives a printer and a scanner and exposes them through an
//! HTTP API plus a push-notification hub.  Before anything else, the console
//! has to *pair* with the bridge: the bridge shows a 6-character code on its
//! screen, the user types it into the console, and the bridge answers with a
//! session token that authorises every later request.
//!
//! This crate (`bridge-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The vocabulary of the application: session tokens,
//!   pairing codes, device readiness, realtime scan events, the scan log,
//!   the route table, and the JSON bodies exchanged with the HTTP API.
//!
//! - **`protocol`** – How realtime messages travel over the WebSocket.  The
//!   hub uses the SignalR JSON hub protocol: JSON records terminated by the
//!   ASCII record separator `0x1E`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `bridge_core::SessionToken` instead of `bridge_core::domain::session::SessionToken`.
pub use domain::connection::ConnectionState;
pub use domain::device::{DeviceKind, Readiness, ReadinessBadge};
pub use domain::events::{EventKind, RealtimeEvent};
pub use domain::route::{AuthPhase, Navigation, Route};
pub use domain::scan_log::ScanLog;
pub use domain::session::{PairingCode, SessionToken, ValidationError};
pub use protocol::hub::{HubMessage, HubProtocolError};

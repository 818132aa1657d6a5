//! Realtime connection state.

use std::fmt;

/// State of the realtime hub connection.
///
/// ```text
/// Disconnected ──start──► Connecting ──ok──► Connected
///       ▲                     │                  │
///       │                 fail│              drop│
///       │                     ▼                  ▼
///       └──policy gives up── Reconnecting ◄──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    /// `true` while a supervisor task owns the connection (any state other
    /// than `Disconnected`).  Used to make `start_connection` idempotent.
    pub fn is_active(self) -> bool {
        self != ConnectionState::Disconnected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(s)
    }
}

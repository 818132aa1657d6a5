//! Traits the application layer depends on.
//!
//! Use cases receive these as `Arc<dyn Trait>` so that tests can substitute
//! fakes.  The production implementations live in the infrastructure layer:
//! [`ApiClient`](crate::infrastructure::api_client::ApiClient) for the HTTP
//! ports and [`RealtimeClient`](crate::infrastructure::realtime::RealtimeClient)
//! for [`RealtimeHub`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::domain::messages::{CommandResponse, ValidateCodeResponse};
use bridge_core::{ConnectionState, EventKind, PairingCode, RealtimeEvent, SessionToken};
use uuid::Uuid;

use crate::infrastructure::api_client::ApiError;

// ── HTTP ports ────────────────────────────────────────────────────────────────

/// Pairing endpoints.  Neither call is authenticated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairingApi: Send + Sync {
    /// Asks the bridge to show a fresh pairing code on its screen.
    async fn request_pairing_code(&self) -> Result<(), ApiError>;

    /// Exchanges a pairing code for a session token.
    async fn validate_pairing_code(
        &self,
        code: &PairingCode,
    ) -> Result<ValidateCodeResponse, ApiError>;
}

#[async_trait]
pub trait PrinterApi: Send + Sync {
    /// Returns the printer's `is_ready` flag.
    async fn printer_status(&self, token: &SessionToken) -> Result<bool, ApiError>;

    async fn print(&self, token: &SessionToken, content: &str)
        -> Result<CommandResponse, ApiError>;
}

#[async_trait]
pub trait ScannerApi: Send + Sync {
    /// Returns the scanner's `is_ready` flag.
    async fn scanner_status(&self, token: &SessionToken) -> Result<bool, ApiError>;

    async fn scan(&self, token: &SessionToken) -> Result<CommandResponse, ApiError>;
}

// ── Realtime port ─────────────────────────────────────────────────────────────

/// Callback invoked for every event of the kind it was registered for.
///
/// Handlers run on the realtime client's task and must not block.
pub type EventHandler = Arc<dyn Fn(&RealtimeEvent) + Send + Sync>;

/// Identifies one registered handler, so that it alone can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandlerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The push-notification connection, as seen by views.
pub trait RealtimeHub: Send + Sync {
    /// Starts connecting if currently disconnected.  Idempotent.
    fn start_connection(&self);

    fn connection_state(&self) -> ConnectionState;

    /// Registers `handler` for `kind`.  It sees only events dispatched after
    /// this call returns.
    fn on(&self, kind: EventKind, handler: EventHandler) -> HandlerId;

    /// Removes one handler.  Returns `false` if it was not registered.  A
    /// handler removed while an event is being dispatched is not called for
    /// that event.
    fn off(&self, kind: EventKind, id: HandlerId) -> bool;
}

/// A registered handler that is removed again when the guard is dropped.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    hub: Arc<dyn RealtimeHub>,
    kind: EventKind,
    id: HandlerId,
}

impl Subscription {
    /// Registers `handler` on `hub` and returns the guard owning it.
    pub fn register(hub: Arc<dyn RealtimeHub>, kind: EventKind, handler: EventHandler) -> Self {
        let id = hub.on(kind, handler);
        Self { hub, kind, id }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.off(self.kind, self.id);
    }
}

//! Realtime hub client.
//!
//! Keeps one WebSocket connection to the bridge's push-notification hub and
//! fans decoded [`RealtimeEvent`]s out to registered handlers.
//!
//! Architecture:
//! - [`RealtimeClient`] is a cheap-to-clone handle around shared state.
//! - `start_connection` spawns a *supervisor* task that opens the connection
//!   (see [`transport`]), runs the read loop, and retries according to the
//!   configured [`ReconnectPolicy`] when the connection fails or drops.
//! - The read loop sends a keepalive ping every `keepalive_interval` and
//!   drops the connection when nothing has arrived for `server_timeout`.
//! - Invocations are decoded at this boundary.  Unknown targets and malformed
//!   payloads are logged and skipped; handlers only ever see valid events.
//!
//! # Connection states (for beginners)
//!
//! ```text
//!                start_connection()
//! Disconnected ─────────────────────► Connecting ──handshake ok──► Connected
//!      ▲                                  │                           │
//!      │ stop() / policy gives up         │ failure                   │ drop / timeout /
//!      │                                  ▼                           │ close(allowReconnect)
//!      └─────────────────────────── Reconnecting ◄────────────────────┘
//! ```
//!
//! A hub close message with `allowReconnect: false` goes straight to
//! `Disconnected`.

pub mod registry;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use bridge_core::protocol::{encode_message, HubFrameReader, HubMessage};
use bridge_core::{ConnectionState, EventKind, HubProtocolError, RealtimeEvent};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::ports::{EventHandler, HandlerId, RealtimeHub, Subscription};
use crate::infrastructure::api_client::DEFAULT_BASE_URL;
use crate::infrastructure::reconnect::{ExponentialBackoff, ReconnectPolicy};

use registry::HandlerRegistry;
use transport::HubSocket;

pub const DEFAULT_HUB_PATH: &str = "/bridgeHub";
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that end one connection attempt.
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("invalid hub URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not build HTTP client: {0}")]
    HttpClient(String),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("negotiate request failed: {0}")]
    Negotiate(String),

    #[error("hub rejected negotiation: {0}")]
    NegotiateRejected(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error(transparent)]
    Protocol(#[from] HubProtocolError),

    #[error("hub did not answer the handshake within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("hub closed the connection during the handshake")]
    ClosedDuringHandshake,
}

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub base_url: String,
    pub hub_path: String,
    /// Open the WebSocket directly instead of calling `/negotiate` first.
    pub skip_negotiation: bool,
    pub keepalive_interval: Duration,
    pub server_timeout: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hub_path: DEFAULT_HUB_PATH.to_string(),
            skip_negotiation: false,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            server_timeout: DEFAULT_SERVER_TIMEOUT,
        }
    }
}

/// How an established connection ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// `stop()` was called.
    Stopped,
    /// The hub sent a close message.
    Closed {
        error: Option<String>,
        allow_reconnect: bool,
    },
    /// The socket dropped or went silent.
    Lost,
}

struct Supervisor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner {
    config: RealtimeConfig,
    http: reqwest::Client,
    policy: Arc<dyn ReconnectPolicy>,
    state: RwLock<ConnectionState>,
    handlers: HandlerRegistry,
    supervisor: Mutex<Option<Supervisor>>,
}

/// Handle to the realtime hub connection.  Clones share one connection.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("config", &self.inner.config)
            .field("policy", &self.inner.policy)
            .field("state", &*self.inner.state.read())
            .field("handlers", &self.inner.handlers)
            .finish()
    }
}

impl RealtimeClient {
    /// Creates a disconnected client.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::ZeroInterval`] if the keepalive interval or
    /// the server timeout is zero, and [`RealtimeError::HttpClient`] if the
    /// HTTP client used for the negotiate step cannot be built.
    pub fn new(
        config: RealtimeConfig,
        policy: Arc<dyn ReconnectPolicy>,
    ) -> Result<Self, RealtimeError> {
        if config.keepalive_interval.is_zero() {
            return Err(RealtimeError::ZeroInterval("keepalive interval"));
        }
        if config.server_timeout.is_zero() {
            return Err(RealtimeError::ZeroInterval("server timeout"));
        }
        let http = reqwest::Client::builder()
            .timeout(config.server_timeout)
            .build()
            .map_err(|e| RealtimeError::HttpClient(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                http,
                policy,
                state: RwLock::new(ConnectionState::Disconnected),
                handlers: HandlerRegistry::new(),
                supervisor: Mutex::new(None),
            }),
        })
    }

    /// Creates a client with the default exponential backoff.
    pub fn with_default_policy(config: RealtimeConfig) -> Result<Self, RealtimeError> {
        Self::new(config, Arc::new(ExponentialBackoff::default()))
    }

    /// Starts the supervisor unless one is already running.
    ///
    /// A no-op in any state other than `Disconnected`.  Must be called from
    /// within a Tokio runtime.
    pub fn start_connection(&self) {
        let mut supervisor = self.inner.supervisor.lock();
        if *self.inner.state.read() != ConnectionState::Disconnected {
            debug!("realtime connection already active");
            return;
        }
        *self.inner.state.write() = ConnectionState::Connecting;

        let cancel = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { inner.supervise(token).await });
        *supervisor = Some(Supervisor { cancel, handle });
    }

    /// Stops the connection and waits for the supervisor to exit.
    ///
    /// Sends a WebSocket close frame if connected.  Afterwards the state is
    /// `Disconnected` and `start_connection` may be called again.
    pub async fn stop(&self) {
        let supervisor = self.inner.supervisor.lock().take();
        if let Some(Supervisor { cancel, handle }) = supervisor {
            cancel.cancel();
            if let Err(e) = handle.await {
                error!("realtime supervisor task failed: {e}");
                *self.inner.state.write() = ConnectionState::Disconnected;
            }
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    pub fn on(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        self.inner.handlers.add(kind, handler)
    }

    pub fn off(&self, kind: EventKind, id: HandlerId) -> bool {
        self.inner.handlers.remove(kind, id)
    }

    /// Registers `handler` and returns a guard that removes it on drop.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        Subscription::register(Arc::new(self.clone()), kind, handler)
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.handlers.handler_count(kind)
    }
}

impl RealtimeHub for RealtimeClient {
    fn start_connection(&self) {
        RealtimeClient::start_connection(self);
    }

    fn connection_state(&self) -> ConnectionState {
        RealtimeClient::connection_state(self)
    }

    fn on(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        RealtimeClient::on(self, kind, handler)
    }

    fn off(&self, kind: EventKind, id: HandlerId) -> bool {
        RealtimeClient::off(self, kind, id)
    }
}

// ── Supervisor ────────────────────────────────────────────────────────────────

impl Inner {
    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    async fn supervise(self: Arc<Self>, cancel: CancellationToken) {
        let mut attempt = 0u32;

        loop {
            let outcome = self.run_connection(&cancel).await;

            match outcome {
                Ok(SessionEnd::Stopped) => break,
                Ok(SessionEnd::Closed {
                    error,
                    allow_reconnect: false,
                }) => {
                    warn!(?error, "hub closed the connection and disallowed reconnect");
                    break;
                }
                Ok(end) => {
                    info!(?end, "realtime connection ended");
                    // The connection was established, so retries start over.
                    attempt = 0;
                }
                Err(e) => warn!(attempt, error = %e, "realtime connection attempt failed"),
            }

            if cancel.is_cancelled() {
                break;
            }

            attempt = attempt.saturating_add(1);
            let Some(delay) = self.policy.next_delay(attempt) else {
                error!(attempt, "giving up on the realtime connection");
                break;
            };

            self.set_state(ConnectionState::Reconnecting);
            warn!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting to realtime hub");

            tokio::select! {
                () = time::sleep(delay) => {}
                () = cancel.cancelled() => break,
            }
        }

        // Cleared under the supervisor lock so a concurrent start_connection
        // sees either the old supervisor or a clean Disconnected state.
        let mut supervisor = self.supervisor.lock();
        self.set_state(ConnectionState::Disconnected);
        *supervisor = None;
        info!("realtime connection stopped");
    }

    /// Opens one connection and runs its read loop until it ends.
    ///
    /// Errors are returned only for failures before the connection was
    /// established; a drop afterwards is reported as [`SessionEnd::Lost`].
    async fn run_connection(&self, cancel: &CancellationToken) -> Result<SessionEnd, RealtimeError> {
        let opened = tokio::select! {
            r = transport::open(&self.http, &self.config) => r,
            () = cancel.cancelled() => return Ok(SessionEnd::Stopped),
        };
        let (socket, reader) = opened?;

        self.set_state(ConnectionState::Connected);
        Ok(self.read_loop(socket, reader, cancel).await)
    }

    async fn read_loop(
        &self,
        socket: HubSocket,
        mut reader: HubFrameReader,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        let (mut write, mut read) = socket.split();
        let keepalive_every = self.config.keepalive_interval;
        let mut keepalive = time::interval_at(Instant::now() + keepalive_every, keepalive_every);
        let mut last_received = Instant::now();

        loop {
            // Records may already be buffered (e.g. sent right after the handshake).
            while let Some(record) = reader.next_message() {
                if let Some(end) = self.handle_message(record) {
                    if matches!(end, SessionEnd::Closed { .. }) {
                        let _ = write.send(Message::Close(None)).await;
                    }
                    return end;
                }
            }

            let deadline = last_received + self.config.server_timeout;

            tokio::select! {
                () = cancel.cancelled() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!("failed to send close frame: {e}");
                    }
                    return SessionEnd::Stopped;
                }

                _ = keepalive.tick() => {
                    match encode_message(&HubMessage::Ping) {
                        Ok(ping) => {
                            if let Err(e) = write.send(Message::Text(ping)).await {
                                warn!("failed to send keepalive: {e}");
                                return SessionEnd::Lost;
                            }
                        }
                        Err(e) => error!("failed to encode keepalive: {e}"),
                    }
                }

                () = time::sleep_until(deadline) => {
                    warn!(timeout = ?self.config.server_timeout, "no message from hub; dropping connection");
                    return SessionEnd::Lost;
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        last_received = Instant::now();
                        reader.feed(&text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        last_received = Instant::now();
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "hub closed the WebSocket");
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => last_received = Instant::now(),
                    Some(Err(e)) => {
                        warn!("realtime read error: {e}");
                        return SessionEnd::Lost;
                    }
                    None => {
                        debug!("realtime stream ended");
                        return SessionEnd::Lost;
                    }
                },
            }
        }
    }

    /// Applies one decoded record.  Returns `Some` when it ends the session.
    fn handle_message(&self, message: Result<HubMessage, HubProtocolError>) -> Option<SessionEnd> {
        match message {
            Ok(HubMessage::Invocation {
                target, arguments, ..
            }) => {
                match RealtimeEvent::decode(&target, &arguments) {
                    Ok(event) => {
                        let called = self.handlers.dispatch(&event);
                        debug!(kind = %event.kind(), handlers = called, "realtime event dispatched");
                    }
                    Err(e) => warn!("skipping realtime invocation: {e}"),
                }
                None
            }
            Ok(HubMessage::Ping) => {
                debug!("hub ping");
                None
            }
            Ok(HubMessage::Close {
                error,
                allow_reconnect,
            }) => Some(SessionEnd::Closed {
                error,
                allow_reconnect,
            }),
            Ok(HubMessage::Other(kind)) => {
                debug!(message_type = kind, "ignoring hub message");
                None
            }
            Err(e) => {
                warn!("skipping malformed hub record: {e}");
                None
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::reconnect::FixedDelay;

    fn unreachable_config() -> RealtimeConfig {
        RealtimeConfig {
            // Port 1 refuses connections immediately.
            base_url: "http://127.0.0.1:1".to_string(),
            skip_negotiation: true,
            ..RealtimeConfig::default()
        }
    }

    #[test]
    fn test_default_config_matches_bridge_defaults() {
        let cfg = RealtimeConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:1789");
        assert_eq!(cfg.hub_path, "/bridgeHub");
        assert_eq!(cfg.keepalive_interval, Duration::from_secs(15));
        assert_eq!(cfg.server_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_new_client_is_disconnected() {
        let client = RealtimeClient::with_default_policy(RealtimeConfig::default()).unwrap();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_zero_keepalive_is_rejected() {
        // Arrange
        let config = RealtimeConfig {
            keepalive_interval: Duration::ZERO,
            ..RealtimeConfig::default()
        };

        // Act
        let result = RealtimeClient::with_default_policy(config);

        // Assert
        assert!(matches!(
            result,
            Err(RealtimeError::ZeroInterval("keepalive interval"))
        ));
    }

    #[test]
    fn test_zero_server_timeout_is_rejected() {
        let config = RealtimeConfig {
            server_timeout: Duration::ZERO,
            ..RealtimeConfig::default()
        };
        assert!(matches!(
            RealtimeClient::with_default_policy(config),
            Err(RealtimeError::ZeroInterval("server timeout"))
        ));
    }

    #[tokio::test]
    async fn test_start_connection_is_idempotent_while_active() {
        // Arrange: retries forever with a long delay, so the client stays active
        let client = RealtimeClient::new(
            unreachable_config(),
            Arc::new(FixedDelay {
                delay: Duration::from_secs(60),
                max_attempts: None,
            }),
        )
        .unwrap();

        // Act
        client.start_connection();
        client.start_connection();

        // Assert
        assert!(client.connection_state().is_active());
        client.stop().await;
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_policy_giving_up_returns_to_disconnected() {
        // Arrange: no retries at all
        let client = RealtimeClient::new(
            unreachable_config(),
            Arc::new(FixedDelay {
                delay: Duration::from_millis(10),
                max_attempts: Some(0),
            }),
        )
        .unwrap();

        // Act
        client.start_connection();
        for _ in 0..100 {
            if client.connection_state() == ConnectionState::Disconnected {
                break;
            }
            time::sleep(Duration::from_millis(20)).await;
        }

        // Assert
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_handle_message_skips_unknown_targets_and_garbage() {
        let client = RealtimeClient::with_default_policy(RealtimeConfig::default()).unwrap();
        let unknown = Ok(HubMessage::Invocation {
            invocation_id: None,
            target: "PRINT_FINISHED".to_string(),
            arguments: vec![],
        });
        let garbage = bridge_core::protocol::decode_message("{");

        assert_eq!(client.inner.handle_message(unknown), None);
        assert_eq!(client.inner.handle_message(garbage), None);
        assert_eq!(
            client.inner.handle_message(Ok(HubMessage::Close {
                error: None,
                allow_reconnect: true
            })),
            Some(SessionEnd::Closed {
                error: None,
                allow_reconnect: true
            })
        );
    }

    #[test]
    fn test_subscription_drop_unregisters_handler() {
        let client = RealtimeClient::with_default_policy(RealtimeConfig::default()).unwrap();
        let sub = client.subscribe(EventKind::SingleScanResult, Arc::new(|_e: &RealtimeEvent| {}));
        assert_eq!(client.handler_count(EventKind::SingleScanResult), 1);

        drop(sub);

        assert_eq!(client.handler_count(EventKind::SingleScanResult), 0);
    }
}

//! AuthService: the pairing use case.
//!
//! Drives the pairing exchange with the bridge and owns the session writer.
//! Every failure is turned into a display string stored in
//! [`error_message`](AuthService::error_message); nothing is returned to the
//! caller as an error, so the pairing view can simply render the snapshot.
//!
//! # State
//!
//! ```text
//!                 submit_pairing_code (ok + token)
//!   NeedsPairing ─────────────────────────────────► Authenticated
//!        ▲                                               │
//!        └──────────────────── logout ───────────────────┘
//! ```

use std::sync::Arc;

use bridge_core::{AuthPhase, PairingCode, SessionToken};
use tracing::{info, warn};

use crate::application::ports::PairingApi;
use crate::application::session::{SessionStore, SessionWriter};

pub const REQUEST_CODE_FAILED: &str =
    "Failed to request a pairing code. Check that the bridge app is running.";
pub const SESSION_SAVE_FAILED: &str = "Could not save the session on this computer.";
pub const SESSION_REMOVE_FAILED: &str = "Could not remove the saved session from this computer.";

/// Read-only view of the auth state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session_token: Option<SessionToken>,
    pub needs_pairing: bool,
    pub error_message: Option<String>,
}

pub struct AuthService {
    api: Arc<dyn PairingApi>,
    store: SessionStore,
    writer: SessionWriter,
    needs_pairing: bool,
    error: Option<String>,
}

impl AuthService {
    /// Creates the service from an opened session store.
    ///
    /// `needs_pairing` starts out as "no credential was restored".
    pub fn new(api: Arc<dyn PairingApi>, store: SessionStore, writer: SessionWriter) -> Self {
        let needs_pairing = !store.is_authenticated();
        Self {
            api,
            store,
            writer,
            needs_pairing,
            error: None,
        }
    }

    /// Asks the bridge to display a pairing code.
    pub async fn start_pairing(&mut self) {
        match self.api.request_pairing_code().await {
            Ok(()) => {
                info!("pairing code requested; check the bridge screen");
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "pairing code request failed");
                self.error = Some(REQUEST_CODE_FAILED.to_string());
            }
        }
    }

    /// Validates `input` locally, exchanges it for a session token, and
    /// persists the token.
    ///
    /// Returns `true` when the console is now authenticated.
    pub async fn submit_pairing_code(&mut self, input: &str) -> bool {
        let code = match PairingCode::parse(input) {
            Ok(code) => code,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };

        let response = match self.api.validate_pairing_code(&code).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "pairing code rejected");
                self.error = Some(e.user_message());
                return false;
            }
        };

        let token = match response.session_token.map(SessionToken::new) {
            Some(Ok(token)) => token,
            Some(Err(e)) => {
                self.error = Some(e.to_string());
                return false;
            }
            None => {
                warn!("bridge accepted the code but issued no session token");
                self.error = Some(bridge_core::ValidationError::EmptySessionToken.to_string());
                return false;
            }
        };

        if let Err(e) = self.writer.set(token) {
            warn!(error = %e, "could not persist session");
            self.error = Some(SESSION_SAVE_FAILED.to_string());
            return false;
        }

        info!("paired with bridge");
        self.needs_pairing = false;
        self.error = None;
        true
    }

    /// Forgets the credential.  Always leaves the service needing pairing.
    pub fn logout(&mut self) {
        self.error = match self.writer.clear() {
            Ok(()) => None,
            Err(_) => Some(SESSION_REMOVE_FAILED.to_string()),
        };
        self.needs_pairing = true;
        info!("logged out");
    }

    pub fn has_credential(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn needs_pairing(&self) -> bool {
        self.needs_pairing
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session_token(&self) -> Option<SessionToken> {
        self.store.get()
    }

    /// Routing phase derived from credential presence.
    pub fn phase(&self) -> AuthPhase {
        AuthPhase::from_credential_present(self.has_credential())
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            session_token: self.session_token(),
            needs_pairing: self.needs_pairing,
            error_message: self.error.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockPairingApi;
    use crate::application::session::{CredentialStorage, MemoryCredentialStorage};
    use crate::infrastructure::api_client::{ApiError, BRIDGE_UNREACHABLE};
    use bridge_core::domain::messages::ValidateCodeResponse;
    use mockall::predicate::always;

    fn service_with(
        api: MockPairingApi,
        storage: Arc<MemoryCredentialStorage>,
    ) -> AuthService {
        let (store, writer) = SessionStore::open(storage).unwrap();
        AuthService::new(Arc::new(api), store, writer)
    }

    fn token_response(token: Option<&str>) -> ValidateCodeResponse {
        ValidateCodeResponse {
            session_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_new_without_credential_needs_pairing() {
        let auth = service_with(MockPairingApi::new(), Arc::new(MemoryCredentialStorage::new()));
        assert!(auth.needs_pairing());
        assert!(!auth.has_credential());
        assert_eq!(auth.phase(), AuthPhase::NeedsPairing);
    }

    #[test]
    fn test_new_with_restored_credential_is_authenticated() {
        let storage = Arc::new(MemoryCredentialStorage::with_token(
            SessionToken::new("abc").unwrap(),
        ));
        let auth = service_with(MockPairingApi::new(), storage);
        assert!(!auth.needs_pairing());
        assert_eq!(auth.phase(), AuthPhase::Authenticated);
    }

    #[tokio::test]
    async fn test_start_pairing_success_clears_error() {
        // Arrange
        let mut api = MockPairingApi::new();
        api.expect_request_pairing_code().times(1).returning(|| Ok(()));
        let mut auth = service_with(api, Arc::new(MemoryCredentialStorage::new()));
        auth.error = Some("old".to_string());

        // Act
        auth.start_pairing().await;

        // Assert
        assert_eq!(auth.error_message(), None);
    }

    #[tokio::test]
    async fn test_start_pairing_failure_sets_fixed_message() {
        let mut api = MockPairingApi::new();
        api.expect_request_pairing_code().returning(|| {
            Err(ApiError::Transport {
                url: "http://localhost:1789/pairing/request-code".to_string(),
                reason: "connection refused".to_string(),
            })
        });
        let mut auth = service_with(api, Arc::new(MemoryCredentialStorage::new()));

        auth.start_pairing().await;

        assert_eq!(auth.error_message(), Some(REQUEST_CODE_FAILED));
    }

    #[tokio::test]
    async fn test_submit_success_persists_token_and_clears_state() {
        // Arrange
        let mut api = MockPairingApi::new();
        api.expect_validate_pairing_code()
            .withf(|code| code.as_str() == "123456")
            .times(1)
            .returning(|_| Ok(token_response(Some("abc"))));
        let storage = Arc::new(MemoryCredentialStorage::new());
        let mut auth = service_with(api, storage.clone());
        auth.error = Some("stale".to_string());

        // Act
        let ok = auth.submit_pairing_code("123456").await;

        // Assert
        assert!(ok);
        assert!(!auth.needs_pairing());
        assert_eq!(auth.error_message(), None);
        assert_eq!(auth.session_token().unwrap().expose(), "abc");
        assert_eq!(storage.load().unwrap().unwrap().expose(), "abc");
    }

    #[tokio::test]
    async fn test_submit_rejected_code_shows_backend_detail() {
        // Arrange
        let mut api = MockPairingApi::new();
        api.expect_validate_pairing_code().returning(|_| {
            Err(ApiError::Server {
                status: 400,
                detail: "invalid code".to_string(),
            })
        });
        let storage = Arc::new(MemoryCredentialStorage::new());
        let mut auth = service_with(api, storage.clone());

        // Act
        let ok = auth.submit_pairing_code("000000").await;

        // Assert
        assert!(!ok);
        assert_eq!(auth.error_message(), Some("invalid code"));
        assert!(auth.needs_pairing());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_submit_transport_failure_shows_generic_message() {
        let mut api = MockPairingApi::new();
        api.expect_validate_pairing_code().returning(|_| {
            Err(ApiError::Transport {
                url: String::new(),
                reason: "timed out".to_string(),
            })
        });
        let mut auth = service_with(api, Arc::new(MemoryCredentialStorage::new()));

        auth.submit_pairing_code("123456").await;

        assert_eq!(auth.error_message(), Some(BRIDGE_UNREACHABLE));
    }

    #[tokio::test]
    async fn test_submit_short_code_makes_no_network_call() {
        // Arrange: a mock with no expectations panics if called
        let mut auth = service_with(MockPairingApi::new(), Arc::new(MemoryCredentialStorage::new()));

        // Act
        let ok = auth.submit_pairing_code("123").await;

        // Assert
        assert!(!ok);
        assert_eq!(
            auth.error_message(),
            Some("Enter the 6-character code shown on the bridge.")
        );
    }

    #[tokio::test]
    async fn test_submit_success_without_token_is_failure() {
        let mut api = MockPairingApi::new();
        api.expect_validate_pairing_code()
            .with(always())
            .returning(|_| Ok(token_response(None)));
        let storage = Arc::new(MemoryCredentialStorage::new());
        let mut auth = service_with(api, storage.clone());

        let ok = auth.submit_pairing_code("123456").await;

        assert!(!ok);
        assert!(auth.needs_pairing());
        assert_eq!(
            auth.error_message(),
            Some("The bridge did not issue a session token.")
        );
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_logout_always_clears_and_requires_pairing() {
        // Arrange: both with and without a credential
        for initial in [None, Some(SessionToken::new("abc").unwrap())] {
            let storage = Arc::new(match initial {
                Some(t) => MemoryCredentialStorage::with_token(t),
                None => MemoryCredentialStorage::new(),
            });
            let mut auth = service_with(MockPairingApi::new(), storage.clone());

            // Act
            auth.logout();

            // Assert
            assert!(auth.needs_pairing());
            assert!(!auth.has_credential());
            assert_eq!(storage.load().unwrap(), None);
        }
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let storage = Arc::new(MemoryCredentialStorage::with_token(
            SessionToken::new("abc").unwrap(),
        ));
        let auth = service_with(MockPairingApi::new(), storage);

        let snap = auth.snapshot();

        assert_eq!(snap.session_token.unwrap().expose(), "abc");
        assert!(!snap.needs_pairing);
        assert_eq!(snap.error_message, None);
    }
}

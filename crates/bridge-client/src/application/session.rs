//! Session credential store.
//!
//! The credential has exactly one writer.  [`SessionStore::open`] hands out a
//! cloneable read handle ([`SessionStore`]) and a single, non-cloneable
//! [`SessionWriter`].  Whoever owns the writer (the `AuthService`) is the only
//! code that can pair or log out; everything else can read the current
//! credential or subscribe to changes.
//!
//! Writes go to storage first and are published to readers only once they
//! are durable, so a reader never sees a credential that would be lost on
//! restart.

use std::sync::Arc;

use bridge_core::SessionToken;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The persistent storage could not be read or written.
    #[error("could not access the saved session: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where the credential survives restarts.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, SessionError>;
    fn save(&self, token: &SessionToken) -> Result<(), SessionError>;
    /// Removes the credential.  Succeeds when there was none.
    fn clear(&self) -> Result<(), SessionError>;
}

/// In-memory storage for tests and `--no-persist` style runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock() = None;
        Ok(())
    }
}

/// Read handle to the current credential.
#[derive(Debug, Clone)]
pub struct SessionStore {
    rx: watch::Receiver<Option<SessionToken>>,
}

/// The only handle that can change the credential.
pub struct SessionWriter {
    tx: watch::Sender<Option<SessionToken>>,
    storage: Arc<dyn CredentialStorage>,
}

impl std::fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter")
            .field("current", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Loads the persisted credential and returns the read and write handles.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the storage cannot be read.
    pub fn open(
        storage: Arc<dyn CredentialStorage>,
    ) -> Result<(SessionStore, SessionWriter), SessionError> {
        let initial = storage.load()?;
        match &initial {
            Some(token) => info!(token = %token.fingerprint(), "restored saved session"),
            None => info!("no saved session; pairing required"),
        }
        let (tx, rx) = watch::channel(initial);
        Ok((SessionStore { rx }, SessionWriter { tx, storage }))
    }

    pub fn get(&self) -> Option<SessionToken> {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// A receiver that observes every later change.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.rx.clone()
    }
}

impl SessionWriter {
    /// Persists `token`, then publishes it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if saving fails.  The published
    /// credential is unchanged in that case.
    pub fn set(&self, token: SessionToken) -> Result<(), SessionError> {
        self.storage.save(&token)?;
        info!(token = %token.fingerprint(), "session saved");
        self.tx.send_replace(Some(token));
        Ok(())
    }

    /// Removes the persisted credential and publishes `None`.
    ///
    /// The in-memory credential is dropped even if removing it from storage
    /// fails; the storage error is still returned to the caller.
    pub fn clear(&self) -> Result<(), SessionError> {
        let result = self.storage.clear();
        if let Err(e) = &result {
            warn!("could not remove saved session: {e}");
        }
        self.tx.send_replace(None);
        info!("session cleared");
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! File-backed persistence for the session credential.
//!
//! The credential lives in `session.toml` next to `config.toml`:
//!
//! ```toml
//! bridge_session_token = "3f1c0e..."
//! ```
//!
//! A missing file, a file without the key, or a file that is not valid TOML
//! means "not paired"; the next pairing overwrites it.  Logging out deletes
//! the file.

use std::path::{Path, PathBuf};

use bridge_core::SessionToken;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::{config_dir, ConfigError};
use crate::application::session::{CredentialStorage, SessionError};

/// File name of the credential file inside the config directory.
pub const SESSION_FILE_NAME: &str = "session.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bridge_session_token: Option<String>,
}

/// Stores the credential in a TOML file.
#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `session.toml` in the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] if that directory cannot
    /// be determined.
    pub fn at_default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir()?.join(SESSION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Storage(Box::new(ConfigError::Io {
            path: self.path.clone(),
            source,
        }))
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: SessionFile = match toml::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                return Ok(None);
            }
        };

        match file.bridge_session_token.map(SessionToken::new) {
            Some(Ok(token)) => {
                debug!(path = %self.path.display(), token = %token.fingerprint(), "loaded saved session");
                Ok(Some(token))
            }
            Some(Err(_)) => {
                warn!(path = %self.path.display(), "ignoring blank saved session token");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let content = toml::to_string(&SessionFile {
            bridge_session_token: Some(token.expose().to_string()),
        })
        .map_err(|e| SessionError::Storage(Box::new(ConfigError::Serialize(e))))?;

        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

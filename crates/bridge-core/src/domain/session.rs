//! Session credential and pairing-code value types.
//!
//! # Pairing in one paragraph (for beginners)
//!
//! The console never sees a password.  Instead, the user asks the bridge app
//! for a *pairing code*; the bridge shows a 6-character code on the PC screen;
//! the user types that code into the console; the console sends it back to the
//! bridge, which replies with an opaque *session token*.  The token is stored
//! locally and attached to every later request as the `X-Session-Token`
//! header.  Holding a token is the one and only signal for "authenticated".

use std::fmt;

use thiserror::Error;

/// Number of characters in a pairing code shown by the bridge app.
pub const PAIRING_CODE_LEN: usize = 6;

/// Validation failures that are caught locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The pairing code does not have exactly [`PAIRING_CODE_LEN`] characters.
    #[error("Enter the 6-character code shown on the bridge.")]
    IncompletePairingCode {
        /// Number of characters actually entered.
        len: usize,
    },

    /// The print content is empty or consists only of whitespace.
    #[error("Enter some content to print.")]
    EmptyPrintContent,

    /// The bridge returned an empty string where a session token was expected.
    #[error("The bridge did not issue a session token.")]
    EmptySessionToken,
}

// ── SessionToken ──────────────────────────────────────────────────────────────

/// Opaque session credential issued by the bridge after successful pairing.
///
/// The `Debug` implementation deliberately hides the value so that tokens do
/// not end up in log files when a struct containing one is logged with `{:?}`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string received from the bridge.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySessionToken`] when `raw` is empty or
    /// whitespace-only.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptySessionToken);
        }
        Ok(Self(raw))
    }

    /// Returns the raw token string for use in the `X-Session-Token` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns a short, log-safe fingerprint of the token (first 4 chars).
    pub fn fingerprint(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{head}…")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"<redacted>").finish()
    }
}

// ── PairingCode ───────────────────────────────────────────────────────────────

/// A validated 6-character pairing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode(String);

impl PairingCode {
    /// Parses user input into a pairing code.
    ///
    /// Surrounding whitespace is ignored.  Any character is accepted; the
    /// bridge decides whether the code matches.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompletePairingCode`] unless the trimmed
    /// input has exactly [`PAIRING_CODE_LEN`] characters.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let len = trimmed.chars().count();
        if len != PAIRING_CODE_LEN {
            return Err(ValidationError::IncompletePairingCode { len });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as sent in the `pairing_code` JSON field.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Storage infrastructure: configuration and credential files.
//!
//! - `config` reads `config.toml` from the platform config directory and
//!   converts it into the settings the rest of the crate consumes.
//! - `credentials` persists the session token in `session.toml` in the same
//!   directory, implementing the application's `CredentialStorage` port.

pub mod config;
pub mod credentials;

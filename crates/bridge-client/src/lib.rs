//! bridge-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the console binary share the same module tree.
//!
//! # What does bridge-client do? (for beginners)
//!
//! The bridge console is the operator-facing front end of a local *bridge
//! app* that drives a printer and a scanner.  This crate contains everything
//! except the terminal rendering:
//!
//! 1. Pairs with the bridge: asks it to show a 6-character code, sends the
//!    code the user typed back, and stores the session token it receives.
//! 2. Restores that token on the next start so the user does not pair again.
//! 3. Polls the printer and scanner for readiness while the dashboard is
//!    shown, and sends print and scan commands.
//! 4. Keeps a WebSocket connection to the bridge's realtime hub and turns
//!    pushed scan events into scan log lines.
//! 5. Resolves routes and guards, so the pairing page and the dashboard are
//!    shown at the right time.

/// Application layer: use cases, view models, and ports.
pub mod application;

/// Infrastructure layer: HTTP client, realtime hub client, file storage.
pub mod infrastructure;

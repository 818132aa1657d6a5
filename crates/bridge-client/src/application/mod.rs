//! Application layer use cases for the bridge console.
//!
//! # What lives here? (for beginners)
//!
//! The application layer turns user intentions ("pair with the bridge",
//! "print this", "show me the dashboard") into calls on the ports defined in
//! [`ports`].  It holds the state each view renders and decides which
//! message to show for every outcome.  It never builds an HTTP request or
//! opens a socket itself; tests swap the infrastructure adapters for fakes.
//!
//! # Sub-modules
//!
//! - **`ports`** – The traits the use cases depend on (`PairingApi`,
//!   `PrinterApi`, `ScannerApi`, `RealtimeHub`) and the `Subscription` guard.
//!
//! - **`session`** – The credential store: one writer, many readers.
//!
//! - **`auth`** – Pairing and logout (`AuthService`).
//!
//! - **`pairing_form`** – Input state of the pairing page.
//!
//! - **`readiness`** – Device status polling shared by the panels.
//!
//! - **`printer`** / **`scanner`** – The two dashboard panels.
//!
//! - **`dashboard`** – Mounts both panels and the realtime indicator.
//!
//! - **`shell`** – Route resolution, guards, and view lifecycle (`AppShell`).

pub mod auth;
pub mod dashboard;
pub mod pairing_form;
pub mod ports;
pub mod printer;
pub(crate) mod readiness;
pub mod scanner;
pub mod session;
pub mod shell;

//! Infrastructure layer for the bridge client.
//!
//! Contains the adapters that talk to the outside world.
//!
//! # Sub-modules
//!
//! - **`api_client`** – `reqwest` client for the bridge's HTTP API.  Implements
//!   the `PairingApi`, `PrinterApi` and `ScannerApi` ports.
//!
//! - **`realtime`** – WebSocket client for the bridge's push-notification hub
//!   (SignalR JSON hub protocol), with keepalive and supervised reconnects.
//!   Implements the `RealtimeHub` port.
//!
//! - **`reconnect`** – Retry schedules for the realtime client.
//!
//! - **`poller`** – Cancellable repeating task used for status polling.
//!
//! - **`storage`** – TOML configuration file and the session credential file.

pub mod api_client;
pub mod poller;
pub mod realtime;
pub mod reconnect;
pub mod storage;

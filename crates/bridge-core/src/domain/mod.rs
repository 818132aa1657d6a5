//! Domain types for the bridge console.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What belongs here?
//!
//! - Value types with validation rules (`SessionToken`, `PairingCode`)
//! - The readiness model and its badge mapping
//! - The closed set of realtime events and their payloads
//! - The route table and its authentication guards
//! - The JSON request/response bodies of the HTTP API
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `reqwest`, or WebSocket types
//! - File I/O or environment variable reading
//! - Anything that could block or fail due to external state

pub mod connection;
pub mod device;
pub mod events;
pub mod messages;
pub mod route;
pub mod scan_log;
pub mod session;

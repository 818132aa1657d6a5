//! # bridge-console
//!
//! Terminal front end for the local printer/scanner bridge.
//!
//! The binary in `main.rs` is a thin wrapper: it parses the command line,
//! sets up logging, and hands an [`AppShell`](bridge_client::application::shell::AppShell)
//! to either the interactive shell or a one-shot command.  Everything it
//! calls lives here so that it can be tested without a terminal.
//!
//! # Modules (for beginners)
//!
//! - **`cli`** – The `clap` argument definitions and how flags override the
//!   config file.
//! - **`app`** – Builds the HTTP client, realtime client, session store and
//!   shell from a [`ClientConfig`](bridge_client::infrastructure::storage::config::ClientConfig).
//! - **`repl`** – The interactive loop: parse a line, apply it, redraw.
//! - **`commands`** – `pair`, `logout`, `print`, `scan` and `status` for
//!   scripts.
//! - **`views`** – Pure functions that turn view snapshots into text.

pub mod app;
pub mod cli;
pub mod commands;
pub mod repl;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

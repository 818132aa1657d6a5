//! Bridge Console entry point.
//!
//! Pairs this computer with the local bridge app and then operates its
//! printer and scanner, either interactively or one command at a time.
//!
//! # Usage
//!
//! ```text
//! bridge-console [OPTIONS] [COMMAND]
//!
//! Commands:
//!   shell                 Interactive shell (default)
//!   pair request          Show a pairing code on the bridge screen
//!   pair submit <CODE>    Pair using the code shown on the bridge
//!   logout                Forget the stored session
//!   print <TEXT>          Print a text label
//!   scan                  Ask the scanner for a scan
//!   status                Show printer and scanner readiness
//!
//! Options:
//!   --api-url <URL>        Bridge base URL      [env: BRIDGE_API_URL]
//!   --config <PATH>        Config file          [env: BRIDGE_CONFIG]
//!   --session-file <PATH>  Session token file   [env: BRIDGE_SESSION_FILE]
//!   --log-level <LEVEL>    Log level            [env: BRIDGE_LOG_LEVEL]
//! ```
//!
//! # Environment variables
//!
//! | Variable              | Description                                   |
//! |-----------------------|-----------------------------------------------|
//! | `RUST_LOG`            | Full `tracing` filter; wins over everything   |
//! | `BRIDGE_API_URL`      | Overrides `[api] base_url`                    |
//! | `BRIDGE_CONFIG`       | Config file instead of the platform default   |
//! | `BRIDGE_SESSION_FILE` | Session file instead of the platform default  |
//! | `BRIDGE_LOG_LEVEL`    | Overrides `[logging] level`                   |
//!
//! Logs go to stderr; the views are drawn on stdout.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bridge_console::app::ConsoleApp;
use bridge_console::cli::{Cli, Command};
use bridge_console::{commands, repl};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // RUST_LOG wins; otherwise the flag or config level (already merged).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(api = %config.api.base_url, "Bridge Console starting");

    let storage = Arc::new(cli.credential_storage()?);
    info!("session file: {}", storage.path().display());
    let mut app = ConsoleApp::build(&config, storage)?;

    let result = match cli.command() {
        Command::Shell => run_shell(&mut app).await,
        command => {
            let mut stdout = std::io::stdout();
            commands::run_once(app.shell_mut(), command, &mut stdout).await
        }
    };

    app.shutdown().await;
    info!("Bridge Console stopped");
    result
}

async fn run_shell(app: &mut ConsoleApp) -> anyhow::Result<()> {
    app.shell_mut()
        .navigate("/")
        .context("could not open the start page")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    // Ctrl+C ends the session the same way `quit` does.
    tokio::select! {
        result = repl::run(app.shell_mut(), stdin, &mut stdout) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, leaving the shell");
            Ok(())
        }
    }
}

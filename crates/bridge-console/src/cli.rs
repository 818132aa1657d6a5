//! Command-line interface.
//!
//! Every option can also be given through an environment variable.  Options
//! that correspond to a config file field override that field; everything
//! else comes from `config.toml` (or the built-in defaults).

use std::path::PathBuf;

use anyhow::Context;
use bridge_client::infrastructure::storage::config::{
    load_config, load_config_from, ClientConfig, ConfigError,
};
use bridge_client::infrastructure::storage::credentials::FileCredentialStorage;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bridge-console",
    about = "Pair with and operate the local printer/scanner bridge",
    version
)]
pub struct Cli {
    /// Base URL of the bridge app (overrides `[api] base_url`).
    #[arg(long, env = "BRIDGE_API_URL")]
    pub api_url: Option<String>,

    /// Config file to read instead of the platform default.
    #[arg(long, env = "BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where the session token is stored.
    #[arg(long, env = "BRIDGE_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Log level when `RUST_LOG` is not set (overrides `[logging] level`).
    #[arg(long, env = "BRIDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive shell (the default).
    Shell,
    /// Pair this computer with the bridge.
    Pair {
        #[command(subcommand)]
        action: PairCommand,
    },
    /// Forget the stored session.
    Logout,
    /// Print a text label.
    Print { text: String },
    /// Ask the scanner for a scan.
    Scan,
    /// Show printer and scanner readiness.
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum PairCommand {
    /// Show a fresh pairing code on the bridge screen.
    Request,
    /// Exchange the code shown on the bridge for a session.
    Submit { code: String },
}

impl Cli {
    /// The subcommand to run; `shell` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }

    /// Loads the config file and applies the command-line overrides.
    ///
    /// Without `--config`, a platform with no config directory simply gets
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the config file exists but cannot be read or parsed.
    pub fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match load_config() {
                Ok(config) => config,
                Err(ConfigError::NoPlatformConfigDir) => ClientConfig::default(),
                Err(e) => return Err(e).context("failed to load config"),
            },
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// The credential file: `--session-file`, or `session.toml` next to the
    /// config file in the platform config directory.
    pub fn credential_storage(&self) -> anyhow::Result<FileCredentialStorage> {
        match &self.session_file {
            Some(path) => Ok(FileCredentialStorage::new(path.clone())),
            None => FileCredentialStorage::at_default_location()
                .context("could not determine where to store the session; pass --session-file"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

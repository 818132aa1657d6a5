//! TOML-based configuration for the bridge console.
//!
//! Reads `ClientConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\BridgeConsole\config.toml`
//! - Linux:    `~/.config/bridge-console/config.toml`
//! - macOS:    `~/Library/Application Support/BridgeConsole/config.toml`
//!
//! Every section and every field is optional.  A missing file, a missing
//! section, or a missing field all fall back to the defaults below, so a
//! fresh install works without any config file at all:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:1789"
//! request_timeout_secs = 10
//!
//! [realtime]
//! hub_path = "/bridgeHub"
//! skip_negotiation = false
//! keepalive_secs = 15
//! server_timeout_secs = 30
//!
//! [realtime.reconnect]
//! strategy = "exponential"   # or "fixed"
//! base_delay_ms = 1000
//! max_delay_ms = 30000
//! max_attempts = 10          # 0 = retry forever
//! fixed_delay_ms = 5000
//!
//! [dashboard]
//! status_poll_secs = 5
//! connection_poll_ms = 1000
//! scan_log_capacity = 500    # 0 = unbounded
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dashboard::DashboardSettings;
use crate::infrastructure::api_client::DEFAULT_BASE_URL;
use crate::infrastructure::realtime::{RealtimeConfig, DEFAULT_HUB_PATH};
use crate::infrastructure::reconnect::{ExponentialBackoff, FixedDelay, ReconnectPolicy};

/// Error type for configuration and credential file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A timing field was set to zero.
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    /// The value could not be serialized to TOML.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub realtime: RealtimeSection,
    #[serde(default)]
    pub dashboard: DashboardSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSection {
    /// Base URL of the bridge app, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeSection {
    #[serde(default = "default_hub_path")]
    pub hub_path: String,
    #[serde(default)]
    pub skip_negotiation: bool,
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    #[serde(default = "default_server_timeout_secs")]
    pub server_timeout_secs: u64,
    #[serde(default)]
    pub reconnect: ReconnectSection,
}

/// Which retry schedule the realtime client uses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectStrategy {
    #[default]
    Exponential,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconnectSection {
    #[serde(default)]
    pub strategy: ReconnectStrategy,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// `0` retries forever.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSection {
    #[serde(default = "default_status_poll_secs")]
    pub status_poll_secs: u64,
    #[serde(default = "default_connection_poll_ms")]
    pub connection_poll_ms: u64,
    /// `0` keeps every entry.
    #[serde(default = "default_scan_log_capacity")]
    pub scan_log_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_hub_path() -> String {
    DEFAULT_HUB_PATH.to_string()
}
fn default_keepalive_secs() -> u64 {
    15
}
fn default_server_timeout_secs() -> u64 {
    30
}
fn default_base_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_max_attempts() -> u32 {
    10
}
fn default_fixed_delay_ms() -> u64 {
    5_000
}
fn default_status_poll_secs() -> u64 {
    5
}
fn default_connection_poll_ms() -> u64 {
    1_000
}
fn default_scan_log_capacity() -> usize {
    bridge_core::domain::scan_log::DEFAULT_SCAN_LOG_CAPACITY
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RealtimeSection {
    fn default() -> Self {
        Self {
            hub_path: default_hub_path(),
            skip_negotiation: false,
            keepalive_secs: default_keepalive_secs(),
            server_timeout_secs: default_server_timeout_secs(),
            reconnect: ReconnectSection::default(),
        }
    }
}

impl Default for ReconnectSection {
    fn default() -> Self {
        Self {
            strategy: ReconnectStrategy::default(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            fixed_delay_ms: default_fixed_delay_ms(),
        }
    }
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            status_poll_secs: default_status_poll_secs(),
            connection_poll_ms: default_connection_poll_ms(),
            scan_log_capacity: default_scan_log_capacity(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Conversions into runtime settings ─────────────────────────────────────────

impl ApiSection {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ReconnectSection {
    /// Builds the configured retry policy.
    pub fn build_policy(&self) -> Arc<dyn ReconnectPolicy> {
        match self.strategy {
            ReconnectStrategy::Exponential => Arc::new(ExponentialBackoff {
                base: Duration::from_millis(self.base_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
                max_attempts: if self.max_attempts == 0 {
                    u32::MAX
                } else {
                    self.max_attempts
                },
            }),
            ReconnectStrategy::Fixed => Arc::new(FixedDelay {
                delay: Duration::from_millis(self.fixed_delay_ms),
                max_attempts: (self.max_attempts != 0).then_some(self.max_attempts),
            }),
        }
    }
}

impl ClientConfig {
    /// Rejects timing values the runtime cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroValue`] naming the first interval or
    /// timeout that is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timings = [
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            ("realtime.keepalive_secs", self.realtime.keepalive_secs),
            ("realtime.server_timeout_secs", self.realtime.server_timeout_secs),
            ("dashboard.status_poll_secs", self.dashboard.status_poll_secs),
            ("dashboard.connection_poll_ms", self.dashboard.connection_poll_ms),
        ];
        match timings.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::ZeroValue(field)),
            None => Ok(()),
        }
    }

    /// Connection settings for the realtime client.
    pub fn realtime_config(&self) -> RealtimeConfig {
        RealtimeConfig {
            base_url: self.api.base_url.clone(),
            hub_path: self.realtime.hub_path.clone(),
            skip_negotiation: self.realtime.skip_negotiation,
            keepalive_interval: Duration::from_secs(self.realtime.keepalive_secs),
            server_timeout: Duration::from_secs(self.realtime.server_timeout_secs),
        }
    }

    /// Polling intervals and scan log size for the dashboard.
    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            status_poll_interval: Duration::from_secs(self.dashboard.status_poll_secs),
            connection_poll_interval: Duration::from_millis(self.dashboard.connection_poll_ms),
            scan_log_capacity: (self.dashboard.scan_log_capacity != 0)
                .then_some(self.dashboard.scan_log_capacity),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for config and session files.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `ClientConfig` from `path`, returning `ClientConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::ZeroValue`] if an interval or timeout is zero.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: ClientConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads `ClientConfig` from the platform config directory.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory, including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("BridgeConsole"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("bridge-console"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("BridgeConsole")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

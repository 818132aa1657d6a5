//! Wiring: builds the application services from a [`ClientConfig`].
//!
//! ```text
//! ApiClient ──┬── PairingApi ──► AuthService ◄── SessionStore ◄── credential file
//!             ├── PrinterApi ─┐
//!             └── ScannerApi ─┼─► DashboardServices ──► AppShell
//! RealtimeClient ─────────────┘
//! ```
//!
//! One HTTP client and one realtime client are shared by every view for the
//! lifetime of the process.

use std::sync::Arc;

use anyhow::Context;
use bridge_client::application::auth::AuthService;
use bridge_client::application::dashboard::DashboardServices;
use bridge_client::application::ports::RealtimeHub;
use bridge_client::application::session::{CredentialStorage, SessionStore};
use bridge_client::application::shell::AppShell;
use bridge_client::infrastructure::api_client::ApiClient;
use bridge_client::infrastructure::realtime::RealtimeClient;
use bridge_client::infrastructure::storage::config::ClientConfig;
use tracing::{debug, info};

pub struct ConsoleApp {
    shell: AppShell,
    realtime: Arc<RealtimeClient>,
}

impl ConsoleApp {
    /// Builds the production services and restores the saved session.
    ///
    /// Nothing is mounted yet; the caller navigates to the first route.
    ///
    /// # Errors
    ///
    /// Fails when an HTTP client cannot be created or the credential file
    /// exists but cannot be read.
    pub fn build(
        config: &ClientConfig,
        storage: Arc<dyn CredentialStorage>,
    ) -> anyhow::Result<Self> {
        let api = Arc::new(
            ApiClient::new(config.api.base_url.clone(), config.api.request_timeout())
                .context("failed to create the bridge HTTP client")?,
        );
        let realtime = Arc::new(
            RealtimeClient::new(
                config.realtime_config(),
                config.realtime.reconnect.build_policy(),
            )
            .context("failed to create the realtime client")?,
        );
        info!(api = %api.base_url(), hub = %config.realtime.hub_path, "bridge endpoints");

        let (store, writer) =
            SessionStore::open(storage).context("failed to read the saved session")?;
        let auth = AuthService::new(api.clone(), store, writer);
        let hub: Arc<dyn RealtimeHub> = realtime.clone();
        let services = DashboardServices {
            printer_api: api.clone(),
            scanner_api: api,
            realtime: hub,
        };

        Ok(Self {
            shell: AppShell::new(auth, services, config.dashboard_settings()),
            realtime,
        })
    }

    pub fn shell(&self) -> &AppShell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut AppShell {
        &mut self.shell
    }

    /// Unmounts the current view and closes the realtime connection.
    pub async fn shutdown(self) {
        let Self { shell, realtime } = self;
        drop(shell);
        realtime.stop().await;
        debug!("console shut down");
    }
}

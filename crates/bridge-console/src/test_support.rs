//! Stub bridge services shared by the unit tests of this crate.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_client::application::auth::AuthService;
use bridge_client::application::dashboard::{DashboardServices, DashboardSettings};
use bridge_client::application::ports::{
    EventHandler, HandlerId, PairingApi, PrinterApi, RealtimeHub, ScannerApi,
};
use bridge_client::application::session::{MemoryCredentialStorage, SessionStore};
use bridge_client::application::shell::AppShell;
use bridge_client::infrastructure::api_client::ApiError;
use bridge_client::infrastructure::realtime::registry::HandlerRegistry;
use bridge_core::domain::messages::{CommandResponse, ValidateCodeResponse};
use bridge_core::{ConnectionState, EventKind, PairingCode, SessionToken};
use parking_lot::Mutex;

/// A bridge where `123456` pairs as `abc`, both devices report `ready`, and
/// every command is recorded.  With `scanner_busy` set, scan requests are
/// refused with a 409.
#[derive(Default)]
pub struct StubBridge {
    pub printed: Mutex<Vec<String>>,
    pub scans: Mutex<u32>,
    pub code_requests: Mutex<u32>,
    pub printer_ready: bool,
    pub scanner_busy: bool,
}

impl StubBridge {
    pub fn ready() -> Arc<Self> {
        Arc::new(Self {
            printer_ready: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl PairingApi for StubBridge {
    async fn request_pairing_code(&self) -> Result<(), ApiError> {
        *self.code_requests.lock() += 1;
        Ok(())
    }

    async fn validate_pairing_code(
        &self,
        code: &PairingCode,
    ) -> Result<ValidateCodeResponse, ApiError> {
        if code.as_str() == "123456" {
            Ok(ValidateCodeResponse {
                session_token: Some("abc".to_string()),
            })
        } else {
            Err(ApiError::Server {
                status: 400,
                detail: "invalid code".to_string(),
            })
        }
    }
}

#[async_trait]
impl PrinterApi for StubBridge {
    async fn printer_status(&self, _token: &SessionToken) -> Result<bool, ApiError> {
        Ok(self.printer_ready)
    }

    async fn print(
        &self,
        _token: &SessionToken,
        content: &str,
    ) -> Result<CommandResponse, ApiError> {
        self.printed.lock().push(content.to_string());
        Ok(CommandResponse::default())
    }
}

#[async_trait]
impl ScannerApi for StubBridge {
    async fn scanner_status(&self, _token: &SessionToken) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn scan(&self, _token: &SessionToken) -> Result<CommandResponse, ApiError> {
        *self.scans.lock() += 1;
        if self.scanner_busy {
            return Err(ApiError::Server {
                status: 409,
                detail: "scanner is busy".to_string(),
            });
        }
        Ok(CommandResponse::default())
    }
}

/// A hub that never connects but keeps track of handlers.
#[derive(Default)]
pub struct IdleHub {
    handlers: HandlerRegistry,
}

impl RealtimeHub for IdleHub {
    fn start_connection(&self) {}

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    fn on(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        self.handlers.add(kind, handler)
    }

    fn off(&self, kind: EventKind, id: HandlerId) -> bool {
        self.handlers.remove(kind, id)
    }
}

/// A shell wired to `bridge`, optionally already paired as `abc`.
pub fn shell(bridge: &Arc<StubBridge>, paired: bool) -> AppShell {
    let storage = if paired {
        MemoryCredentialStorage::with_token(SessionToken::new("abc").unwrap())
    } else {
        MemoryCredentialStorage::new()
    };
    let (store, writer) = SessionStore::open(Arc::new(storage)).unwrap();
    let auth = AuthService::new(bridge.clone(), store, writer);
    let services = DashboardServices {
        printer_api: bridge.clone(),
        scanner_api: bridge.clone(),
        realtime: Arc::new(IdleHub::default()),
    };
    AppShell::new(auth, services, DashboardSettings::default())
}

//! HTTP client for the bridge API.
//!
//! Every call goes through [`ApiClient::request`], which owns the shared
//! conventions of the bridge API:
//!
//! - the session token travels in the `X-Session-Token` header;
//! - request bodies are JSON;
//! - a non-success status carries `{"detail": "..."}` describing the failure;
//! - `204 No Content` (or an empty body) means "no data".
//!
//! The thin per-endpoint operations below it implement the application-layer
//! ports ([`PairingApi`], [`PrinterApi`], [`ScannerApi`]) so that use cases can
//! be tested against fakes without an HTTP server.
//!
//! # Error messages (for beginners)
//!
//! The user never sees a raw `reqwest` error.  [`ApiError::user_message`]
//! turns every failure into one line of text:
//!
//! | Failure                              | Text shown                            |
//! |--------------------------------------|---------------------------------------|
//! | connection refused, timeout, …       | `Could not reach the bridge app.`     |
//! | non-2xx with `{"detail": "x"}`       | `x`                                   |
//! | non-2xx with empty/missing detail    | `The server request failed.`          |
//! | non-2xx with a non-JSON body         | `Unknown server error`                |
//! | 2xx with a body that does not parse  | `The bridge app sent an unexpected response.` |

use std::time::Duration;

use async_trait::async_trait;
use bridge_core::domain::messages::{
    CommandResponse, ErrorBody, PrintRequest, StatusResponse, ValidateCodeRequest,
    ValidateCodeResponse, PATH_PRINT, PATH_PRINTER_STATUS, PATH_REQUEST_CODE, PATH_SCAN,
    PATH_SCANNER_STATUS, PATH_VALIDATE_CODE, SESSION_HEADER,
};
use bridge_core::{PairingCode, SessionToken};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::ports::{PairingApi, PrinterApi, ScannerApi};

/// Address of the bridge app when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1789";

/// Per-request timeout when nothing else is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";
pub const SERVER_REQUEST_FAILED: &str = "The server request failed.";
pub const BRIDGE_UNREACHABLE: &str = "Could not reach the bridge app.";
pub const UNEXPECTED_RESPONSE: &str = "The bridge app sent an unexpected response.";

/// Placeholder for requests without a body.
const NO_BODY: Option<&'static ()> = None;

/// Errors returned by [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connect failure, timeout).
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The bridge answered with a non-success status.
    #[error("bridge returned HTTP {status}: {detail}")]
    Server { status: u16, detail: String },

    /// A success response carried a body of the wrong shape.
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    /// The single line of text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { .. } => BRIDGE_UNREACHABLE.to_string(),
            ApiError::Server { detail, .. } => detail.clone(),
            ApiError::Decode { .. } => UNEXPECTED_RESPONSE.to_string(),
        }
    }
}

/// Derives the `detail` of a failed response from its raw body.
fn server_detail(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(detail),
        }) if !detail.is_empty() => detail,
        Ok(_) => SERVER_REQUEST_FAILED.to_string(),
        Err(_) => UNKNOWN_SERVER_ERROR.to_string(),
    }
}

/// Async HTTP client bound to one bridge base URL.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:1789`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built
    /// (for example, if the TLS backend fails to initialise).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                url: base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one request against `path`.
    ///
    /// Returns `Ok(None)` for `204 No Content` or an empty success body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].  Requests are never retried.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&SessionToken>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "bridge API request");

        let mut builder = self.http.request(method, &url);
        if let Some(token) = token {
            builder = builder.header(SESSION_HEADER, token.expose());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%url, error = %e, "bridge API unreachable");
            ApiError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ApiError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let detail = server_detail(&bytes);
            warn!(%url, status = status.as_u16(), %detail, "bridge API returned an error");
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode {
                url,
                reason: e.to_string(),
            })
    }

    /// Fetches a device status and extracts `is_ready`.
    async fn device_status(&self, path: &str, token: &SessionToken) -> Result<bool, ApiError> {
        let status: Option<StatusResponse> =
            self.request(Method::GET, path, NO_BODY, Some(token)).await?;
        status.map(|s| s.is_ready).ok_or_else(|| ApiError::Decode {
            url: format!("{}{}", self.base_url, path),
            reason: "empty status response".to_string(),
        })
    }
}

#[async_trait]
impl PairingApi for ApiClient {
    async fn request_pairing_code(&self) -> Result<(), ApiError> {
        // The acknowledgement body carries nothing the client needs.
        let _: Option<serde_json::Value> = self
            .request(Method::POST, PATH_REQUEST_CODE, NO_BODY, None)
            .await?;
        Ok(())
    }

    async fn validate_pairing_code(
        &self,
        code: &PairingCode,
    ) -> Result<ValidateCodeResponse, ApiError> {
        let body = ValidateCodeRequest {
            pairing_code: code.as_str().to_string(),
        };
        let response: Option<ValidateCodeResponse> = self
            .request(Method::POST, PATH_VALIDATE_CODE, Some(&body), None)
            .await?;
        Ok(response.unwrap_or(ValidateCodeResponse {
            session_token: None,
        }))
    }
}

#[async_trait]
impl PrinterApi for ApiClient {
    async fn printer_status(&self, token: &SessionToken) -> Result<bool, ApiError> {
        self.device_status(PATH_PRINTER_STATUS, token).await
    }

    async fn print(
        &self,
        token: &SessionToken,
        content: &str,
    ) -> Result<CommandResponse, ApiError> {
        let body = PrintRequest {
            content: content.to_string(),
        };
        let response: Option<CommandResponse> = self
            .request(Method::POST, PATH_PRINT, Some(&body), Some(token))
            .await?;
        Ok(response.unwrap_or_default())
    }
}

#[async_trait]
impl ScannerApi for ApiClient {
    async fn scanner_status(&self, token: &SessionToken) -> Result<bool, ApiError> {
        self.device_status(PATH_SCANNER_STATUS, token).await
    }

    async fn scan(&self, token: &SessionToken) -> Result<CommandResponse, ApiError> {
        let response: Option<CommandResponse> = self
            .request(Method::POST, PATH_SCAN, NO_BODY, Some(token))
            .await?;
        Ok(response.unwrap_or_default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

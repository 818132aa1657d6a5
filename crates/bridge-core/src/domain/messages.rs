//! JSON bodies exchanged with the bridge's HTTP API.
//!
//! | Method | Path                     | Request body           | Response body         |
//! |--------|--------------------------|------------------------|-----------------------|
//! | POST   | `/pairing/request-code`  | –                      | ack (ignored)         |
//! | POST   | `/pairing/validate-code` | [`ValidateCodeRequest`]| [`ValidateCodeResponse`] |
//! | GET    | `/printer/status`        | –                      | [`StatusResponse`]    |
//! | POST   | `/printer/print`         | [`PrintRequest`]       | [`CommandResponse`]   |
//! | GET    | `/scanner/status`        | –                      | [`StatusResponse`]    |
//! | POST   | `/scanner/scan`          | –                      | [`CommandResponse`]   |
//!
//! Every non-success response is expected to carry an [`ErrorBody`].

use serde::{Deserialize, Serialize};

pub const PATH_REQUEST_CODE: &str = "/pairing/request-code";
pub const PATH_VALIDATE_CODE: &str = "/pairing/validate-code";
pub const PATH_PRINTER_STATUS: &str = "/printer/status";
pub const PATH_PRINT: &str = "/printer/print";
pub const PATH_SCANNER_STATUS: &str = "/scanner/status";
pub const PATH_SCAN: &str = "/scanner/scan";

/// Header carrying the session credential.
pub const SESSION_HEADER: &str = "X-Session-Token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateCodeRequest {
    pub pairing_code: String,
}

/// `session_token` is optional so that a 200 without a token can be reported
/// as a pairing failure instead of a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateCodeResponse {
    #[serde(default)]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

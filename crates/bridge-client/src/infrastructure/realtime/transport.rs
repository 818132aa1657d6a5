//! Connection setup for the realtime hub: negotiate, WebSocket upgrade,
//! handshake.
//!
//! ```text
//! POST http://host/bridgeHub/negotiate?negotiateVersion=1
//!   ◄── {"connectionToken":"abc","connectionId":"...","availableTransports":[...]}
//! GET  ws://host/bridgeHub?id=abc   (WebSocket upgrade)
//!   ──► {"protocol":"json","version":1}\x1E
//!   ◄── {}\x1E
//! ```
//!
//! When `skip_negotiation` is set the first step is skipped and the socket
//! is opened directly at `ws://host/bridgeHub`.

use bridge_core::protocol::{handshake_request, parse_handshake_response, HubFrameReader};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::{RealtimeConfig, RealtimeError};

pub(crate) type HubSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NegotiateResponse {
    #[serde(default)]
    connection_token: Option<String>,
    #[serde(default)]
    connection_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `{base_url}{hub_path}` with exactly one slash between them.
pub fn hub_http_url(base_url: &str, hub_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        hub_path.trim_start_matches('/')
    )
}

/// Turns the hub's HTTP URL into its WebSocket URL, appending the connection
/// token from negotiation when there is one.
///
/// # Errors
///
/// Returns [`RealtimeError::InvalidUrl`] if the URL does not parse or does not
/// use `http`/`https`.
pub fn websocket_url(hub_url: &str, connection_token: Option<&str>) -> Result<Url, RealtimeError> {
    let invalid = |reason: &str| RealtimeError::InvalidUrl {
        url: hub_url.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(hub_url).map_err(|e| invalid(&e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return Err(invalid("expected an http or https URL")),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to a WebSocket scheme"))?;

    if let Some(token) = connection_token {
        url.query_pairs_mut().append_pair("id", token);
    }
    Ok(url)
}

/// Runs the negotiate request and returns the connection token, if any.
async fn negotiate(http: &reqwest::Client, hub_url: &str) -> Result<Option<String>, RealtimeError> {
    let url = format!("{hub_url}/negotiate?negotiateVersion=1");
    debug!(%url, "negotiating realtime connection");

    let response = http
        .post(&url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| RealtimeError::Negotiate(e.to_string()))?;
    let body: NegotiateResponse = response
        .json()
        .await
        .map_err(|e| RealtimeError::Negotiate(e.to_string()))?;

    if let Some(error) = body.error {
        return Err(RealtimeError::NegotiateRejected(error));
    }
    Ok(body.connection_token.or(body.connection_id))
}

/// Reads frames until the handshake response record is complete.
async fn read_handshake(
    socket: &mut HubSocket,
    reader: &mut HubFrameReader,
) -> Result<String, RealtimeError> {
    loop {
        if let Some(record) = reader.next_record() {
            return Ok(record);
        }
        match socket.next().await {
            Some(Ok(Message::Text(text))) => reader.feed(&text),
            Some(Ok(Message::Close(_))) | None => return Err(RealtimeError::ClosedDuringHandshake),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

/// Opens a hub connection and completes the handshake.
///
/// Returns the socket and the frame reader, which may already hold records
/// the hub sent right after its handshake response.
pub(crate) async fn open(
    http: &reqwest::Client,
    config: &RealtimeConfig,
) -> Result<(HubSocket, HubFrameReader), RealtimeError> {
    let hub_url = hub_http_url(&config.base_url, &config.hub_path);
    let token = if config.skip_negotiation {
        None
    } else {
        negotiate(http, &hub_url).await?
    };
    let ws_url = websocket_url(&hub_url, token.as_deref())?;

    debug!(url = %ws_url, "opening realtime WebSocket");
    let (mut socket, _response) = connect_async(ws_url.as_str()).await?;

    socket.send(Message::Text(handshake_request())).await?;

    let mut reader = HubFrameReader::new();
    let ack = tokio::time::timeout(config.server_timeout, read_handshake(&mut socket, &mut reader))
        .await
        .map_err(|_| RealtimeError::HandshakeTimeout(config.server_timeout))??;
    parse_handshake_response(&ack)?;

    info!(hub = %hub_url, "realtime hub handshake complete");
    Ok((socket, reader))
}

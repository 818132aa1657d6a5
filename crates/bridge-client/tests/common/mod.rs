//! Shared test doubles for the bridge-client integration tests.
//!
//! - [`StubHttpServer`] is a minimal HTTP/1.1 server on `127.0.0.1:0` that
//!   answers every request through a closure and records what it received.
//! - [`StubHub`] speaks the realtime hub protocol: it answers the negotiate
//!   POST, accepts the WebSocket upgrade, completes the JSON handshake, and
//!   then plays a per-connection script of hub records.
//!
//! Both run on the test's Tokio runtime and stop when the runtime shuts down.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_core::protocol::{encode_message, HubFrameReader, HubMessage};
use bridge_core::RealtimeEvent;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

// ── HTTP stub ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::json(status, "")
    }
}

type Handler = dyn Fn(&RecordedRequest) -> StubResponse + Send + Sync;

pub struct StubHttpServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubHttpServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    serve_http(stream, handler.as_ref(), &recorded).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }
}

async fn serve_http(
    mut stream: TcpStream,
    handler: &Handler,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let Some(request) = read_http_request(&mut stream).await else {
        return;
    };
    recorded.lock().push(request.clone());
    let response = handler(&request);
    write_http_response(&mut stream, &response).await;
}

async fn read_http_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = head_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (body_start + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

async fn write_http_response(stream: &mut TcpStream, response: &StubResponse) {
    let raw = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ── Realtime hub stub ─────────────────────────────────────────────────────────

/// What the hub does on one connection after the handshake.
#[derive(Debug, Clone, Default)]
pub struct HubScript {
    /// Raw text frames, each holding one or more records.
    pub frames: Vec<String>,
    /// Drop the socket after sending `frames` instead of waiting for the
    /// client to leave.
    pub hang_up: bool,
}

impl HubScript {
    pub fn send(frames: Vec<String>) -> Self {
        Self {
            frames,
            hang_up: false,
        }
    }

    pub fn then_hang_up(mut self) -> Self {
        self.hang_up = true;
        self
    }
}

pub struct StubHub {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
    negotiations: Arc<AtomicUsize>,
    /// Query string of each WebSocket upgrade request, in order.
    upgrade_queries: Arc<Mutex<Vec<Option<String>>>>,
    /// Number of client close frames received.
    client_closes: Arc<AtomicUsize>,
}

/// Token handed out by the stub's negotiate endpoint.
pub const STUB_CONNECTION_TOKEN: &str = "stub-token-1";

impl StubHub {
    /// Starts the hub.  Connection `n` plays `scripts[n]`; connections past
    /// the end replay the last script.
    pub async fn start(scripts: Vec<HubScript>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hub = Self {
            base_url: format!("http://{addr}"),
            connections: Arc::new(AtomicUsize::new(0)),
            negotiations: Arc::new(AtomicUsize::new(0)),
            upgrade_queries: Arc::new(Mutex::new(Vec::new())),
            client_closes: Arc::new(AtomicUsize::new(0)),
        };

        let scripts = Arc::new(scripts);
        let connections = Arc::clone(&hub.connections);
        let negotiations = Arc::clone(&hub.negotiations);
        let queries = Arc::clone(&hub.upgrade_queries);
        let closes = Arc::clone(&hub.client_closes);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut peek = [0u8; 4];
                if stream.peek(&mut peek).await.is_err() {
                    continue;
                }
                if &peek == b"POST" {
                    negotiations.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let _ = read_http_request(&mut stream).await;
                        let body = format!(
                            r#"{{"negotiateVersion":1,"connectionId":"stub-id","connectionToken":"{STUB_CONNECTION_TOKEN}","availableTransports":[{{"transport":"WebSockets","transferFormats":["Text"]}}]}}"#
                        );
                        write_http_response(&mut stream, &StubResponse::json(200, body)).await;
                    });
                    continue;
                }

                let index = connections.fetch_add(1, Ordering::SeqCst);
                let script = scripts
                    .get(index)
                    .or_else(|| scripts.last())
                    .cloned()
                    .unwrap_or_default();
                let queries = Arc::clone(&queries);
                let closes = Arc::clone(&closes);
                tokio::spawn(async move {
                    serve_hub(stream, script, queries, closes).await;
                });
            }
        });

        hub
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn negotiations(&self) -> usize {
        self.negotiations.load(Ordering::SeqCst)
    }

    pub fn upgrade_queries(&self) -> Vec<Option<String>> {
        self.upgrade_queries.lock().clone()
    }

    pub fn client_closes(&self) -> usize {
        self.client_closes.load(Ordering::SeqCst)
    }
}

async fn serve_hub(
    stream: TcpStream,
    script: HubScript,
    queries: Arc<Mutex<Vec<Option<String>>>>,
    closes: Arc<AtomicUsize>,
) {
    let callback = move |req: &Request, resp: Response| {
        queries.lock().push(req.uri().query().map(str::to_string));
        Ok::<Response, ErrorResponse>(resp)
    };
    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };

    // Handshake: wait for the client's protocol record, then acknowledge.
    let mut reader = HubFrameReader::new();
    loop {
        if reader.next_record().is_some() {
            break;
        }
        match ws.next().await {
            Some(Ok(Message::Text(text))) => reader.feed(&text),
            _ => return,
        }
    }
    if ws.send(Message::Text("{}\u{1e}".to_string())).await.is_err() {
        return;
    }

    for frame in script.frames {
        if ws.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    if script.hang_up {
        return;
    }

    while let Some(Ok(message)) = ws.next().await {
        if let Message::Close(_) = message {
            closes.fetch_add(1, Ordering::SeqCst);
            break;
        }
    }
}

// ── Record helpers ────────────────────────────────────────────────────────────

/// One invocation record carrying `event`.
pub fn event_record(event: &RealtimeEvent) -> String {
    encode_message(&HubMessage::Invocation {
        invocation_id: None,
        target: event.kind().wire_name().to_string(),
        arguments: event.to_arguments(),
    })
    .unwrap()
}

pub fn close_record(error: Option<&str>, allow_reconnect: bool) -> String {
    encode_message(&HubMessage::Close {
        error: error.map(str::to_string),
        allow_reconnect,
    })
    .unwrap()
}

/// Polls `condition` every 10 ms until it holds or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

//! End-to-end tests for the dashboard: HTTP status polls, commands, and
//! realtime scan events, all against local stubs.
//!
//! ```text
//!                 ┌── PrinterPanel ──┐
//! Dashboard ──────┤                  ├── ApiClient ──HTTP──► StubHttpServer
//!                 └── ScannerPanel ──┘
//!                          ▲
//!                          └── RealtimeClient ◄──WebSocket── StubHub
//! ```

mod common;

use std::sync::Arc;
use std::time::Duration;

use bridge_client::application::dashboard::{Dashboard, DashboardServices, DashboardSettings};
use bridge_client::application::printer::PRINT_COMPLETED;
use bridge_client::infrastructure::api_client::ApiClient;
use bridge_client::infrastructure::realtime::{RealtimeClient, RealtimeConfig};
use bridge_client::infrastructure::reconnect::FixedDelay;
use bridge_core::domain::events::{BatchScanProgressPayload, ScanResultPayload};
use bridge_core::domain::messages::{PATH_PRINT, PATH_PRINTER_STATUS, PATH_SCANNER_STATUS};
use bridge_core::{Readiness, ReadinessBadge, RealtimeEvent, SessionToken};
use common::{event_record, wait_until, HubScript, StubHttpServer, StubHub, StubResponse};

const WAIT: Duration = Duration::from_secs(5);

fn token() -> SessionToken {
    SessionToken::new("abc").unwrap()
}

fn realtime(base_url: &str) -> Arc<RealtimeClient> {
    let config = RealtimeConfig {
        base_url: base_url.to_string(),
        skip_negotiation: true,
        ..RealtimeConfig::default()
    };
    let policy = Arc::new(FixedDelay {
        delay: Duration::from_millis(50),
        max_attempts: Some(3),
    });
    Arc::new(RealtimeClient::new(config, policy).unwrap())
}

fn services(api_url: &str, hub: Arc<RealtimeClient>) -> DashboardServices {
    let api = Arc::new(ApiClient::new(api_url, Duration::from_secs(5)).unwrap());
    DashboardServices {
        printer_api: api.clone(),
        scanner_api: api,
        realtime: hub,
    }
}

/// Both devices ready; prints succeed without a message.
async fn ready_bridge() -> StubHttpServer {
    StubHttpServer::start(|req| match req.path.as_str() {
        PATH_PRINTER_STATUS | PATH_SCANNER_STATUS => StubResponse::json(200, r#"{"is_ready":true}"#),
        PATH_PRINT => StubResponse::json(200, "{}"),
        _ => StubResponse::json(404, r#"{"detail":"not found"}"#),
    })
    .await
}

/// The printer status endpoint fails; the badge must read
/// "connection error", not "not ready".
#[tokio::test]
async fn test_failing_printer_status_shows_connection_error_badge() {
    // Arrange
    let bridge = StubHttpServer::start(|req| match req.path.as_str() {
        PATH_PRINTER_STATUS => StubResponse::json(500, r#"{"detail":"printer driver crashed"}"#),
        _ => StubResponse::json(200, r#"{"is_ready":true}"#),
    })
    .await;
    let hub = realtime("http://127.0.0.1:1");

    // Act
    let dashboard = Dashboard::mount(
        &services(&bridge.base_url, hub.clone()),
        token(),
        &DashboardSettings::default(),
    );
    dashboard.wait_for_status().await;

    // Assert
    let snap = dashboard.snapshot();
    assert_eq!(snap.printer.readiness, Readiness::ConnectionError);
    assert_eq!(snap.printer.badge, ReadinessBadge::ConnectionError);
    assert_eq!(snap.printer.badge.label(), "connection error");
    assert_eq!(snap.scanner.badge, ReadinessBadge::Ready);

    drop(dashboard);
    hub.stop().await;
}

/// Status polls carry the session token header.
#[tokio::test]
async fn test_status_polls_send_session_token() {
    let bridge = ready_bridge().await;
    let hub = realtime("http://127.0.0.1:1");

    let dashboard = Dashboard::mount(
        &services(&bridge.base_url, hub.clone()),
        token(),
        &DashboardSettings::default(),
    );
    dashboard.wait_for_status().await;

    let polls: Vec<_> = bridge
        .requests()
        .into_iter()
        .filter(|r| r.path == PATH_PRINTER_STATUS)
        .collect();
    assert!(!polls.is_empty());
    assert!(polls.iter().all(|r| r.header("x-session-token") == Some("abc")));

    drop(dashboard);
    hub.stop().await;
}

#[tokio::test]
async fn test_empty_print_makes_no_network_call() {
    // Arrange
    let bridge = ready_bridge().await;
    let hub = realtime("http://127.0.0.1:1");
    let mut dashboard = Dashboard::mount(
        &services(&bridge.base_url, hub.clone()),
        token(),
        &DashboardSettings::default(),
    );
    dashboard.wait_for_status().await;

    // Act
    dashboard.printer_mut().set_input("   ");
    dashboard.printer_mut().print().await;

    // Assert
    assert_eq!(
        dashboard.printer().status(),
        Some("Enter some content to print.")
    );
    assert_eq!(bridge.count(PATH_PRINT), 0);

    drop(dashboard);
    hub.stop().await;
}

#[tokio::test]
async fn test_print_sends_content_and_clears_input() {
    // Arrange
    let bridge = ready_bridge().await;
    let hub = realtime("http://127.0.0.1:1");
    let mut dashboard = Dashboard::mount(
        &services(&bridge.base_url, hub.clone()),
        token(),
        &DashboardSettings::default(),
    );
    dashboard.wait_for_status().await;

    // Act
    dashboard.printer_mut().set_input("hello label");
    dashboard.printer_mut().print().await;

    // Assert
    let snap = dashboard.snapshot().printer;
    assert_eq!(snap.status.as_deref(), Some(PRINT_COMPLETED));
    assert_eq!(snap.input, "");
    let print = bridge
        .requests()
        .into_iter()
        .find(|r| r.path == PATH_PRINT)
        .unwrap();
    assert_eq!(print.body, r#"{"content":"hello label"}"#);

    drop(dashboard);
    hub.stop().await;
}

/// Scan events pushed by the hub appear in the scan log, newest first, and
/// the header indicator turns on once connected.
#[tokio::test]
async fn test_realtime_scan_events_reach_scan_log() {
    // Arrange
    let bridge = ready_bridge().await;
    let stub_hub = StubHub::start(vec![HubScript::send(vec![
        event_record(&RealtimeEvent::BatchScanProgress(BatchScanProgressPayload {
            scan_type: "document".to_string(),
            current_page: 1,
            total_pages: 1,
            content: "page-1.png".to_string(),
        })),
        event_record(&RealtimeEvent::SingleScanResult(ScanResultPayload {
            scan_type: "barcode".to_string(),
            content: "4006381333931".to_string(),
        })),
    ])])
    .await;
    let hub = realtime(&stub_hub.base_url);
    let settings = DashboardSettings {
        connection_poll_interval: Duration::from_millis(20),
        ..DashboardSettings::default()
    };

    // Act
    let dashboard = Dashboard::mount(&services(&bridge.base_url, hub.clone()), token(), &settings);

    // Assert
    assert!(wait_until(WAIT, || dashboard.scanner().log().len() == 2).await);
    assert_eq!(
        dashboard.scanner().log(),
        vec![
            "[Single scan] 4006381333931".to_string(),
            "[Batch 1/1] page-1.png".to_string(),
        ]
    );
    assert_eq!(
        dashboard.scanner().status().as_deref(),
        Some("Single scan completed.")
    );
    assert!(wait_until(WAIT, || dashboard.is_realtime_connected()).await);

    drop(dashboard);
    hub.stop().await;
}

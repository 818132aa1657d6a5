//! The common layout: title bar, sidebar, and the routed page below them.
//!
//! ```text
//! Bridge Console                                Realtime: connected
//! ──────────────────────────────────────────────────────────────────
//!   Home
//!   Scan
//!     New scan
//!     Scan history
//! > Printer
//!   Package
//! ──────────────────────────────────────────────────────────────────
//! <page>
//! ```

use std::fmt::Write;

use bridge_core::domain::route::{sidebar, NavItem};
use bridge_core::Route;

pub const APP_TITLE: &str = "Bridge Console";
const WIDTH: usize = 66;

/// Renders the layout around `page`.
///
/// `realtime_connected` is `None` when no view tracks the hub (every page
/// except the dashboard), and the indicator is then left out.
pub fn render(route: &Route, realtime_connected: Option<bool>, page: &str) -> String {
    let mut out = String::new();
    out.push_str(&title_bar(realtime_connected));
    out.push('\n');
    out.push_str(&rule());
    for item in sidebar() {
        render_item(&mut out, &item, route.path(), 0);
    }
    out.push_str(&rule());
    out.push_str(page);
    if !page.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn title_bar(realtime_connected: Option<bool>) -> String {
    let Some(connected) = realtime_connected else {
        return APP_TITLE.to_string();
    };
    let indicator = format!(
        "Realtime: {}",
        if connected { "connected" } else { "disconnected" }
    );
    let pad = WIDTH.saturating_sub(APP_TITLE.len() + indicator.len()).max(1);
    format!("{APP_TITLE}{}{indicator}", " ".repeat(pad))
}

fn rule() -> String {
    let mut line = "─".repeat(WIDTH);
    line.push('\n');
    line
}

fn render_item(out: &mut String, item: &NavItem, current_path: &str, depth: usize) {
    // Groups only mark themselves when none of their children is the exact
    // match, so exactly one line carries the marker.
    let child_active = item.children.iter().any(|c| c.is_active(current_path));
    let marker = if item.is_active(current_path) && !child_active {
        '>'
    } else {
        ' '
    };
    let _ = writeln!(out, "{marker} {}{}", "  ".repeat(depth), item.title);
    for child in &item.children {
        render_item(out, child, current_path, depth + 1);
    }
}

/// Body of a route that only shows its title.
pub fn placeholder(title: &str) -> String {
    format!("{title}\n\nNothing here yet.\n")
}

pub fn not_found(path: &str) -> String {
    format!("Page not found: {path}\n\nType `go /` to return home.\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! The dashboard page: one panel per device.

use std::fmt::Write;

use bridge_client::application::dashboard::DashboardSnapshot;
use bridge_client::application::printer::PrinterSnapshot;
use bridge_client::application::scanner::ScannerSnapshot;
use bridge_core::{DeviceKind, ReadinessBadge};

const PANEL_WIDTH: usize = 48;

pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    render_printer(&mut out, &snapshot.printer);
    out.push('\n');
    render_scanner(&mut out, &snapshot.scanner);
    out.push_str("\nType `logout` to unpair this computer.\n");
    out
}

fn heading(out: &mut String, kind: DeviceKind, badge: ReadinessBadge) {
    let badge = format!("[{}]", badge.label());
    let pad = PANEL_WIDTH.saturating_sub(kind.title().len() + badge.len()).max(1);
    let _ = writeln!(out, "{}{}{badge}", kind.title(), " ".repeat(pad));
}

fn render_printer(out: &mut String, printer: &PrinterSnapshot) {
    heading(out, DeviceKind::Printer, printer.badge);
    let _ = writeln!(out, "  Input:  {}", printer.input);
    if let Some(status) = &printer.status {
        let _ = writeln!(out, "  Status: {status}");
    }
}

fn render_scanner(out: &mut String, scanner: &ScannerSnapshot) {
    heading(out, DeviceKind::Scanner, scanner.badge);
    if let Some(status) = &scanner.status {
        let _ = writeln!(out, "  Status: {status}");
    }
    out.push_str("  Scan log:\n");
    if scanner.log.is_empty() {
        out.push_str("    (no scans yet)\n");
    }
    for line in &scanner.log {
        let _ = writeln!(out, "    {line}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

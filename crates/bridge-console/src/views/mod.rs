//! Plain-text rendering of the shell's current view.
//!
//! Every renderer is a pure function from a snapshot to a `String`, so the
//! tests below never need a terminal.  [`render_shell`] picks the page for
//! the mounted [`View`] and wraps it in the common layout.

pub mod dashboard;
pub mod layout;
pub mod pairing;

use bridge_client::application::shell::{AppShell, View};

/// Renders the whole screen for the shell's current route and view.
pub fn render_shell(shell: &AppShell) -> String {
    let page = match shell.view() {
        Some(View::Pairing(form)) => pairing::render(form, &shell.auth_snapshot()),
        Some(View::Dashboard(dashboard)) => dashboard::render(&dashboard.snapshot()),
        Some(View::Placeholder(title)) => layout::placeholder(title),
        Some(View::NotFound(path)) => layout::not_found(path),
        None => String::new(),
    };
    let indicator = shell.dashboard().map(|d| d.is_realtime_connected());
    layout::render(shell.current_route(), indicator, &page)
}

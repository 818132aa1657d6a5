//! Route table and authentication guards for the app shell.
//!
//! Routing is split in two halves.  This module is the pure half: it turns a
//! URL-style path into a [`Route`] and decides, given the current
//! [`AuthPhase`], whether that route renders or redirects.  The stateful half
//! (mounting and unmounting views) lives in the client crate's `AppShell`.
//!
//! # Guards
//!
//! | Route        | NeedsPairing          | Authenticated          |
//! |--------------|-----------------------|------------------------|
//! | `/`          | redirect `/pairing`   | redirect `/dashboard`  |
//! | `/dashboard` | redirect `/pairing`   | render                 |
//! | `/pairing`   | render                | redirect `/`           |
//! | others       | render                | render                 |

use std::fmt;

/// The two states of the routing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    NeedsPairing,
    Authenticated,
}

impl AuthPhase {
    /// Derives the phase from whether a session credential exists.
    pub fn from_credential_present(present: bool) -> Self {
        if present {
            AuthPhase::Authenticated
        } else {
            AuthPhase::NeedsPairing
        }
    }
}

/// Every path the shell knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Dashboard,
    Pairing,
    Scan,
    ScanNew,
    ScanHistory,
    Printer,
    Package,
    NotFound(String),
}

/// Outcome of resolving a route against the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    /// Parses a path.  Trailing slashes, query strings and fragments are
    /// ignored; an empty path is the index.
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        match path {
            "" => Route::Index,
            "/dashboard" => Route::Dashboard,
            "/pairing" => Route::Pairing,
            "/scan" => Route::Scan,
            "/scan/new" => Route::ScanNew,
            "/scan/history" => Route::ScanHistory,
            "/printer" => Route::Printer,
            "/package" => Route::Package,
            other => Route::NotFound(other.to_string()),
        }
    }

    /// Canonical path of this route.
    pub fn path(&self) -> &str {
        match self {
            Route::Index => "/",
            Route::Dashboard => "/dashboard",
            Route::Pairing => "/pairing",
            Route::Scan => "/scan",
            Route::ScanNew => "/scan/new",
            Route::ScanHistory => "/scan/history",
            Route::Printer => "/printer",
            Route::Package => "/package",
            Route::NotFound(p) => p,
        }
    }

    /// Title shown for routes that only render a placeholder page.
    pub fn placeholder_title(&self) -> Option<&'static str> {
        match self {
            Route::Scan => Some("Scan"),
            Route::ScanNew => Some("New scan"),
            Route::ScanHistory => Some("Scan history"),
            Route::Printer => Some("Printer"),
            Route::Package => Some("Package"),
            _ => None,
        }
    }

    /// Applies the authentication guards.
    pub fn resolve(self, phase: AuthPhase) -> Navigation {
        match (self, phase) {
            (Route::Index, AuthPhase::NeedsPairing) => Navigation::Redirect(Route::Pairing),
            (Route::Index, AuthPhase::Authenticated) => Navigation::Redirect(Route::Dashboard),
            (Route::Dashboard, AuthPhase::NeedsPairing) => Navigation::Redirect(Route::Pairing),
            (Route::Pairing, AuthPhase::Authenticated) => Navigation::Redirect(Route::Index),
            (route, _) => Navigation::Render(route),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ── Sidebar navigation ────────────────────────────────────────────────────────

/// One entry of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub path: &'static str,
    pub children: Vec<NavItem>,
}

impl NavItem {
    fn leaf(title: &'static str, path: &'static str) -> Self {
        Self {
            title,
            path,
            children: Vec::new(),
        }
    }

    /// Whether this item should be highlighted for `current_path`.
    ///
    /// Groups are active for any path under their prefix; leaves only for an
    /// exact match.
    pub fn is_active(&self, current_path: &str) -> bool {
        if self.children.is_empty() {
            current_path == self.path
        } else {
            current_path == self.path || current_path.starts_with(&format!("{}/", self.path))
        }
    }
}

/// The sidebar menu shown by the common layout.
pub fn sidebar() -> Vec<NavItem> {
    vec![
        NavItem::leaf("Home", "/"),
        NavItem {
            title: "Scan",
            path: "/scan",
            children: vec![
                NavItem::leaf("New scan", "/scan/new"),
                NavItem::leaf("Scan history", "/scan/history"),
            ],
        },
        NavItem::leaf("Printer", "/printer"),
        NavItem::leaf("Package", "/package"),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

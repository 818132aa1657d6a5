//! AppShell: routing and view lifecycle.
//!
//! The shell holds the current [`Route`] and the mounted [`View`].  Every
//! navigation:
//!
//! 1. parses the path into a [`Route`],
//! 2. resolves it against the current [`AuthPhase`], following redirects
//!    (at most [`MAX_REDIRECTS`] of them),
//! 3. drops the previous view, which cancels its polls and realtime
//!    subscriptions,
//! 4. mounts the view for the final route.
//!
//! The shell is also where user actions that change the route live: a
//! successful pairing submit goes to `/`, and logout goes to `/pairing`.

use bridge_core::{AuthPhase, Navigation, Route};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::auth::{AuthService, AuthSnapshot};
use crate::application::dashboard::{Dashboard, DashboardServices, DashboardSettings};
use crate::application::pairing_form::PairingForm;

/// Redirect hops followed by one navigation before giving up.
pub const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("too many redirects while navigating to {path}")]
    RedirectLoop { path: String },
}

/// The mounted view for the current route.
#[derive(Debug)]
pub enum View {
    Pairing(PairingForm),
    Dashboard(Box<Dashboard>),
    /// A route that only shows its title.
    Placeholder(&'static str),
    NotFound(String),
}

pub struct AppShell {
    auth: AuthService,
    services: DashboardServices,
    settings: DashboardSettings,
    route: Route,
    view: Option<View>,
}

impl AppShell {
    /// Creates a shell with nothing mounted yet.  Call
    /// [`navigate`](Self::navigate) to show the first view.
    pub fn new(
        auth: AuthService,
        services: DashboardServices,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            auth,
            services,
            settings,
            route: Route::Index,
            view: None,
        }
    }

    /// Navigates to `path`, following guard redirects.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::RedirectLoop`] if more than [`MAX_REDIRECTS`]
    /// redirects are needed.  The current view is left mounted in that case.
    pub fn navigate(&mut self, path: &str) -> Result<&Route, ShellError> {
        let mut route = Route::parse(path);

        for _ in 0..=MAX_REDIRECTS {
            match route.resolve(self.auth.phase()) {
                Navigation::Redirect(next) => {
                    debug!(to = %next, "redirect");
                    route = next;
                }
                Navigation::Render(target) => {
                    // Unmount before mounting so the old view's polls and
                    // subscriptions are gone first.
                    self.view = None;
                    self.view = Some(self.mount(&target));
                    info!(route = %target, "navigated");
                    self.route = target;
                    return Ok(&self.route);
                }
            }
        }

        Err(ShellError::RedirectLoop {
            path: path.to_string(),
        })
    }

    /// Re-mounts the current route, restarting its polls.
    pub fn refresh(&mut self) -> Result<&Route, ShellError> {
        let path = self.route.path().to_string();
        self.navigate(&path)
    }

    fn mount(&self, route: &Route) -> View {
        match route {
            Route::Pairing => View::Pairing(PairingForm::new()),
            Route::Index | Route::Dashboard => match self.auth.session_token() {
                Some(token) => View::Dashboard(Box::new(Dashboard::mount(
                    &self.services,
                    token,
                    &self.settings,
                ))),
                None => View::Pairing(PairingForm::new()),
            },
            Route::NotFound(path) => View::NotFound(path.clone()),
            other => View::Placeholder(other.placeholder_title().unwrap_or("Page")),
        }
    }

    pub fn current_route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut View> {
        self.view.as_mut()
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn auth_snapshot(&self) -> AuthSnapshot {
        self.auth.snapshot()
    }

    pub fn phase(&self) -> AuthPhase {
        self.auth.phase()
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.view {
            Some(View::Dashboard(d)) => Some(d.as_ref()),
            _ => None,
        }
    }

    pub fn dashboard_mut(&mut self) -> Option<&mut Dashboard> {
        match &mut self.view {
            Some(View::Dashboard(d)) => Some(d.as_mut()),
            _ => None,
        }
    }

    /// Types into the pairing field.  Returns `false` if the pairing page is
    /// not shown.
    pub fn set_pairing_code(&mut self, input: &str) -> bool {
        match &mut self.view {
            Some(View::Pairing(form)) => {
                form.set_code(input);
                true
            }
            _ => false,
        }
    }

    pub async fn request_pairing_code(&mut self) {
        self.auth.start_pairing().await;
    }

    /// Submits the code in the pairing field and navigates home on success.
    ///
    /// Returns `true` when pairing succeeded.
    pub async fn submit_pairing_code(&mut self) -> Result<bool, ShellError> {
        let code = match &self.view {
            Some(View::Pairing(form)) => form.code().to_string(),
            _ => String::new(),
        };
        if !self.auth.submit_pairing_code(&code).await {
            return Ok(false);
        }
        if let Some(View::Pairing(form)) = &mut self.view {
            form.clear();
        }
        self.navigate("/")?;
        Ok(true)
    }

    /// Logs out and shows the pairing page.
    pub fn logout(&mut self) -> Result<&Route, ShellError> {
        self.auth.logout();
        self.navigate(Route::Pairing.path())
    }
}

impl std::fmt::Debug for AppShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppShell")
            .field("route", &self.route)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

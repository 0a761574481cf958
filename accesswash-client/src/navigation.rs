//! Navigation and route guarding
//!
//! Portal pages live under `/{tenant}/...`; the unauthenticated flows live
//! under `/{tenant}/auth/...`. The API client never knows how the host
//! application changes pages, so it reports redirects to a [`Navigator`].
//!
//! # Guard rules
//!
//! ```text
//! not signed in, regular page  -> /{tenant}/auth/login
//! signed in,     /auth/ page   -> /{tenant}
//! otherwise                    -> allow
//! ```

use accesswash_shared::tenant::TenantSlug;
use std::sync::Mutex;

/// Receives redirects requested by the client
pub trait Navigator: Send + Sync {
    /// Moves the host application to `path`
    fn navigate(&self, path: &str);
}

/// Navigator that only logs the redirect
///
/// Suitable for headless use where there is no page to change.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }
}

/// Navigator that records every redirect in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths navigated to so far
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    /// Most recent path
    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}

/// Outcome of the route guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested page
    Allow,

    /// Send the visitor elsewhere
    Redirect(String),
}

/// Whether `path` belongs to the unauthenticated flows
pub fn is_auth_page(path: &str) -> bool {
    path.contains("/auth/")
}

/// Decides whether a visitor may see `path`
pub fn guard_route(tenant: &TenantSlug, path: &str, is_authenticated: bool) -> RouteDecision {
    match (is_authenticated, is_auth_page(path)) {
        (false, false) => RouteDecision::Redirect(tenant.login_path()),
        (true, true) => RouteDecision::Redirect(tenant.home_path()),
        _ => RouteDecision::Allow,
    }
}

//! Path routing and the sign-in guard for the portal pages.

use crate::auth::{AuthState, UserRole};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Root,
    Login,
    Doctor,
    Dashboard,
    HealthRecords,
    ConsentManagement,
    AuditLogs,
    EmergencyAccess,
    Notifications,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Root,
        Route::Login,
        Route::Doctor,
        Route::Dashboard,
        Route::HealthRecords,
        Route::ConsentManagement,
        Route::AuditLogs,
        Route::EmergencyAccess,
        Route::Notifications,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Doctor => "/doctor",
            Route::Dashboard => "/dashboard",
            Route::HealthRecords => "/health-records",
            Route::ConsentManagement => "/consent-management",
            Route::AuditLogs => "/audit-logs",
            Route::EmergencyAccess => "/emergency-access",
            Route::Notifications => "/notifications",
        }
    }

    /// Match a request path, ignoring a trailing slash and any query string.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    /// Pages that need a signed-in user. The doctor flow signs in on its own first step.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Route::Root | Route::Login | Route::Doctor)
    }

    /// Landing page for a role.
    pub fn home(role: UserRole) -> Route {
        match role {
            UserRole::Doctor => Route::Doctor,
            UserRole::Patient | UserRole::Admin => Route::Dashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "route", rename_all = "snake_case")]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
    NotFound,
}

/// Decide what `path` shows for the given sign-in state.
///
/// # Returns
///
/// [`RouteDecision::NotFound`] for unknown paths. `/` always redirects, to the role's home
/// page or to `/login`. Guarded pages redirect to `/login` when signed out. Everything else
/// renders.
pub fn resolve(path: &str, auth: &AuthState) -> RouteDecision {
    let Some(route) = Route::parse(path) else {
        return RouteDecision::NotFound;
    };
    let role = auth.role.filter(|_| auth.is_authenticated);

    match route {
        Route::Root => match role {
            Some(role) => RouteDecision::Redirect(Route::home(role)),
            None => RouteDecision::Redirect(Route::Login),
        },
        r if r.requires_auth() && role.is_none() => RouteDecision::Redirect(Route::Login),
        r => RouteDecision::Render(r),
    }
}

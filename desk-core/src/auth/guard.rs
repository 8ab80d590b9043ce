//! Access Guard
//!
//! Maps the current session state and a route's requirement to a rendering
//! decision. While a persisted credential is still being validated the guard
//! answers `Pending` so protected content is neither shown nor redirected
//! away from prematurely.

use tokio::sync::watch;

use shared::models::Role;

use super::session::{SessionState, SessionStore};

/// Access level a route demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequirement {
    Public,
    Authenticated,
    AdminOnly,
}

/// What the caller should render for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    RedirectLogin,
    RedirectForbidden,
    /// Session still resolving; show a neutral loading state.
    Pending,
}

/// Requirement for a route path. Unknown paths are public; they fall through
/// to the caller's not-found handling without a sign-in detour.
pub fn route_requirement(path: &str) -> RouteRequirement {
    match path {
        "/login" | "/signup" => RouteRequirement::Public,
        "/dashboard" | "/reports" | "/transactions" => RouteRequirement::Authenticated,
        "/maintenance" => RouteRequirement::AdminOnly,
        p if p.starts_with("/maintenance/") => RouteRequirement::AdminOnly,
        _ => RouteRequirement::Public,
    }
}

/// Pure decision function over state and requirement.
pub fn evaluate(state: &SessionState, requirement: RouteRequirement) -> GuardDecision {
    match (state, requirement) {
        (_, RouteRequirement::Public) => GuardDecision::Render,
        (SessionState::Resolving, _) => GuardDecision::Pending,
        (SessionState::SignedOut, _) => GuardDecision::RedirectLogin,
        (SessionState::SignedIn { role, .. }, RouteRequirement::AdminOnly) => {
            if role.is_admin() {
                GuardDecision::Render
            } else {
                GuardDecision::RedirectForbidden
            }
        }
        (SessionState::SignedIn { .. }, RouteRequirement::Authenticated) => GuardDecision::Render,
    }
}

/// Live guard bound to a session store.
pub struct AccessGuard {
    state: watch::Receiver<SessionState>,
}

impl AccessGuard {
    pub fn new(session: &SessionStore) -> Self {
        Self {
            state: session.subscribe(),
        }
    }

    /// Decision for a route path against the current session state.
    pub fn decide(&self, path: &str) -> GuardDecision {
        evaluate(&self.state.borrow(), route_requirement(path))
    }

    pub fn current_role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    /// Wait until the session state changes; the caller then re-decides.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

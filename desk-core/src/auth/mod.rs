//! Authentication
//!
//! Session lifecycle (sign-in, sign-up, sign-out, restore), the durable
//! on-disk credential, and the route access guard.

pub mod credential;
pub mod guard;
pub mod session;

pub use credential::StoredSession;
pub use guard::{AccessGuard, GuardDecision, RouteRequirement, route_requirement};
pub use session::{SessionState, SessionStore};

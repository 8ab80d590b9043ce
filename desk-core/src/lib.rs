//! MemberDesk Application Core
//!
//! Session/role-gated access control plus the membership and payment record
//! services of an internal membership administration tool. Screens (login,
//! dashboard, reports, maintenance, transactions) sit on top of this crate;
//! the persistence engine is an external store reached over the network.
//!
//! # Module structure
//!
//! ```text
//! desk-core/src/
//! ├── core/        # configuration, application context
//! ├── auth/        # session store, durable credential, access guard
//! ├── store/       # remote store client (REST and in-memory)
//! ├── repository/  # membership / payment / dashboard operations
//! ├── validation   # pure form validation rules
//! ├── search       # client-side search over fetched memberships
//! └── utils/       # logging
//! ```
//!
//! All store and session operations are asynchronous and non-retrying; a
//! failed operation surfaces exactly once to the caller as a typed error.

pub mod auth;
pub mod core;
pub mod repository;
pub mod search;
pub mod store;
pub mod utils;
pub mod validation;

// Re-export public types
pub use auth::{AccessGuard, GuardDecision, RouteRequirement, SessionState, SessionStore};
pub use crate::core::{AppContext, Config, setup_environment};
pub use repository::{
    DashboardStats, MembershipRepository, PaymentRepository, RepoError, RepoResult,
};
pub use store::{AuthApi, AuthError, MemoryStore, RestStore, StoreClient, StoreError};
pub use validation::ValidationError;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured auth events under a dedicated target
#[macro_export]
macro_rules! security_log {
    ($event:expr) => {
        tracing::info!(target: "security", event = $event);
    };
    ($event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
}

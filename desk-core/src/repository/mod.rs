//! Repositories
//!
//! Store-backed operations over memberships and payments, plus dashboard
//! counts. Mutating operations require the admin role; reads are available
//! to any signed-in user.

pub mod membership;
pub mod payment;
pub mod stats;

pub use membership::MembershipRepository;
pub use payment::PaymentRepository;
pub use stats::DashboardStats;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use shared::models::Role;

use crate::security_log;
use crate::store::StoreError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    NotFound(String),

    /// Caller's role does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("malformed record: {0}")]
    Decode(String),
}

impl From<StoreError> for RepoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => RepoError::NotFound("no matching record".into()),
            other => RepoError::Store(other),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Gate a mutating operation on the admin role.
pub(crate) fn require_admin(role: Role, action: &str) -> RepoResult<()> {
    if role.is_admin() {
        Ok(())
    } else {
        security_log!("forbidden", action = action, role = role.as_str());
        Err(RepoError::Forbidden(format!(
            "admin role required to {action}"
        )))
    }
}

/// Decode a store row into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(row: Value) -> RepoResult<T> {
    serde_json::from_value(row).map_err(|e| RepoError::Decode(e.to_string()))
}

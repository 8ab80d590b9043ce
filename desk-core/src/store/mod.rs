//! Remote Store Client
//!
//! The persistence engine is an external service reached over the network.
//! This module defines the query/insert/update surface the core consumes
//! ([`StoreClient`]) and the authentication surface ([`AuthApi`]), plus two
//! implementations: [`RestStore`] speaking a PostgREST-style protocol, and
//! [`MemoryStore`] backing the test suite.

pub mod memory;
pub mod rest;

// Re-exports
pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use shared::models::Identity;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Single-row query matched nothing. Kept distinct from transport
    /// failures so callers can report "not found" rather than "error".
    #[error("no matching row")]
    NotFound,

    /// Single-row query matched more than one row.
    #[error("expected exactly one row, found {0}")]
    MultipleRows(usize),

    /// The store rejected the request (constraint, permission, bad payload).
    #[error("{0}")]
    Rejected(String),

    /// Network-level failure before a store response was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// A row came back in a shape that cannot be decoded.
    #[error("malformed row: {0}")]
    Decode(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Ordering direction for [`QuerySpec::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

/// Declarative query passed to [`StoreClient::select`].
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Column projection. Embedded join resources use the
    /// `related(col_a,col_b)` form. `None` selects every column.
    pub columns: Option<String>,
    /// Equality filter `(column, value)`.
    pub filter: Option<(String, String)>,
    /// Ordering `(column, direction)`.
    pub order: Option<(String, OrderDir)>,
}

impl QuerySpec {
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some((column.into(), value.into()));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), OrderDir::Desc));
        self
    }
}

/// Query/insert/update surface of the remote store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Run a query, returning the ordered rows.
    async fn select(&self, table: &str, spec: QuerySpec) -> StoreResult<Vec<Value>>;

    /// Like [`select`](StoreClient::select), expecting exactly one row.
    /// Zero rows is [`StoreError::NotFound`]; more than one is
    /// [`StoreError::MultipleRows`].
    async fn select_one(&self, table: &str, spec: QuerySpec) -> StoreResult<Value> {
        let mut rows = self.select(table, spec).await?;
        match rows.len() {
            0 => Err(StoreError::NotFound),
            1 => Ok(rows.remove(0)),
            n => Err(StoreError::MultipleRows(n)),
        }
    }

    /// Insert a row. The store assigns system columns (id, created_at,
    /// generated numbers) and returns the full inserted row.
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value>;

    /// Update the row matching `id` with the given field map.
    async fn update(&self, table: &str, id: &str, fields: Value) -> StoreResult<()>;

    /// Count-only query; no rows are transferred.
    async fn count(&self, table: &str) -> StoreResult<u64>;
}

/// Session credential handed out by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub identity: Identity,
}

/// Sign-in / sign-up failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Password must be at least 6 characters.")]
    WeakPassword,

    #[error("auth service error: {0}")]
    Service(String),
}

/// Authentication surface of the remote store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Invalidate the token store-side. Best-effort; local sign-out proceeds
    /// even when this fails.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

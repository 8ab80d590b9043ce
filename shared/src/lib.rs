//! Shared types for MemberDesk
//!
//! Domain models used across the application core and any frontend crate:
//! identities and roles, membership and payment records, and the form
//! payloads that feed them.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

//! Identity and Role

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated identity, owned by the session store.
///
/// Created on sign-in/sign-up, destroyed on sign-out or token expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Privilege level derived from an authenticated identity.
///
/// Resolved once per identity change against the `user_roles` table and
/// cached on the session state. A missing or unreadable row resolves to
/// [`Role::Member`] (fail-closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Parse a role column value. Anything that is not exactly `"admin"`
    /// maps to the least-privileged role.
    pub fn from_store(value: &str) -> Self {
        if value == "admin" {
            Role::Admin
        } else {
            Role::Member
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

//! Durable Session Credential
//!
//! The signed-in session is persisted to a JSON file in the working
//! directory so the user stays signed in across restarts. The file holds
//! the access token plus the identity it was issued to; role is never
//! persisted and is re-resolved from the store on restore.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared::models::Identity;

/// Session file name under the working directory.
pub const SESSION_FILE: &str = "Session.json";

/// Persisted session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub identity: Identity,
    pub saved_at: String,
}

impl StoredSession {
    pub fn new(access_token: String, identity: Identity) -> Self {
        Self {
            access_token,
            identity,
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    fn path(dir: &Path) -> PathBuf {
        dir.join(SESSION_FILE)
    }

    /// Load the stored session, if any. A missing file is `Ok(None)`; an
    /// unreadable or malformed file is an error so the caller can discard it.
    pub fn load(dir: &Path) -> io::Result<Option<Self>> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(session))
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(Self::path(dir), content)
    }

    pub fn delete(dir: &Path) -> io::Result<()> {
        let path = Self::path(dir);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn exists(dir: &Path) -> bool {
        Self::path(dir).exists()
    }

    /// Whether the stored token's expiry claim has passed. A token whose
    /// expiry cannot be read is treated as expired.
    pub fn is_expired(&self) -> bool {
        match token_expiry(&self.access_token) {
            Some(exp) => exp <= Utc::now().timestamp(),
            None => true,
        }
    }
}

/// Read the `exp` claim out of a token without verifying the signature.
/// Verification belongs to the store; locally the claim only decides
/// whether a restore attempt is worth making.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
        }
    }

    #[test]
    fn save_load_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let identity = identity();
        let session = StoredSession::new("token-abc".into(), identity.clone());

        assert!(!StoredSession::exists(dir.path()));
        session.save(dir.path()).unwrap();
        assert!(StoredSession::exists(dir.path()));

        let loaded = StoredSession::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.access_token, "token-abc");
        assert_eq!(loaded.identity, identity);

        StoredSession::delete(dir.path()).unwrap();
        assert!(!StoredSession::exists(dir.path()));
        assert!(StoredSession::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        assert!(StoredSession::load(dir.path()).is_err());
    }

    #[test]
    fn expiry_follows_the_token_claim() {
        let identity = identity();
        let future = Utc::now().timestamp() + 3600;
        let past = Utc::now().timestamp() - 3600;

        let live = StoredSession::new(MemoryStore::mint_token(&identity, future), identity.clone());
        assert!(!live.is_expired());

        let stale = StoredSession::new(MemoryStore::mint_token(&identity, past), identity.clone());
        assert!(stale.is_expired());

        let opaque = StoredSession::new("not-a-jwt".into(), identity);
        assert!(opaque.is_expired());
    }
}

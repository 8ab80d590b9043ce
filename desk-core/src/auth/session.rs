//! Session Store
//!
//! Single source of truth for the signed-in session. State transitions are
//! published through a watch channel so guards and screens observe changes
//! without polling. Role is resolved from the store at sign-in and restore,
//! failing closed to the non-privileged role.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::warn;

use shared::models::{Identity, Role};

use crate::security_log;
use crate::store::{AuthApi, AuthError, AuthSession, QuerySpec, StoreClient, StoreError};

use super::credential::StoredSession;

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A persisted credential is being validated; neither signed in nor out.
    Resolving,
    SignedOut,
    SignedIn { identity: Identity, role: Role },
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::SignedIn { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionState::SignedIn { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::SignedIn { .. })
    }
}

type TokenHook = Box<dyn Fn(Option<String>) + Send + Sync>;

/// Session lifecycle and state publication.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn StoreClient>,
    work_dir: PathBuf,
    state: watch::Sender<SessionState>,
    access_token: RwLock<Option<String>>,
    on_token: Option<TokenHook>,
}

impl SessionStore {
    /// The initial state is `Resolving` when a persisted credential exists
    /// (callers should run [`restore`](Self::restore)), `SignedOut` otherwise.
    pub fn new(auth: Arc<dyn AuthApi>, store: Arc<dyn StoreClient>, work_dir: PathBuf) -> Self {
        let initial = if StoredSession::exists(&work_dir) {
            SessionState::Resolving
        } else {
            SessionState::SignedOut
        };
        let (state, _) = watch::channel(initial);
        Self {
            auth,
            store,
            work_dir,
            state,
            access_token: RwLock::new(None),
            on_token: None,
        }
    }

    /// Register a hook invoked whenever the access token changes, used to
    /// keep the store client's bearer token in step with the session.
    pub fn with_token_hook(mut self, hook: impl Fn(Option<String>) + Send + Sync + 'static) -> Self {
        self.on_token = Some(Box::new(hook));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    fn set_token(&self, token: Option<String>) {
        *self.access_token.write() = token.clone();
        if let Some(hook) = &self.on_token {
            hook(token);
        }
    }

    /// Sign in with email and password. On success the credential is
    /// persisted and the state moves to `SignedIn`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let session = self.auth.sign_in(email.trim(), password).await?;
        Ok(self.install(session).await)
    }

    /// Create an account and sign in. The password length rule is applied
    /// locally first so the store is never consulted for a password that
    /// cannot be accepted.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Identity, AuthError> {
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }
        let session = self
            .auth
            .sign_up(email.trim(), password, full_name.trim())
            .await?;
        Ok(self.install(session).await)
    }

    async fn install(&self, session: AuthSession) -> Identity {
        let AuthSession {
            access_token,
            identity,
        } = session;

        self.set_token(Some(access_token.clone()));
        let role = resolve_role(self.store.as_ref(), &identity).await;

        if let Err(e) = StoredSession::new(access_token, identity.clone()).save(&self.work_dir) {
            warn!(error = %e, "failed to persist session credential");
        }

        security_log!(
            "signed_in",
            user_id = %identity.id,
            email = %identity.email,
            role = role.as_str(),
        );
        self.state.send_replace(SessionState::SignedIn {
            identity: identity.clone(),
            role,
        });
        identity
    }

    /// Sign out. The store-side invalidation is best-effort; local state is
    /// cleared regardless so the user is never stuck signed in.
    pub async fn sign_out(&self) {
        let token = self.access_token.read().clone();
        if let Some(token) = token
            && let Err(e) = self.auth.sign_out(&token).await
        {
            warn!(error = %e, "remote sign-out failed, clearing local session anyway");
        }

        if let Err(e) = StoredSession::delete(&self.work_dir) {
            warn!(error = %e, "failed to delete session credential");
        }
        self.set_token(None);
        security_log!("signed_out");
        self.state.send_replace(SessionState::SignedOut);
    }

    /// Restore the session from the persisted credential. Returns whether a
    /// session was restored. Unreadable or expired credentials are deleted
    /// and the state settles on `SignedOut`.
    pub async fn restore(&self) -> bool {
        let stored = match StoredSession::load(&self.work_dir) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                self.state.send_replace(SessionState::SignedOut);
                return false;
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable session credential");
                let _ = StoredSession::delete(&self.work_dir);
                self.state.send_replace(SessionState::SignedOut);
                return false;
            }
        };

        if stored.is_expired() {
            security_log!("session_expired", email = %stored.identity.email);
            let _ = StoredSession::delete(&self.work_dir);
            self.state.send_replace(SessionState::SignedOut);
            return false;
        }

        self.state.send_replace(SessionState::Resolving);
        self.set_token(Some(stored.access_token.clone()));
        let role = resolve_role(self.store.as_ref(), &stored.identity).await;

        security_log!(
            "session_restored",
            user_id = %stored.identity.id,
            role = role.as_str(),
        );
        self.state.send_replace(SessionState::SignedIn {
            identity: stored.identity,
            role,
        });
        true
    }
}

/// Resolve the user's role from the store. Fails closed: no role row, an
/// ambiguous result, or any store failure yields the non-privileged role.
pub async fn resolve_role(store: &dyn StoreClient, identity: &Identity) -> Role {
    let spec = QuerySpec::default()
        .columns("role")
        .eq("user_id", identity.id.to_string());
    match store.select_one("user_roles", spec).await {
        Ok(row) => Role::from_store(row.get("role").and_then(|v| v.as_str()).unwrap_or("")),
        Err(StoreError::NotFound) => Role::Member,
        Err(e) => {
            warn!(error = %e, user_id = %identity.id, "role lookup failed, defaulting to member");
            Role::Member
        }
    }
}

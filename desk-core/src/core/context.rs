//! Application Context
//!
//! Wires the store client, session store and repositories together. Screens
//! hold one `AppContext` and reach everything through it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth::{AccessGuard, SessionStore};
use crate::core::config::Config;
use crate::repository::{DashboardStats, MembershipRepository, PaymentRepository, RepoResult};
use crate::store::{AuthApi, RestStore, StoreClient};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn StoreClient>,
    pub session: Arc<SessionStore>,
    pub memberships: MembershipRepository,
    pub payments: PaymentRepository,
}

impl AppContext {
    /// Build the context against the configured remote store and attempt to
    /// restore a persisted session.
    pub async fn initialize(config: Config) -> Self {
        let rest = Arc::new(RestStore::new(
            config.store_url.clone(),
            config.store_anon_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        ));

        // Session token changes propagate into the store client's bearer slot.
        let token_target = rest.clone();
        let session = SessionStore::new(
            rest.clone(),
            rest.clone(),
            PathBuf::from(&config.work_dir),
        )
        .with_token_hook(move |token| token_target.set_access_token(token));

        let context = Self::assemble(config, rest, Arc::new(session));
        context.session.restore().await;
        info!(environment = %context.config.environment, "application context ready");
        context
    }

    /// Build the context over explicit backends. Used by tests to run the
    /// full session and repository stack against the in-memory store.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn StoreClient>,
        auth: Arc<dyn AuthApi>,
    ) -> Self {
        let session = SessionStore::new(auth, store.clone(), PathBuf::from(&config.work_dir));
        Self::assemble(config, store, Arc::new(session))
    }

    fn assemble(config: Config, store: Arc<dyn StoreClient>, session: Arc<SessionStore>) -> Self {
        Self {
            memberships: MembershipRepository::new(store.clone()),
            payments: PaymentRepository::new(store.clone()),
            config,
            store,
            session,
        }
    }

    /// Access guard observing this context's session.
    pub fn guard(&self) -> AccessGuard {
        AccessGuard::new(&self.session)
    }

    /// Record counts for the dashboard.
    pub async fn dashboard_stats(&self) -> RepoResult<DashboardStats> {
        Ok(DashboardStats::fetch(self.store.as_ref()).await?)
    }
}

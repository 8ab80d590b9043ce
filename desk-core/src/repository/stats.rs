//! Dashboard Statistics

use serde::Serialize;

use crate::store::{StoreClient, StoreResult};

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub memberships: u64,
    pub payments: u64,
}

impl DashboardStats {
    /// Fetch both counts concurrently.
    pub async fn fetch(store: &dyn StoreClient) -> StoreResult<Self> {
        let (memberships, payments) =
            tokio::join!(store.count("memberships"), store.count("payments"));
        Ok(Self {
            memberships: memberships?,
            payments: payments?,
        })
    }
}

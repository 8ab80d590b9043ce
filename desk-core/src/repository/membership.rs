//! Membership Repository

use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared::models::{
    DurationFilter, Membership, MembershipDraft, MembershipOption, Role,
};

use crate::store::{QuerySpec, StoreClient, StoreError};

use super::{RepoError, RepoResult, decode, require_admin};

const TABLE: &str = "memberships";

/// Membership create/update/lookup/list operations.
pub struct MembershipRepository {
    store: Arc<dyn StoreClient>,
}

impl MembershipRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Create a membership. The store assigns the id, membership number and
    /// creation timestamp; the returned record carries all of them.
    pub async fn create(
        &self,
        role: Role,
        draft: MembershipDraft,
        created_by: Uuid,
    ) -> RepoResult<Membership> {
        require_admin(role, "create a membership")?;
        let draft = draft.trimmed();

        let row = self
            .store
            .insert(
                TABLE,
                json!({
                    "member_name": draft.member_name,
                    "email": draft.email,
                    "phone": draft.phone,
                    "address": draft.address,
                    "duration": draft.duration,
                    "is_active": draft.is_active,
                    "created_by": created_by,
                }),
            )
            .await?;
        let membership: Membership = decode(row)?;
        debug!(number = %membership.membership_number, "membership created");
        Ok(membership)
    }

    /// Update the mutable fields of an existing membership. The number,
    /// creation timestamp and creator are never touched.
    pub async fn update(&self, role: Role, id: Uuid, draft: MembershipDraft) -> RepoResult<()> {
        require_admin(role, "update a membership")?;
        let draft = draft.trimmed();

        self.store
            .update(
                TABLE,
                &id.to_string(),
                json!({
                    "member_name": draft.member_name,
                    "email": draft.email,
                    "phone": draft.phone,
                    "address": draft.address,
                    "duration": draft.duration,
                    "is_active": draft.is_active,
                }),
            )
            .await?;
        Ok(())
    }

    /// Exact lookup by membership number. The number is trimmed first; a
    /// miss is reported with the number that was searched.
    pub async fn find_by_number(&self, number: &str) -> RepoResult<Membership> {
        let number = number.trim();
        let spec = QuerySpec::default().eq("membership_number", number);
        match self.store.select_one(TABLE, spec).await {
            Ok(row) => decode(row),
            Err(StoreError::NotFound) => Err(RepoError::NotFound(format!(
                "No membership found with number {number}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// List memberships newest first, optionally narrowed to one plan
    /// duration. The filter is applied store-side.
    pub async fn list_filtered(&self, filter: DurationFilter) -> RepoResult<Vec<Membership>> {
        let mut spec = QuerySpec::default().order_desc("created_at");
        if let DurationFilter::Only(duration) = filter {
            spec = spec.eq("duration", duration.as_str());
        }
        let rows = self.store.select(TABLE, spec).await?;
        rows.into_iter().map(decode).collect()
    }

    /// Lightweight projection for the payment form's membership selector.
    pub async fn list_options(&self) -> RepoResult<Vec<MembershipOption>> {
        let spec = QuerySpec::default()
            .columns("id,membership_number,member_name")
            .order_desc("created_at");
        let rows = self.store.select(TABLE, spec).await?;
        rows.into_iter().map(decode).collect()
    }

    pub async fn count(&self) -> RepoResult<u64> {
        Ok(self.store.count(TABLE).await?)
    }
}

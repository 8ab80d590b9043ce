//! Payment Repository

use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared::models::{PaymentInput, PaymentRecord, Role};

use crate::store::{QuerySpec, StoreClient};

use super::{RepoResult, decode, require_admin};

const TABLE: &str = "payments";

/// History rows carry the owning membership's number and name via an
/// embedded join.
const LIST_SELECT: &str = "*, memberships(membership_number,member_name)";

/// Payment record/list operations. Payments are append-only; there is no
/// update or delete.
pub struct PaymentRepository {
    store: Arc<dyn StoreClient>,
}

impl PaymentRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Record a payment against a membership.
    pub async fn create(
        &self,
        role: Role,
        input: PaymentInput,
        created_by: Uuid,
    ) -> RepoResult<PaymentRecord> {
        require_admin(role, "record a payment")?;

        let row = self
            .store
            .insert(
                TABLE,
                json!({
                    "membership_id": input.membership_id,
                    "amount": input.amount,
                    "payment_date": input.payment_date,
                    "payment_method": input.payment_method,
                    "notes": input.notes,
                    "created_by": created_by,
                }),
            )
            .await?;
        let payment = decode(row)?;
        debug!(membership_id = %input.membership_id, "payment recorded");
        Ok(PaymentRecord {
            payment,
            membership: None,
        })
    }

    /// Payment history, newest first, each row joined with its membership's
    /// number and name. A payment whose membership cannot be resolved still
    /// appears, with the join absent.
    pub async fn list(&self) -> RepoResult<Vec<PaymentRecord>> {
        let spec = QuerySpec::default()
            .columns(LIST_SELECT)
            .order_desc("created_at");
        let rows = self.store.select(TABLE, spec).await?;
        rows.into_iter().map(decode).collect()
    }

    pub async fn count(&self) -> RepoResult<u64> {
        Ok(self.store.count(TABLE).await?)
    }
}

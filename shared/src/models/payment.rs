//! Payment Model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::today_iso;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "bank transfer")]
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank transfer",
        }
    }
}

/// Payment record as stored. Never mutated or deleted once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Raw payment form state, before validation.
///
/// `membership_id` is the selector value; empty means nothing selected.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub membership_id: String,
    pub amount: String,
    pub payment_date: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

impl Default for PaymentDraft {
    /// Fresh form: cash, dated today, nothing else filled in.
    fn default() -> Self {
        Self {
            membership_id: String::new(),
            amount: String::new(),
            payment_date: today_iso(),
            payment_method: PaymentMethod::Cash,
            notes: String::new(),
        }
    }
}

/// Validated payment fields ready for submission.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub membership_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    /// Blank notes become `None`, never an empty string.
    pub notes: Option<String>,
}

/// Joined membership columns shown in the payment history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSummary {
    pub membership_number: String,
    pub member_name: String,
}

/// Payment joined with its owning membership for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(flatten)]
    pub payment: Payment,
    /// `None` when the referenced membership cannot be resolved; display
    /// falls back to [`PaymentRecord::MISSING`].
    #[serde(rename = "memberships")]
    pub membership: Option<MembershipSummary>,
}

impl PaymentRecord {
    /// Placeholder shown when the joined membership is missing.
    pub const MISSING: &'static str = "-";

    pub fn membership_number(&self) -> &str {
        self.membership
            .as_ref()
            .map(|m| m.membership_number.as_str())
            .unwrap_or(Self::MISSING)
    }

    pub fn member_name(&self) -> &str {
        self.membership
            .as_ref()
            .map(|m| m.member_name.as_str())
            .unwrap_or(Self::MISSING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_uses_store_column_values() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::BankTransfer).unwrap(),
            serde_json::json!("bank transfer")
        );
    }

    #[test]
    fn fresh_draft_is_cash_dated_today() {
        let draft = PaymentDraft::default();
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
        assert_eq!(draft.payment_date, today_iso());
        assert!(draft.membership_id.is_empty());
    }

    #[test]
    fn record_without_membership_renders_placeholder() {
        let record: PaymentRecord = serde_json::from_value(serde_json::json!({
            "id": "7b1c2a9e-0b6e-4f3a-9a68-2f6f3f1c1a10",
            "membership_id": "4e5a6b7c-8d9e-4f0a-b1c2-d3e4f5a6b7c8",
            "amount": "25.00",
            "payment_date": "2026-02-01",
            "payment_method": "cash",
            "notes": null,
            "created_at": "2026-02-01T10:00:00Z",
            "created_by": null,
            "memberships": null
        }))
        .unwrap();
        assert!(record.membership.is_none());
        assert_eq!(record.membership_number(), "-");
        assert_eq!(record.member_name(), "-");
    }
}

//! Membership Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership plan length.
///
/// The input shape restricts values to these three; free text never reaches
/// the validator or the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanDuration {
    #[serde(rename = "6 months")]
    SixMonths,
    #[serde(rename = "1 year")]
    OneYear,
    #[serde(rename = "2 years")]
    TwoYears,
}

impl PlanDuration {
    pub const ALL: [PlanDuration; 3] = [
        PlanDuration::SixMonths,
        PlanDuration::OneYear,
        PlanDuration::TwoYears,
    ];

    /// Store column value, e.g. `"6 months"`.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanDuration::SixMonths => "6 months",
            PlanDuration::OneYear => "1 year",
            PlanDuration::TwoYears => "2 years",
        }
    }
}

impl Default for PlanDuration {
    fn default() -> Self {
        PlanDuration::SixMonths
    }
}

/// Store-side equality filter over the plan duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationFilter {
    #[default]
    All,
    Only(PlanDuration),
}

/// Membership record as stored.
///
/// `id` and `membership_number` are assigned by the store at insert and are
/// never part of a create or update payload. `created_at` and `created_by`
/// are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub membership_number: String,
    pub member_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub duration: PlanDuration,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Mutable membership fields as entered in the add/update forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipDraft {
    pub member_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub duration: PlanDuration,
    pub is_active: bool,
}

impl MembershipDraft {
    /// Trim the free-text fields. Applied by the repositories before
    /// submission so stored records never carry stray whitespace.
    pub fn trimmed(mut self) -> Self {
        self.member_name = self.member_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.address = self.address.trim().to_string();
        self
    }
}

impl Default for MembershipDraft {
    fn default() -> Self {
        Self {
            member_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            duration: PlanDuration::default(),
            is_active: true,
        }
    }
}

/// Projection used to populate the payment form's membership selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipOption {
    pub id: Uuid,
    pub membership_number: String,
    pub member_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_uses_store_column_values() {
        assert_eq!(
            serde_json::to_value(PlanDuration::SixMonths).unwrap(),
            serde_json::json!("6 months")
        );
        let parsed: PlanDuration = serde_json::from_value(serde_json::json!("2 years")).unwrap();
        assert_eq!(parsed, PlanDuration::TwoYears);
    }

    #[test]
    fn draft_defaults_to_active() {
        let draft = MembershipDraft::default();
        assert!(draft.is_active);
        assert_eq!(draft.duration, PlanDuration::SixMonths);
    }

    #[test]
    fn trimmed_strips_all_text_fields() {
        let draft = MembershipDraft {
            member_name: "  Alice Smith ".into(),
            email: " alice@example.com ".into(),
            phone: " 5551234567 ".into(),
            address: " 1 Main St ".into(),
            ..Default::default()
        }
        .trimmed();
        assert_eq!(draft.member_name, "Alice Smith");
        assert_eq!(draft.email, "alice@example.com");
        assert_eq!(draft.phone, "5551234567");
        assert_eq!(draft.address, "1 Main St");
    }
}

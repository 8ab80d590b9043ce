//! Domain Models

pub mod identity;
pub mod membership;
pub mod payment;

// Re-exports
pub use identity::{Identity, Role};
pub use membership::{
    DurationFilter, Membership, MembershipDraft, MembershipOption, PlanDuration,
};
pub use payment::{
    MembershipSummary, Payment, PaymentDraft, PaymentInput, PaymentMethod, PaymentRecord,
};

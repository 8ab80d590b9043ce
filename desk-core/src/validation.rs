//! Form Validation
//!
//! Pure rules applied to form drafts before anything reaches a repository.
//! Fields are checked in display order and the first failure wins, so the
//! user always sees a single message matching the first offending field.

use rust_decimal::Decimal;
use thiserror::Error;

use shared::models::{MembershipDraft, MembershipOption, PaymentDraft, PaymentInput};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_NOTE_LEN: usize = 500;

/// A rejected form field, carrying the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Email shape check: one `@` with non-empty local part, and a domain
/// containing a dot with characters on both sides. No whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

/// Phone shape check: after stripping spaces, hyphens and parentheses, what
/// remains must be 7 to 15 ascii digits. A `+` prefix is not stripped, so
/// international notation is rejected.
pub fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    (7..=15).contains(&stripped.len()) && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Validate a membership form. Checks run in display order (name, email,
/// phone, address) and stop at the first failure.
pub fn validate_membership(draft: &MembershipDraft) -> Result<(), ValidationError> {
    let name = draft.member_name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("Member name is required."));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::new(format!(
            "Member name must be at most {MAX_NAME_LEN} characters."
        )));
    }

    let email = draft.email.trim();
    if email.len() > MAX_EMAIL_LEN || !is_valid_email(email) {
        return Err(ValidationError::new("Valid email is required."));
    }

    let phone = draft.phone.trim();
    if phone.len() > MAX_PHONE_LEN || !is_valid_phone(phone) {
        return Err(ValidationError::new("Valid phone number is required."));
    }

    let address = draft.address.trim();
    if address.is_empty() {
        return Err(ValidationError::new("Address is required."));
    }
    if address.len() > MAX_ADDRESS_LEN {
        return Err(ValidationError::new(format!(
            "Address must be at most {MAX_ADDRESS_LEN} characters."
        )));
    }

    Ok(())
}

/// Validate a payment form against the current membership options. Returns
/// the typed input ready for submission; blank notes become `None`.
pub fn validate_payment(
    draft: &PaymentDraft,
    options: &[MembershipOption],
) -> Result<PaymentInput, ValidationError> {
    let membership_id = draft.membership_id.trim();
    let amount = draft.amount.trim();
    let payment_date = draft.payment_date.trim();
    if membership_id.is_empty() || amount.is_empty() || payment_date.is_empty() {
        return Err(ValidationError::new(
            "Membership, amount, and date are required.",
        ));
    }

    let membership_id: uuid::Uuid = membership_id
        .parse()
        .map_err(|_| ValidationError::new("Please select a valid membership."))?;
    if !options.iter().any(|o| o.id == membership_id) {
        return Err(ValidationError::new("Please select a valid membership."));
    }

    let amount: Decimal = amount
        .parse()
        .map_err(|_| ValidationError::new("Amount must be a positive number."))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::new("Amount must be a positive number."));
    }

    let payment_date: chrono::NaiveDate = payment_date
        .parse()
        .map_err(|_| ValidationError::new("Valid payment date is required."))?;

    let notes = draft.notes.trim();
    if notes.len() > MAX_NOTE_LEN {
        return Err(ValidationError::new(format!(
            "Notes must be at most {MAX_NOTE_LEN} characters."
        )));
    }
    let notes = (!notes.is_empty()).then(|| notes.to_string());

    Ok(PaymentInput {
        membership_id,
        amount,
        payment_date,
        payment_method: draft.payment_method,
        notes,
    })
}

/// Validate the sign-up form fields.
pub fn validate_signup(
    full_name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if full_name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::new("All fields are required."));
    }
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::new("Valid email is required."));
    }
    if password.len() < 6 {
        return Err(ValidationError::new(
            "Password must be at least 6 characters.",
        ));
    }
    if password != confirm {
        return Err(ValidationError::new("Passwords do not match."));
    }
    Ok(())
}

//! Membership Search
//!
//! Client-side search over an already-fetched membership list. Matching is
//! case-insensitive substring over the number, name and email columns;
//! list order is preserved, so results stay newest first.

use shared::models::Membership;

/// Whether a membership matches the query. An empty or whitespace-only
/// query matches everything.
pub fn matches(membership: &Membership, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    membership.membership_number.to_lowercase().contains(&query)
        || membership.member_name.to_lowercase().contains(&query)
        || membership.email.to_lowercase().contains(&query)
}

/// Filter a membership list by query, preserving the input order.
pub fn filter_memberships<'a>(memberships: &'a [Membership], query: &str) -> Vec<&'a Membership> {
    memberships.iter().filter(|m| matches(m, query)).collect()
}

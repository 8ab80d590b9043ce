//! Membership repository tests against the in-memory store.

use std::sync::Arc;

use desk_core::repository::{MembershipRepository, RepoError};
use desk_core::search::filter_memberships;
use desk_core::store::MemoryStore;
use desk_core::StoreClient;
use shared::models::{DurationFilter, MembershipDraft, PlanDuration, Role};
use uuid::Uuid;

fn draft(name: &str, email: &str, duration: PlanDuration) -> MembershipDraft {
    MembershipDraft {
        member_name: name.into(),
        email: email.into(),
        phone: "5551234567".into(),
        address: "1 Main St".into(),
        duration,
        is_active: true,
    }
}

fn repo() -> (Arc<MemoryStore>, MembershipRepository) {
    let store = Arc::new(MemoryStore::new());
    let repo = MembershipRepository::new(store.clone());
    (store, repo)
}

#[tokio::test]
async fn create_assigns_distinct_sequential_numbers() {
    let (_, repo) = repo();
    let creator = Uuid::new_v4();

    let first = repo
        .create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), creator)
        .await
        .unwrap();
    let second = repo
        .create(Role::Admin, draft("Bob", "bob@example.com", PlanDuration::SixMonths), creator)
        .await
        .unwrap();

    assert_eq!(first.membership_number, "MEM-00001");
    assert_eq!(second.membership_number, "MEM-00002");
    assert_ne!(first.id, second.id);
    assert_eq!(first.created_by, Some(creator));
    assert!(first.is_active);
}

#[tokio::test]
async fn create_trims_text_fields_before_storing() {
    let (_, repo) = repo();
    let created = repo
        .create(
            Role::Admin,
            draft("  Alice Smith ", " alice@example.com ", PlanDuration::OneYear),
            Uuid::new_v4(),
        )
        .await
        .unwrap();
    assert_eq!(created.member_name, "Alice Smith");
    assert_eq!(created.email, "alice@example.com");
}

#[tokio::test]
async fn non_admin_cannot_create_and_nothing_is_stored() {
    let (store, repo) = repo();
    let err = repo
        .create(
            Role::Member,
            draft("Alice", "alice@example.com", PlanDuration::OneYear),
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Forbidden(_)));
    assert_eq!(store.count("memberships").await.unwrap(), 0);
}

#[tokio::test]
async fn update_reflects_in_subsequent_reads() {
    let (_, repo) = repo();
    let created = repo
        .create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), Uuid::new_v4())
        .await
        .unwrap();

    let mut changed = draft("Alice Jones", "alice@example.com", PlanDuration::TwoYears);
    changed.is_active = false;
    repo.update(Role::Admin, created.id, changed).await.unwrap();

    let found = repo.find_by_number(&created.membership_number).await.unwrap();
    assert_eq!(found.member_name, "Alice Jones");
    assert_eq!(found.duration, PlanDuration::TwoYears);
    assert!(!found.is_active);
    // Identity columns are untouched.
    assert_eq!(found.id, created.id);
    assert_eq!(found.membership_number, created.membership_number);
}

#[tokio::test]
async fn non_admin_cannot_update() {
    let (_, repo) = repo();
    let created = repo
        .create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), Uuid::new_v4())
        .await
        .unwrap();

    let err = repo
        .update(Role::Member, created.id, draft("Mallory", "m@example.com", PlanDuration::OneYear))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Forbidden(_)));

    let found = repo.find_by_number(&created.membership_number).await.unwrap();
    assert_eq!(found.member_name, "Alice");
}

#[tokio::test]
async fn find_by_number_trims_and_reports_misses() {
    let (_, repo) = repo();
    repo.create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), Uuid::new_v4())
        .await
        .unwrap();

    let found = repo.find_by_number("  MEM-00001  ").await.unwrap();
    assert_eq!(found.member_name, "Alice");

    let err = repo.find_by_number("MEM-99999").await.unwrap_err();
    match err {
        RepoError::NotFound(message) => {
            assert_eq!(message, "No membership found with number MEM-99999");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn lookup_failure_is_distinct_from_store_failure() {
    let (store, repo) = repo();
    store.set_offline("network unreachable");
    let err = repo.find_by_number("MEM-00001").await.unwrap_err();
    assert!(matches!(err, RepoError::Store(_)));
}

#[tokio::test]
async fn list_is_newest_first_and_filterable() {
    let (_, repo) = repo();
    let creator = Uuid::new_v4();
    for (name, duration) in [
        ("First", PlanDuration::OneYear),
        ("Second", PlanDuration::SixMonths),
        ("Third", PlanDuration::OneYear),
    ] {
        repo.create(Role::Admin, draft(name, "m@example.com", duration), creator)
            .await
            .unwrap();
        // Distinct created_at values so the ordering is meaningful.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all = repo.list_filtered(DurationFilter::All).await.unwrap();
    let names: Vec<&str> = all.iter().map(|m| m.member_name.as_str()).collect();
    assert_eq!(names, ["Third", "Second", "First"]);

    let yearly = repo
        .list_filtered(DurationFilter::Only(PlanDuration::OneYear))
        .await
        .unwrap();
    let names: Vec<&str> = yearly.iter().map(|m| m.member_name.as_str()).collect();
    assert_eq!(names, ["Third", "First"]);
}

#[tokio::test]
async fn search_composes_with_duration_filter() {
    let (_, repo) = repo();
    let creator = Uuid::new_v4();
    repo.create(Role::Admin, draft("Alice Smith", "alice@example.com", PlanDuration::OneYear), creator)
        .await
        .unwrap();
    repo.create(Role::Admin, draft("Alice Brown", "abrown@example.com", PlanDuration::SixMonths), creator)
        .await
        .unwrap();
    repo.create(Role::Admin, draft("Bob Jones", "bob@example.com", PlanDuration::OneYear), creator)
        .await
        .unwrap();

    // Server-side duration filter first, then the text search.
    let yearly = repo
        .list_filtered(DurationFilter::Only(PlanDuration::OneYear))
        .await
        .unwrap();
    let hits = filter_memberships(&yearly, "ALICE");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].member_name, "Alice Smith");

    // Reverse order: search the unfiltered list, then apply the duration
    // predicate. Both orders must yield the same records.
    let all = repo.list_filtered(DurationFilter::All).await.unwrap();
    let reversed: Vec<_> = filter_memberships(&all, "ALICE")
        .into_iter()
        .filter(|m| m.duration == PlanDuration::OneYear)
        .collect();
    let ids: Vec<_> = hits.iter().map(|m| m.id).collect();
    let reversed_ids: Vec<_> = reversed.iter().map(|m| m.id).collect();
    assert_eq!(ids, reversed_ids);
}

#[tokio::test]
async fn options_carry_only_the_selector_columns() {
    let (_, repo) = repo();
    let created = repo
        .create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), Uuid::new_v4())
        .await
        .unwrap();

    let options = repo.list_options().await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, created.id);
    assert_eq!(options[0].membership_number, "MEM-00001");
    assert_eq!(options[0].member_name, "Alice");
}

#[tokio::test]
async fn count_tracks_inserts() {
    let (_, repo) = repo();
    assert_eq!(repo.count().await.unwrap(), 0);
    repo.create(Role::Admin, draft("Alice", "alice@example.com", PlanDuration::OneYear), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);
}

//! Session lifecycle tests against the in-memory store.

use std::sync::Arc;

use desk_core::auth::credential::StoredSession;
use desk_core::auth::{GuardDecision, SessionState};
use desk_core::core::{AppContext, Config};
use desk_core::store::{AuthError, MemoryStore};
use shared::models::Role;

fn test_context(store: Arc<MemoryStore>, work_dir: &std::path::Path) -> AppContext {
    let config = Config::with_overrides(
        "http://store.test",
        "anon-key",
        work_dir.to_string_lossy().to_string(),
    );
    AppContext::with_backends(config, store.clone(), store)
}

#[tokio::test]
async fn sign_in_publishes_state_and_persists_credential() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("alice@example.com", "secret1");
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    let mut watcher = ctx.session.subscribe();
    assert_eq!(*watcher.borrow(), SessionState::SignedOut);

    let signed_in = ctx.session.sign_in("alice@example.com", "secret1").await.unwrap();
    assert_eq!(signed_in, identity);

    watcher.changed().await.unwrap();
    let state = watcher.borrow().clone();
    assert_eq!(state.identity(), Some(&identity));
    assert_eq!(state.role(), Some(Role::Member));

    assert!(StoredSession::exists(dir.path()));
    let stored = StoredSession::load(dir.path()).unwrap().unwrap();
    assert_eq!(stored.identity, identity);
    assert!(!stored.is_expired());
}

#[tokio::test]
async fn wrong_password_leaves_session_signed_out() {
    let store = Arc::new(MemoryStore::new());
    store.register_user("alice@example.com", "secret1");
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    let err = ctx
        .session
        .sign_in("alice@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(ctx.session.current_state(), SessionState::SignedOut);
    assert!(!StoredSession::exists(dir.path()));
}

#[tokio::test]
async fn admin_role_row_grants_admin() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("admin@example.com", "secret1");
    store.grant_admin(identity.id);
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    ctx.session.sign_in("admin@example.com", "secret1").await.unwrap();
    assert_eq!(ctx.session.current_role(), Some(Role::Admin));
}

#[tokio::test]
async fn unknown_role_value_fails_closed_to_member() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("odd@example.com", "secret1");
    store.seed_role(identity.id, "superadmin");
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    ctx.session.sign_in("odd@example.com", "secret1").await.unwrap();
    assert_eq!(ctx.session.current_role(), Some(Role::Member));
}

#[tokio::test]
async fn duplicate_role_rows_fail_closed_to_member() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("dup@example.com", "secret1");
    store.grant_admin(identity.id);
    store.grant_admin(identity.id);
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    ctx.session.sign_in("dup@example.com", "secret1").await.unwrap();
    assert_eq!(ctx.session.current_role(), Some(Role::Member));
}

#[tokio::test]
async fn sign_out_clears_state_and_credential() {
    let store = Arc::new(MemoryStore::new());
    store.register_user("alice@example.com", "secret1");
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    ctx.session.sign_in("alice@example.com", "secret1").await.unwrap();
    let mut guard = ctx.guard();
    assert_eq!(guard.decide("/dashboard"), GuardDecision::Render);

    ctx.session.sign_out().await;
    assert!(guard.changed().await);
    assert_eq!(guard.decide("/dashboard"), GuardDecision::RedirectLogin);
    assert!(!StoredSession::exists(dir.path()));
}

#[tokio::test]
async fn restore_resumes_a_persisted_session() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("alice@example.com", "secret1");
    store.grant_admin(identity.id);
    let dir = tempfile::tempdir().unwrap();

    {
        let ctx = test_context(store.clone(), dir.path());
        ctx.session.sign_in("alice@example.com", "secret1").await.unwrap();
    }

    // New context over the same working directory, as after a restart.
    let ctx = test_context(store, dir.path());
    assert_eq!(ctx.session.current_state(), SessionState::Resolving);
    assert_eq!(ctx.guard().decide("/maintenance"), GuardDecision::Pending);

    assert!(ctx.session.restore().await);
    let state = ctx.session.current_state();
    assert_eq!(state.identity(), Some(&identity));
    assert_eq!(state.role(), Some(Role::Admin));
    assert_eq!(ctx.guard().decide("/maintenance"), GuardDecision::Render);
}

#[tokio::test]
async fn expired_credential_is_deleted_on_restore() {
    let store = Arc::new(MemoryStore::new());
    let identity = store.register_user("alice@example.com", "secret1");
    let dir = tempfile::tempdir().unwrap();

    let stale = MemoryStore::mint_token(&identity, chrono::Utc::now().timestamp() - 60);
    StoredSession::new(stale, identity).save(dir.path()).unwrap();

    let ctx = test_context(store, dir.path());
    assert!(!ctx.session.restore().await);
    assert_eq!(ctx.session.current_state(), SessionState::SignedOut);
    assert!(!StoredSession::exists(dir.path()));
}

#[tokio::test]
async fn corrupt_credential_is_discarded_on_restore() {
    let store = Arc::new(MemoryStore::new());
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Session.json"), "{ broken").unwrap();

    let ctx = test_context(store, dir.path());
    assert!(!ctx.session.restore().await);
    assert_eq!(ctx.session.current_state(), SessionState::SignedOut);
    assert!(!StoredSession::exists(dir.path()));
}

#[tokio::test]
async fn short_password_is_rejected_before_reaching_the_store() {
    let store = Arc::new(MemoryStore::new());
    // Offline store proves the sign-up call never leaves the session layer.
    store.set_offline("unreachable");
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store, dir.path());

    let err = ctx
        .session
        .sign_up("new@example.com", "short", "New User")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword));
    assert_eq!(err.to_string(), "Password must be at least 6 characters.");
}

#[tokio::test]
async fn sign_up_creates_account_and_signs_in() {
    let store = Arc::new(MemoryStore::new());
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(store.clone(), dir.path());

    let identity = ctx
        .session
        .sign_up("new@example.com", "secret1", "New User")
        .await
        .unwrap();
    assert_eq!(identity.email, "new@example.com");
    assert!(ctx.session.current_state().is_signed_in());

    let err = ctx
        .session
        .sign_up("new@example.com", "secret1", "New User")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

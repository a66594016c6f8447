//! Behaviour of the in-memory user store.

use gobang_protocol::UserId;
use gobang_store::{Credentials, INITIAL_SCORE, MemoryUserStore, StoreError, UserStore};

fn creds(name: &str, password: &str) -> Credentials {
    Credentials::new(name, password)
}

// =========================================================================
// insert()
// =========================================================================

#[tokio::test]
async fn test_insert_new_user_starts_at_initial_score() {
    let store = MemoryUserStore::new();
    let user = store.insert(&creds("alice", "pw")).await.unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.score, INITIAL_SCORE);
    assert_eq!(user.total_count, 0);
    assert_eq!(user.win_count, 0);
}

#[tokio::test]
async fn test_insert_duplicate_username_fails() {
    let store = MemoryUserStore::new();
    store.insert(&creds("alice", "pw")).await.unwrap();

    let result = store.insert(&creds("alice", "other")).await;
    assert!(matches!(result, Err(StoreError::DuplicateUsername(name)) if name == "alice"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_insert_assigns_distinct_ids() {
    let store = MemoryUserStore::new();
    let a = store.insert(&creds("a", "pw")).await.unwrap();
    let b = store.insert(&creds("b", "pw")).await.unwrap();
    assert_ne!(a.id, b.id);
}

// =========================================================================
// login() / select_*
// =========================================================================

#[tokio::test]
async fn test_login_correct_password_returns_user() {
    let store = MemoryUserStore::new();
    let user = store.insert(&creds("alice", "secret")).await.unwrap();

    let found = store.login(&creds("alice", "secret")).await.unwrap();
    assert_eq!(found, Some(user));
}

#[tokio::test]
async fn test_login_wrong_password_returns_none() {
    let store = MemoryUserStore::new();
    store.insert(&creds("alice", "secret")).await.unwrap();

    assert_eq!(store.login(&creds("alice", "guess")).await.unwrap(), None);
    assert_eq!(store.login(&creds("bob", "secret")).await.unwrap(), None);
}

#[tokio::test]
async fn test_same_password_different_users_both_log_in() {
    let store = MemoryUserStore::new();
    store.insert(&creds("a", "same")).await.unwrap();
    store.insert(&creds("b", "same")).await.unwrap();

    assert!(store.login(&creds("a", "same")).await.unwrap().is_some());
    assert!(store.login(&creds("b", "same")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_select_by_name_and_id_agree() {
    let store = MemoryUserStore::new();
    let user = store.insert(&creds("alice", "pw")).await.unwrap();

    assert_eq!(store.select_by_name("alice").await.unwrap(), Some(user.clone()));
    assert_eq!(store.select_by_id(user.id).await.unwrap(), Some(user));
    assert_eq!(store.select_by_id(UserId(999)).await.unwrap(), None);
}

// =========================================================================
// win() / lose()
// =========================================================================

#[tokio::test]
async fn test_win_adds_thirty_and_counts() {
    let store = MemoryUserStore::new();
    let id = store.insert(&creds("alice", "pw")).await.unwrap().id;

    store.win(id).await.unwrap();
    let user = store.select_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.score, INITIAL_SCORE + 30);
    assert_eq!(user.total_count, 1);
    assert_eq!(user.win_count, 1);
}

#[tokio::test]
async fn test_lose_subtracts_thirty_and_counts_game_only() {
    let store = MemoryUserStore::new();
    let id = store.insert(&creds("alice", "pw")).await.unwrap().id;

    store.lose(id).await.unwrap();
    let user = store.select_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.score, INITIAL_SCORE - 30);
    assert_eq!(user.total_count, 1);
    assert_eq!(user.win_count, 0);
}

#[tokio::test]
async fn test_win_unknown_user_errors() {
    let store = MemoryUserStore::new();
    let result = store.win(UserId(5)).await;
    assert!(matches!(result, Err(StoreError::UnknownUser(UserId(5)))));
}

// =========================================================================
// Availability
// =========================================================================

#[tokio::test]
async fn test_unavailable_store_fails_every_call() {
    let store = MemoryUserStore::new();
    let id = store.insert(&creds("alice", "pw")).await.unwrap().id;

    store.set_unavailable(true);
    assert!(matches!(store.select_by_id(id).await, Err(StoreError::Unavailable(_))));
    assert!(matches!(store.win(id).await, Err(StoreError::Unavailable(_))));

    store.set_unavailable(false);
    assert!(store.select_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_set_score_overrides_score() {
    let store = MemoryUserStore::new();
    let id = store.insert(&creds("alice", "pw")).await.unwrap().id;

    assert!(store.set_score(id, 2500));
    assert_eq!(store.select_by_id(id).await.unwrap().unwrap().score, 2500);
    assert!(!store.set_score(UserId(77), 1));
}

#[test]
fn test_user_serializes_with_snake_case_counters() {
    let user = gobang_store::User {
        id: UserId(1),
        username: "alice".into(),
        score: 1000,
        total_count: 2,
        win_count: 1,
    };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["win_count"], 1);
}

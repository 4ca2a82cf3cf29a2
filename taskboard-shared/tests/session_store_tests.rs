/// Integration tests for the session store backed by the token file
///
/// These tests exercise the persisted-token lifecycle across store
/// instances, the way a client restarts between runs.

use std::sync::Arc;

use taskboard_shared::models::User;
use taskboard_shared::session::{AuthStatus, SessionEvent, SessionStore};
use taskboard_shared::storage::{FileTokenStore, StorageError, TokenStore};
use tempfile::TempDir;

fn user() -> User {
    User {
        id: 1,
        username: "a".to_string(),
        email: Some("a@example.com".to_string()),
        avatar_url: None,
    }
}

fn store_at(dir: &TempDir) -> (SessionStore, Arc<FileTokenStore>) {
    let tokens = Arc::new(FileTokenStore::new(dir.path().join("taskboard").join("auth.json")));
    (SessionStore::new(tokens.clone()), tokens)
}

#[tokio::test]
async fn test_token_survives_restart() {
    let dir = TempDir::new().unwrap();

    let (store, _) = store_at(&dir);
    store.login_success("abc".to_string(), user()).await.unwrap();

    // A new process starts logged out but can read the persisted token
    let (restarted, tokens) = store_at(&dir);
    assert!(!restarted.is_authenticated().await);
    assert_eq!(restarted.persisted_token().unwrap().as_deref(), Some("abc"));
    assert_eq!(tokens.load().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_logout_removes_persisted_token() {
    let dir = TempDir::new().unwrap();
    let (store, tokens) = store_at(&dir);

    store.login_success("abc".to_string(), user()).await.unwrap();
    store.logout_success().await;

    assert!(tokens.load().unwrap().is_none());
    let (restarted, _) = store_at(&dir);
    assert!(restarted.persisted_token().unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_token_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let (store, tokens) = store_at(&dir);

    std::fs::create_dir_all(tokens.path().parent().unwrap()).unwrap();
    std::fs::write(tokens.path(), "{not json").unwrap();

    assert!(matches!(
        store.persisted_token(),
        Err(StorageError::Corrupt { .. })
    ));

    // Logging out replaces the corrupt file
    store.logout_success().await;
    assert!(store.persisted_token().unwrap().is_none());
}

#[tokio::test]
async fn test_session_events_follow_transitions() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_at(&dir);
    let mut events = store.subscribe();

    store.set_status(AuthStatus::Loading).await;
    store.login_success("abc".to_string(), user()).await.unwrap();
    store.force_logout("Token expired").await;

    assert_eq!(events.recv().await.unwrap(), SessionEvent::StatusChanged(AuthStatus::Loading));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn(user()));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Unauthorized {
            reason: "Token expired".to_string()
        }
    );

    let session = store.snapshot().await;
    assert!(session.is_consistent());
    assert!(!session.is_logged_in());
}

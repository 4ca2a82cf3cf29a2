/// Integration tests for the auth gateway and the shared 401 handling

mod common;

use common::{project_json, user_json, TestContext};
use serde_json::json;
use taskboard_client::error::ClientError;
use taskboard_shared::auth::{Credentials, Registration};
use taskboard_shared::session::{AuthStatus, SessionEvent};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn registration(password: &str) -> Registration {
    Registration {
        username: "ada_l".to_string(),
        email: "ada@example.com".to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

#[tokio::test]
async fn test_gateway_login_returns_data_only() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "a", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc",
            "user": user_json(1, "a")
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx.app.auth.login(&Credentials::new("a", "pw")).await.unwrap();

    assert_eq!(response.token, "abc");
    assert_eq!(response.user.username, "a");
    assert!(ctx.persisted_token().is_none());
    assert!(!ctx.app.session.is_authenticated().await);
}

#[tokio::test]
async fn test_app_login_persists_session() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc",
            "user": user_json(1, "a")
        })))
        .mount(&ctx.server)
        .await;

    let user = ctx.app.login(&Credentials::new("a", "pw")).await.unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(ctx.persisted_token().as_deref(), Some("abc"));
    let session = ctx.app.session.snapshot().await;
    assert!(session.is_authenticated);
    assert_eq!(session.status, AuthStatus::Succeeded);
}

#[tokio::test]
async fn test_login_rejection_is_invalid_credentials() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid username or password" })),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx.app.login(&Credentials::new("a", "wrong")).await.unwrap_err();

    match err {
        ClientError::InvalidCredentials(message) => assert_eq!(message, "Invalid username or password"),
        other => panic!("unexpected error: {:?}", other),
    }
    let session = ctx.app.session.snapshot().await;
    assert_eq!(session.status, AuthStatus::Failed);
    assert_eq!(session.error.as_deref(), Some("Invalid username or password"));
}

#[tokio::test]
async fn test_login_422_is_invalid_credentials() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&ctx.server)
        .await;

    let err = ctx.app.auth.login(&Credentials::new("a", "pw")).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials(ref m) if m == "Request failed"));
}

#[tokio::test]
async fn test_blank_login_is_rejected_locally() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx.app.auth.login(&Credentials::new("  ", "pw")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { .. }));
}

#[tokio::test]
async fn test_register_sends_body_without_confirmation() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "username": "ada_l",
            "email": "ada@example.com",
            "password": "Tomato-Basil-42"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "User created" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.app.register(&registration("Tomato-Basil-42")).await.unwrap();
    assert_eq!(ctx.app.session.snapshot().await.status, AuthStatus::Succeeded);
}

#[tokio::test]
async fn test_weak_password_never_reaches_backend() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx.app.register(&registration("short")).await.unwrap_err();
    match err {
        ClientError::Validation { details, .. } => {
            assert!(details.iter().any(|d| d.field == "password"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_register_conflict_surfaces_message() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "Username already taken" })))
        .mount(&ctx.server)
        .await;

    let err = ctx.app.register(&registration("Tomato-Basil-42")).await.unwrap_err();
    assert_eq!(err.user_message(), "Username already taken");
}

#[tokio::test]
async fn test_verify_without_token_skips_network() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx.app.auth.verify().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_logout_when_logged_out_is_quiet() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    ctx.app.logout().await;
    ctx.app.logout().await;

    assert!(!ctx.app.session.is_authenticated().await);
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_logout_clears_token_even_if_backend_fails() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.app.logout().await;

    assert!(!ctx.app.session.is_authenticated().await);
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_delete_account_logs_out() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;

    Mock::given(method("DELETE"))
        .and(path("/auth/delete"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.app.delete_account().await.unwrap();

    assert!(!ctx.app.session.is_authenticated().await);
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_update_avatar_updates_session_user() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;

    Mock::given(method("PUT"))
        .and(path("/users/update-avatar"))
        .and(body_json(json!({ "avatarUrl": "https://img.example.com/a.png" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "a",
            "avatar": "https://img.example.com/a.png"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let user = ctx.app.update_avatar("https://img.example.com/a.png").await.unwrap();

    assert_eq!(user.avatar_url.as_deref(), Some("https://img.example.com/a.png"));
    let current = ctx.app.session.current_user().await.unwrap();
    assert_eq!(current.avatar_url.as_deref(), Some("https://img.example.com/a.png"));
    assert!(ctx.app.session.is_authenticated().await);
}

#[tokio::test]
async fn test_401_on_any_call_clears_token_and_broadcasts() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;
    let mut events = ctx.app.session.subscribe();

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .mount(&ctx.server)
        .await;

    let err = ctx.app.projects.list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(ctx.persisted_token().is_none());
    assert!(!ctx.app.session.is_authenticated().await);

    assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Unauthorized {
            reason: "Token expired".to_string()
        }
    );
}

#[tokio::test]
async fn test_bearer_token_sent_on_requests() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project_json(1, "active")])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let projects = ctx.app.projects.list().await.unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_server_error_messages() {
    let ctx = TestContext::new().await;
    ctx.log_in("abc").await;

    Mock::given(method("GET"))
        .and(path("/projects/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "Database unavailable" })))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Project not found" })))
        .mount(&ctx.server)
        .await;

    let err = ctx.app.projects.get(1).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    assert_eq!(err.user_message(), "Database unavailable");

    let err = ctx.app.projects.get(2).await.unwrap_err();
    assert_eq!(err.user_message(), "Request failed");

    let err = ctx.app.projects.get(3).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    // None of these are 401s
    assert!(ctx.app.session.is_authenticated().await);
}

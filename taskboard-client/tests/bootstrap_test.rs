/// Integration tests for the startup sequence
///
/// Each test runs the bootstrap against a mock backend and checks the
/// resulting session and persisted token.

mod common;

use std::time::Duration;

use common::{user_json, TestContext, CSRF_TOKEN};
use serde_json::json;
use taskboard_client::bootstrap::{BootstrapOutcome, LoggedOutReason};
use taskboard_client::config::{CsrfFailurePolicy, CsrfSettle};
use taskboard_shared::session::AuthStatus;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_verify(ctx: &TestContext, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_no_token_logs_out_without_verify() {
    let ctx = TestContext::new().await;
    ctx.mount_csrf().await;
    mount_verify(&ctx, ResponseTemplate::new(200), 0).await;

    let outcome = ctx.app.bootstrap().await;

    assert_eq!(outcome, BootstrapOutcome::LoggedOut(LoggedOutReason::NoStoredToken));
    let session = ctx.app.session.snapshot().await;
    assert!(!session.is_authenticated);
    assert!(session.token.is_none());
    assert_eq!(session.status, AuthStatus::Idle);
}

#[tokio::test]
async fn test_valid_token_authenticates() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;

    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isAuthenticated": true,
            "user": user_json(1, "a")
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let outcome = ctx.app.bootstrap().await;

    assert!(outcome.is_authenticated());
    let session = ctx.app.session.snapshot().await;
    assert_eq!(session.token.as_deref(), Some("abc"));
    assert_eq!(session.user.as_ref().map(|u| u.id), Some(1));
    assert_eq!(session.user.as_ref().map(|u| u.username.as_str()), Some("a"));
    assert!(session.is_authenticated);
    assert_eq!(session.status, AuthStatus::Succeeded);
    assert_eq!(ctx.persisted_token().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_csrf_token_is_mirrored_into_header() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;

    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .and(header("X-CSRF-TOKEN", CSRF_TOKEN))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isAuthenticated": true,
            "user": user_json(1, "a")
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    assert!(ctx.app.bootstrap().await.is_authenticated());
}

#[tokio::test]
async fn test_unauthenticated_payload_clears_token() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({ "isAuthenticated": false })),
        1,
    )
    .await;

    let outcome = ctx.app.bootstrap().await;

    assert!(matches!(
        outcome,
        BootstrapOutcome::LoggedOut(LoggedOutReason::VerificationFailed(_))
    ));
    assert!(ctx.persisted_token().is_none());
    assert!(!ctx.app.session.is_authenticated().await);
}

#[tokio::test]
async fn test_authenticated_without_user_clears_token() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({ "isAuthenticated": true })),
        1,
    )
    .await;

    assert!(!ctx.app.bootstrap().await.is_authenticated());
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_verify_401_clears_token() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        1,
    )
    .await;

    let outcome = ctx.app.bootstrap().await;

    assert!(!outcome.is_authenticated());
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_malformed_verify_payload_clears_token() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;
    mount_verify(&ctx, ResponseTemplate::new(200).set_body_string("<html>"), 1).await;

    assert!(!ctx.app.bootstrap().await.is_authenticated());
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_network_error_clears_token() {
    let mut ctx = TestContext::with_token("abc").await;

    // Rebuild the app against a port nothing listens on
    let tokens: std::sync::Arc<dyn taskboard_shared::storage::TokenStore> = ctx.tokens.clone();
    let mut config = taskboard_client::config::Config::for_base_url("http://127.0.0.1:9");
    config.api.timeout_secs = 2;
    ctx.app = taskboard_client::app::App::with_token_store(config, tokens).unwrap();

    let outcome = ctx.app.bootstrap().await;

    assert!(matches!(
        outcome,
        BootstrapOutcome::LoggedOut(LoggedOutReason::VerificationFailed(_))
    ));
    assert!(ctx.persisted_token().is_none());
    assert!(!ctx.app.session.is_authenticated().await);
}

#[tokio::test]
async fn test_csrf_failure_continues_by_default() {
    let ctx = TestContext::with_token("abc").await;

    Mock::given(method("GET"))
        .and(path("/auth/csrf-token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({
            "isAuthenticated": true,
            "user": user_json(1, "a")
        })),
        1,
    )
    .await;

    assert!(ctx.app.bootstrap().await.is_authenticated());
}

#[tokio::test]
async fn test_csrf_failure_aborts_when_configured() {
    let ctx = TestContext::build(Some("abc"), |config| {
        config.csrf.on_failure = CsrfFailurePolicy::Abort;
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/auth/csrf-token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;
    mount_verify(&ctx, ResponseTemplate::new(200), 0).await;

    let outcome = ctx.app.bootstrap().await;

    assert!(matches!(
        outcome,
        BootstrapOutcome::LoggedOut(LoggedOutReason::CsrfUnavailable(_))
    ));
    assert!(ctx.persisted_token().is_none());
}

#[tokio::test]
async fn test_missing_csrf_cookie_aborts_in_confirm_mode() {
    let ctx = TestContext::build(Some("abc"), |config| {
        config.csrf.on_failure = CsrfFailurePolicy::Abort;
        config.csrf.settle = CsrfSettle::Confirm;
    })
    .await;

    // 200 but neither a cookie nor a body token
    Mock::given(method("GET"))
        .and(path("/auth/csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&ctx.server)
        .await;
    mount_verify(&ctx, ResponseTemplate::new(200), 0).await;

    assert!(matches!(
        ctx.app.bootstrap().await,
        BootstrapOutcome::LoggedOut(LoggedOutReason::CsrfUnavailable(_))
    ));
}

#[tokio::test]
async fn test_delay_mode_does_not_require_cookie() {
    let ctx = TestContext::build(Some("abc"), |config| {
        config.csrf.on_failure = CsrfFailurePolicy::Abort;
        config.csrf.settle = CsrfSettle::Delay;
        config.csrf.settle_delay_ms = 20;
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/auth/csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&ctx.server)
        .await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({
            "isAuthenticated": true,
            "user": user_json(1, "a")
        })),
        1,
    )
    .await;

    let started = std::time::Instant::now();
    assert!(ctx.app.bootstrap().await.is_authenticated());
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_bootstrap_runs_once() {
    let ctx = TestContext::with_token("abc").await;
    ctx.mount_csrf().await;
    mount_verify(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({
            "isAuthenticated": true,
            "user": user_json(1, "a")
        })),
        1,
    )
    .await;

    let first = ctx.app.bootstrap().await;
    let second = ctx.app.bootstrap().await;

    assert_eq!(first, second);
    assert!(second.is_authenticated());
}

//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A mock REST backend (wiremock) per test
//! - An `App` wired to it with an in-memory token store
//! - JSON fixtures for users, projects and tasks

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use taskboard_client::app::App;
use taskboard_client::config::Config;
use taskboard_shared::models::User;
use taskboard_shared::storage::{MemoryTokenStore, TokenStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSRF_TOKEN: &str = "csrf-123";

/// Test context containing the mock backend and the app under test
pub struct TestContext {
    pub server: MockServer,
    pub app: App,
    pub tokens: Arc<MemoryTokenStore>,
}

impl TestContext {
    /// Fresh backend, nothing persisted
    pub async fn new() -> Self {
        Self::build(None, |_| {}).await
    }

    /// Fresh backend with `token` already persisted
    pub async fn with_token(token: &str) -> Self {
        Self::build(Some(token), |_| {}).await
    }

    /// Fresh backend with a persisted token and adjusted configuration
    pub async fn build(token: Option<&str>, configure: impl FnOnce(&mut Config)) -> Self {
        let server = MockServer::start().await;

        let mut config = Config::for_base_url(server.uri());
        config.api.timeout_secs = 5;
        configure(&mut config);

        let tokens = Arc::new(match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        });
        let store: Arc<dyn TokenStore> = tokens.clone();
        let app = App::with_token_store(config, store).expect("app should build");

        Self { server, app, tokens }
    }

    /// Serves a CSRF token both as a cookie and in the body
    pub async fn mount_csrf(&self) {
        Mock::given(method("GET"))
            .and(path("/auth/csrf-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", format!("csrfToken={}; Path=/", CSRF_TOKEN).as_str())
                    .set_body_json(json!({ "csrfToken": CSRF_TOKEN })),
            )
            .mount(&self.server)
            .await;
    }

    /// Puts the session straight into the logged-in state
    pub async fn log_in(&self, token: &str) -> User {
        let user = user(1, "a");
        self.app
            .session
            .login_success(token.to_string(), user.clone())
            .await
            .expect("login_success should persist");
        user
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.tokens.load().expect("memory store never fails")
    }
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: None,
        avatar_url: None,
    }
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({ "id": id, "username": username })
}

pub fn project_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Project {}", id),
        "description": "",
        "image_url": null,
        "deadline": null,
        "status": status
    })
}

pub fn task_json(id: i64, project_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "project_id": project_id,
        "title": format!("Task {}", id),
        "description": "",
        "information": "",
        "priority": "normal",
        "status": status,
        "deadline": null
    })
}

/// Auth request and response bodies
///
/// # Endpoints
///
/// - `POST /auth/login` with [`Credentials`] returns [`LoginResponse`]
/// - `POST /auth/register` with [`Registration`] (sent as [`RegisterBody`])
/// - `GET /auth/verify` returns [`VerifyResponse`]

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::user::User;
use crate::validation::error_with_message;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub username: String,

    #[validate(custom(function = "crate::validation::not_blank"))]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls
    pub token: String,

    /// Logged-in user
    pub user: User,
}

/// Registration form
///
/// `confirm_password` only exists to be checked locally; it is never sent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(
        length(min = 3, message = "Username must be at least 3 characters"),
        custom(function = "username_charset")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "crate::auth::password::strong_password"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
}

impl Registration {
    /// Wire body for `POST /auth/register`
    pub fn to_body(&self) -> RegisterBody {
        RegisterBody {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of `GET /auth/verify`
///
/// A payload only counts as a successful verification when
/// `isAuthenticated` is true and a user is present; see
/// [`VerifyResponse::authenticated_user`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default, rename = "isAuthenticated", alias = "is_authenticated")]
    pub is_authenticated: bool,

    #[serde(default)]
    pub user: Option<User>,
}

impl VerifyResponse {
    /// The verified user, if the payload is well-formed and positive
    pub fn authenticated_user(self) -> Option<User> {
        if self.is_authenticated {
            self.user
        } else {
            None
        }
    }
}

/// Body of `PUT /users/update-avatar`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AvatarUpdate {
    #[serde(rename = "avatarUrl")]
    #[validate(url(message = "Please enter a valid image URL"))]
    pub avatar_url: String,
}

fn username_charset(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(error_with_message(
            "username_charset",
            "Only letters, numbers, and underscores allowed",
        ))
    }
}

/// User profile as returned by the auth endpoints
///
/// The client never sees password material; this is only the identity the
/// backend reports from `/auth/login` and `/auth/verify`.
///
/// # Wire format
///
/// ```json
/// { "id": 1, "username": "ada", "email": "ada@example.com", "avatarUrl": "https://..." }
/// ```
///
/// The avatar field is accepted as `avatarUrl`, `avatar_url` or `avatar`.

use serde::{Deserialize, Serialize};

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID
    pub id: i64,

    /// Login name
    pub username: String,

    /// Email address (not always included by the backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Optional avatar/profile picture URL
    #[serde(
        default,
        rename = "avatarUrl",
        alias = "avatar_url",
        alias = "avatar",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
}

impl User {
    /// Name to show for this user
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

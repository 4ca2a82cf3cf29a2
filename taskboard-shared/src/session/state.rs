/// Session state
///
/// The client's in-memory record of who is logged in. `Session` is a plain
/// value; all mutation goes through [`super::store::SessionStore`].
///
/// # Invariant
///
/// `is_authenticated` is true iff `token` and `user` are both present and
/// the last login/verification succeeded. The transition methods below are
/// the only way to move between authenticated and logged-out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::user::User;

/// Progress of the most recent auth operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Nothing attempted yet
    #[default]
    Idle,

    /// Request in flight
    Loading,

    /// Last operation succeeded
    Succeeded,

    /// Last operation failed (see `Session::error`)
    Failed,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Idle => "idle",
            AuthStatus::Loading => "loading",
            AuthStatus::Succeeded => "succeeded",
            AuthStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token (never serialized)
    #[serde(skip)]
    pub token: Option<String>,

    /// Logged-in user
    pub user: Option<User>,

    /// Whether the session is authenticated
    pub is_authenticated: bool,

    /// Progress of the last auth operation
    pub status: AuthStatus,

    /// Last error message, for display
    pub error: Option<String>,
}

impl Session {
    /// Empty, logged-out session
    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks the authentication invariant
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == (self.token.is_some() && self.user.is_some())
    }

    /// Whether protected views may be shown
    pub fn is_logged_in(&self) -> bool {
        self.is_authenticated && self.token.is_some() && self.user.is_some()
    }

    pub(crate) fn apply_login(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.is_authenticated = true;
        self.status = AuthStatus::Succeeded;
        self.error = None;
    }

    /// Clears identity; status and error are left for the caller to read
    pub(crate) fn apply_logout(&mut self) {
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
    }

    pub(crate) fn apply_error(&mut self, error: Option<String>) {
        if error.is_some() {
            self.status = AuthStatus::Failed;
        }
        self.error = error;
    }
}

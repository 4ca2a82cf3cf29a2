/// Session store
///
/// Owns the in-memory [`Session`] and is the single writer of the persisted
/// bearer token. Every mutation goes through one of the transition methods
/// below, and every transition is broadcast as a [`SessionEvent`] so that a
/// top-level controller can react (for example by showing the login screen
/// after an `Unauthorized`).
///
/// # Transitions
///
/// | Method | Effect |
/// |---|---|
/// | `login_success` | persist token, set token + user, authenticated |
/// | `logout_success` | remove persisted token, clear token + user |
/// | `set_status` | record progress of an auth operation |
/// | `set_error` | record a display error (status becomes `failed`) |
/// | `update_user` | replace the profile of a logged-in user |
/// | `force_logout` | `logout_success` + broadcast `Unauthorized` |
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::User;
/// use taskboard_shared::session::SessionStore;
/// use taskboard_shared::storage::{MemoryTokenStore, TokenStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = Arc::new(MemoryTokenStore::new());
/// let store = SessionStore::new(tokens.clone());
///
/// let user = User { id: 1, username: "ada".into(), email: None, avatar_url: None };
/// store.login_success("abc".into(), user).await?;
/// assert!(store.snapshot().await.is_logged_in());
/// assert_eq!(tokens.load()?.as_deref(), Some("abc"));
///
/// store.logout_success().await;
/// assert!(tokens.load()?.is_none());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::state::{AuthStatus, Session};
use crate::models::user::User;
use crate::storage::{StorageError, TokenStore};

/// Capacity of the session event channel
const EVENT_CAPACITY: usize = 32;

/// Session transition notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A user logged in or a stored session was verified
    LoggedIn(User),

    /// The session was cleared
    LoggedOut,

    /// The backend rejected our credentials; the session was cleared
    Unauthorized { reason: String },

    StatusChanged(AuthStatus),

    ErrorChanged(Option<String>),

    UserUpdated(User),
}

/// Shared, async-safe session store
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    tokens: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Creates an empty session backed by `tokens`
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(Session::empty())),
            tokens,
            events,
        }
    }

    /// Subscribes to session transitions
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current session (cloned)
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_logged_in()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Reads the persisted token (read-only; gateways use this)
    pub fn persisted_token(&self) -> Result<Option<String>, StorageError> {
        self.tokens.load()
    }

    /// Marks the session authenticated and persists the token
    ///
    /// If the token cannot be persisted the session is left logged out and
    /// the storage error is returned.
    pub async fn login_success(&self, token: String, user: User) -> Result<(), StorageError> {
        if let Err(e) = self.tokens.save(&token) {
            tracing::error!(error = %e, "Failed to persist session token");
            let mut state = self.state.write().await;
            state.apply_logout();
            state.apply_error(Some("Could not save session".to_string()));
            return Err(e);
        }

        {
            let mut state = self.state.write().await;
            state.apply_login(token, user.clone());
        }

        tracing::info!(user_id = user.id, username = %user.username, "Session authenticated");
        self.emit(SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// Clears the session and the persisted token
    ///
    /// Idempotent. A failure to remove the persisted token is logged, not
    /// returned: the in-memory session is logged out regardless.
    pub async fn logout_success(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }

        let was_authenticated = {
            let mut state = self.state.write().await;
            let was = state.is_authenticated;
            state.apply_logout();
            was
        };

        if was_authenticated {
            tracing::info!("Session cleared");
        } else {
            tracing::debug!("Logout on an already logged-out session");
        }
        self.emit(SessionEvent::LoggedOut);
    }

    /// Clears the session after the backend answered 401
    pub async fn force_logout(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "Forcing logout after unauthorized response");
        self.logout_success().await;
        self.emit(SessionEvent::Unauthorized { reason });
    }

    pub async fn set_status(&self, status: AuthStatus) {
        self.state.write().await.status = status;
        self.emit(SessionEvent::StatusChanged(status));
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.state.write().await.apply_error(error.clone());
        self.emit(SessionEvent::ErrorChanged(error));
    }

    /// Replaces the profile of the logged-in user
    ///
    /// Ignored (returns false) when nobody is logged in, so a late profile
    /// response cannot resurrect a cleared session.
    pub async fn update_user(&self, user: User) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.is_authenticated {
                return false;
            }
            state.user = Some(user.clone());
        }
        self.emit(SessionEvent::UserUpdated(user));
        true
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

/// Auth gateway
///
/// # Endpoints
///
/// - `GET /auth/csrf-token` - Obtain the CSRF cookie
/// - `POST /auth/login` - Exchange credentials for a token
/// - `POST /auth/register` - Create an account
/// - `GET /auth/verify` - Check the stored token
/// - `POST /auth/logout` - End the server-side session
/// - `DELETE /auth/delete` - Delete the account
/// - `PUT /users/update-avatar` - Change the profile picture
///
/// `login` returns data only. Persisting the token is the caller's job
/// through [`SessionStore::login_success`]; the gateway only ever clears
/// the session (logout, account deletion, 401).

use reqwest::Method;
use serde::Deserialize;
use taskboard_shared::auth::credentials::AvatarUpdate;
use taskboard_shared::auth::{Credentials, LoginResponse, Registration, VerifyResponse};
use taskboard_shared::models::User;
use taskboard_shared::session::SessionStore;
use taskboard_shared::validation::check;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

pub const CSRF_PATH: &str = "auth/csrf-token";
pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const VERIFY_PATH: &str = "auth/verify";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const DELETE_ACCOUNT_PATH: &str = "auth/delete";
pub const AVATAR_PATH: &str = "users/update-avatar";

/// Body of `GET /auth/csrf-token`
#[derive(Debug, Default, Deserialize)]
struct CsrfResponse {
    #[serde(default, rename = "csrfToken", alias = "csrf_token", alias = "token")]
    csrf_token: Option<String>,
}

/// Response of the avatar update: the user, bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

/// Auth endpoints
#[derive(Debug, Clone)]
pub struct AuthGateway {
    api: ApiClient,
}

impl AuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Requests the CSRF cookie and returns the token now in effect
    ///
    /// `Ok(None)` means the request succeeded but no token could be read
    /// back from either the cookie jar or the response body.
    pub async fn fetch_csrf_token(&self) -> ClientResult<Option<String>> {
        let response = self
            .api
            .execute(self.api.request(Method::GET, CSRF_PATH)?)
            .await?;

        let body = response.text().await.unwrap_or_default();
        let parsed: CsrfResponse = serde_json::from_str(&body).unwrap_or_default();
        if let Some(token) = parsed.csrf_token.filter(|t| !t.trim().is_empty()) {
            self.api.remember_csrf_token(token);
        }

        Ok(self.api.csrf_token())
    }

    /// Exchanges credentials for a token and user
    ///
    /// Rejections (400/401/403/422) come back as
    /// [`ClientError::InvalidCredentials`] with the backend's message.
    #[tracing::instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        check(credentials).map_err(ClientError::from_details)?;

        let result = self
            .api
            .send_json::<_, LoginResponse>(Method::POST, LOGIN_PATH, credentials)
            .await;

        match result {
            Ok(response) => {
                tracing::info!(user_id = response.user.id, "Login accepted");
                Ok(response)
            }
            Err(ClientError::Unauthorized(message)) => Err(ClientError::InvalidCredentials(message)),
            Err(ClientError::Validation { message, .. }) => {
                Err(ClientError::InvalidCredentials(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Creates an account
    ///
    /// The form is validated locally first; `confirm_password` is never sent.
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> ClientResult<()> {
        check(registration).map_err(ClientError::from_details)?;

        self.api
            .send_unit(Method::POST, REGISTER_PATH, Some(&registration.to_body()))
            .await?;

        tracing::info!("Registration accepted");
        Ok(())
    }

    /// Checks the persisted token with the backend
    ///
    /// Fails with [`ClientError::Unauthorized`] without touching the network
    /// when no token is persisted.
    pub async fn verify(&self) -> ClientResult<VerifyResponse> {
        if self.session().persisted_token()?.is_none() {
            return Err(ClientError::Unauthorized("No stored session".to_string()));
        }

        self.api.get(VERIFY_PATH).await
    }

    /// Ends the session
    ///
    /// Best effort: the local token is cleared whatever the backend says.
    /// Calling it while logged out is a no-op apart from the local clear.
    pub async fn logout(&self) {
        match self.session().persisted_token() {
            Ok(Some(_)) => {
                if let Err(e) = self
                    .api
                    .send_unit(Method::POST, LOGOUT_PATH, None::<&()>)
                    .await
                {
                    tracing::warn!(error = %e, "Remote logout failed, clearing local session");
                }
            }
            Ok(None) => tracing::debug!("No stored token, skipping remote logout"),
            Err(e) => tracing::warn!(error = %e, "Could not read stored token"),
        }

        self.session().logout_success().await;
    }

    /// Deletes the account, then logs out
    #[tracing::instrument(skip(self))]
    pub async fn delete_account(&self) -> ClientResult<()> {
        self.api
            .send_unit(Method::DELETE, DELETE_ACCOUNT_PATH, None::<&()>)
            .await?;

        tracing::info!("Account deleted");
        self.session().logout_success().await;
        Ok(())
    }

    /// Changes the avatar and refreshes the session's user
    #[tracing::instrument(skip(self))]
    pub async fn update_avatar(&self, avatar_url: &str) -> ClientResult<User> {
        let body = AvatarUpdate {
            avatar_url: avatar_url.trim().to_string(),
        };
        check(&body).map_err(ClientError::from_details)?;

        let response: serde_json::Value = self.api.send_json(Method::PUT, AVATAR_PATH, &body).await?;

        let user = match serde_json::from_value::<UserEnvelope>(response) {
            Ok(UserEnvelope::Wrapped { user }) | Ok(UserEnvelope::Bare(user)) => user,
            // Some backends answer with a bare message; patch what we have
            Err(_) => match self.session().current_user().await {
                Some(mut user) => {
                    user.avatar_url = Some(body.avatar_url.clone());
                    user
                }
                None => {
                    return Err(ClientError::MalformedResponse(
                        "Avatar update did not return a user".to_string(),
                    ))
                }
            },
        };

        if !self.session().update_user(user.clone()).await {
            tracing::debug!("Avatar updated while logged out, session unchanged");
        }
        Ok(user)
    }
}

/// Application wiring and session-level actions
///
/// [`App`] builds every component from one [`Config`] so that they share a
/// single session store, cookie jar and token file. It is also the
/// top-level controller for the auth flows: it records progress and errors
/// on the session and performs `login_success` after a successful login,
/// which keeps the session store the only writer of the persisted token.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::{app::App, config::Config};
/// use taskboard_shared::auth::Credentials;
///
/// # async fn example() -> anyhow::Result<()> {
/// let app = App::new(Config::from_env()?)?;
/// app.bootstrap().await;
/// let user = app.login(&Credentials::new("ada", "Tomato-Basil-42")).await?;
/// println!("Logged in as {}", user.username);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use taskboard_shared::auth::{Credentials, Registration};
use taskboard_shared::models::User;
use taskboard_shared::session::{AuthStatus, SessionStore};
use taskboard_shared::storage::{FileTokenStore, TokenStore};

use crate::bootstrap::{Bootstrap, BootstrapOutcome};
use crate::config::Config;
use crate::error::ClientResult;
use crate::gateway::{AuthGateway, ProjectGateway, TaskGateway};
use crate::http::ApiClient;
use crate::status::StatusController;

/// Shared application handle
///
/// Cheap to clone; clones share all state.
#[derive(Debug, Clone)]
pub struct App {
    /// Application configuration
    pub config: Arc<Config>,

    pub session: SessionStore,

    pub auth: AuthGateway,

    pub projects: ProjectGateway,

    pub tasks: TaskGateway,

    pub status: StatusController,

    bootstrap: Arc<Bootstrap>,
}

impl App {
    /// Creates the application with the file token store from configuration
    pub fn new(config: Config) -> ClientResult<Self> {
        let tokens = match &config.auth.token_path {
            Some(path) => FileTokenStore::new(path.clone()),
            None => FileTokenStore::at_default_location(),
        };
        tracing::debug!(path = %tokens.path().display(), "Using token file");

        Self::with_token_store(config, Arc::new(tokens))
    }

    /// Creates the application with a caller-supplied token store
    pub fn with_token_store(config: Config, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let session = SessionStore::new(tokens);
        let api = ApiClient::new(&config, session.clone())?;

        let auth = AuthGateway::new(api.clone());
        let projects = ProjectGateway::new(api.clone());
        let tasks = TaskGateway::new(api);
        let status = StatusController::new(projects.clone(), tasks.clone());
        let bootstrap = Bootstrap::new(auth.clone(), session.clone(), config.csrf.clone());

        Ok(Self {
            config: Arc::new(config),
            session,
            auth,
            projects,
            tasks,
            status,
            bootstrap: Arc::new(bootstrap),
        })
    }

    /// Runs the startup sequence (once; later calls return the first outcome)
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        self.bootstrap.run().await
    }

    /// Logs in and persists the session
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        self.session.set_status(AuthStatus::Loading).await;

        let response = match self.auth.login(credentials).await {
            Ok(response) => response,
            Err(e) => {
                self.session.set_error(Some(e.user_message())).await;
                return Err(e);
            }
        };

        self.session
            .login_success(response.token, response.user.clone())
            .await?;
        Ok(response.user)
    }

    /// Registers a new account; the user still has to log in afterwards
    pub async fn register(&self, registration: &Registration) -> ClientResult<()> {
        self.session.set_status(AuthStatus::Loading).await;

        match self.auth.register(registration).await {
            Ok(()) => {
                self.session.set_status(AuthStatus::Succeeded).await;
                Ok(())
            }
            Err(e) => {
                self.session.set_error(Some(e.user_message())).await;
                Err(e)
            }
        }
    }

    /// Logs out; never fails
    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    pub async fn delete_account(&self) -> ClientResult<()> {
        self.auth.delete_account().await
    }

    pub async fn update_avatar(&self, avatar_url: &str) -> ClientResult<User> {
        self.auth.update_avatar(avatar_url).await
    }
}

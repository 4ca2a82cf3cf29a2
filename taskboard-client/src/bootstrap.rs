/// Application bootstrap
///
/// Runs once per application load, strictly in order:
///
/// 1. `GET /auth/csrf-token` (failure handling per `csrf.on_failure`)
/// 2. CSRF settle: confirm the token is readable, or sleep (`csrf.settle`)
/// 3. Read the persisted token; none means logged out, no verify call
/// 4. `GET /auth/verify`; a positive answer with a user logs the session in
/// 5. Any failure clears the persisted token and leaves the session logged out
///
/// The bootstrap never returns an error. Its only effect is the session
/// transition, and the [`BootstrapOutcome`] says which one happened.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::app::App;
/// use taskboard_client::bootstrap::BootstrapOutcome;
/// use taskboard_client::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let app = App::new(Config::from_env()?)?;
/// match app.bootstrap().await {
///     BootstrapOutcome::Authenticated(user) => println!("Welcome back, {}", user.username),
///     BootstrapOutcome::LoggedOut(reason) => println!("Please log in ({})", reason),
/// }
/// # Ok(())
/// # }
/// ```

use std::fmt;

use taskboard_shared::models::User;
use taskboard_shared::session::{AuthStatus, SessionStore};
use tokio::sync::OnceCell;

use crate::config::{CsrfConfig, CsrfFailurePolicy, CsrfSettle};
use crate::gateway::AuthGateway;

/// Why the bootstrap ended logged out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggedOutReason {
    /// Nothing was persisted
    NoStoredToken,

    /// CSRF token unavailable and `csrf.on_failure = abort`
    CsrfUnavailable(String),

    /// The backend did not confirm the stored token
    VerificationFailed(String),

    /// The persisted token could not be read
    Storage(String),
}

impl fmt::Display for LoggedOutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggedOutReason::NoStoredToken => write!(f, "no stored session"),
            LoggedOutReason::CsrfUnavailable(msg) => write!(f, "CSRF token unavailable: {}", msg),
            LoggedOutReason::VerificationFailed(msg) => write!(f, "session verification failed: {}", msg),
            LoggedOutReason::Storage(msg) => write!(f, "stored session unreadable: {}", msg),
        }
    }
}

/// Result of the one bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Authenticated(User),
    LoggedOut(LoggedOutReason),
}

impl BootstrapOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, BootstrapOutcome::Authenticated(_))
    }
}

/// One-shot startup sequence
#[derive(Debug)]
pub struct Bootstrap {
    auth: AuthGateway,
    session: SessionStore,
    csrf: CsrfConfig,
    outcome: OnceCell<BootstrapOutcome>,
}

impl Bootstrap {
    pub fn new(auth: AuthGateway, session: SessionStore, csrf: CsrfConfig) -> Self {
        Self {
            auth,
            session,
            csrf,
            outcome: OnceCell::new(),
        }
    }

    /// Runs the sequence, or returns the first run's outcome if it already ran
    pub async fn run(&self) -> BootstrapOutcome {
        if let Some(outcome) = self.outcome.get() {
            tracing::debug!("Bootstrap already ran, returning first outcome");
            return outcome.clone();
        }

        self.outcome.get_or_init(|| self.sequence()).await.clone()
    }

    /// Outcome of the completed run, if any
    pub fn outcome(&self) -> Option<&BootstrapOutcome> {
        self.outcome.get()
    }

    async fn sequence(&self) -> BootstrapOutcome {
        tracing::info!("Bootstrapping session");
        self.session.set_status(AuthStatus::Loading).await;

        if let Err(reason) = self.prepare_csrf().await {
            return self.finish_logged_out(reason).await;
        }

        let token = match self.session.persisted_token() {
            Ok(Some(token)) => token,
            Ok(None) => return self.finish_logged_out(LoggedOutReason::NoStoredToken).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored token");
                return self
                    .finish_logged_out(LoggedOutReason::Storage(e.to_string()))
                    .await;
            }
        };

        let verified = match self.auth.verify().await {
            Ok(response) => response
                .authenticated_user()
                .ok_or_else(|| "server reported the session as unauthenticated".to_string()),
            Err(e) => Err(e.to_string()),
        };

        match verified {
            Ok(user) => match self.session.login_success(token, user.clone()).await {
                Ok(()) => {
                    tracing::info!(user_id = user.id, "Stored session verified");
                    BootstrapOutcome::Authenticated(user)
                }
                Err(e) => {
                    self.finish_logged_out(LoggedOutReason::Storage(e.to_string()))
                        .await
                }
            },
            Err(reason) => {
                tracing::warn!(%reason, "Stored session rejected");
                self.finish_logged_out(LoggedOutReason::VerificationFailed(reason))
                    .await
            }
        }
    }

    /// Steps 1 and 2; `Err` only when the failure policy says abort
    async fn prepare_csrf(&self) -> Result<(), LoggedOutReason> {
        let failure = match self.auth.fetch_csrf_token().await {
            Ok(token) => match self.csrf.settle {
                CsrfSettle::Delay => {
                    tokio::time::sleep(self.csrf.settle_delay()).await;
                    None
                }
                CsrfSettle::Confirm if token.is_some() => None,
                CsrfSettle::Confirm => Some(format!(
                    "no {} cookie after CSRF request",
                    self.csrf.cookie_name
                )),
            },
            Err(e) => Some(e.to_string()),
        };

        let Some(message) = failure else {
            tracing::debug!("CSRF token ready");
            return Ok(());
        };

        match self.csrf.on_failure {
            CsrfFailurePolicy::Continue => {
                tracing::warn!(error = %message, "Failed to obtain CSRF token, continuing");
                Ok(())
            }
            CsrfFailurePolicy::Abort => {
                tracing::error!(error = %message, "Failed to obtain CSRF token");
                Err(LoggedOutReason::CsrfUnavailable(message))
            }
        }
    }

    async fn finish_logged_out(&self, reason: LoggedOutReason) -> BootstrapOutcome {
        tracing::info!(%reason, "Starting logged out");
        self.session.logout_success().await;
        self.session.set_status(AuthStatus::Idle).await;
        BootstrapOutcome::LoggedOut(reason)
    }
}

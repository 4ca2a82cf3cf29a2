/// Configuration management for the Taskboard client
///
/// Configuration is layered, later sources overriding earlier ones:
///
/// 1. Built-in defaults
/// 2. Optional config file (`taskboard.toml` in the working directory, or
///    the path given by `TASKBOARD_CONFIG`)
/// 3. Environment variables prefixed with `TASKBOARD_` (a `.env` file is
///    loaded first if present)
///
/// # Environment Variables
///
/// - `TASKBOARD_API__BASE_URL`: REST API base URL (required)
/// - `TASKBOARD_API__TIMEOUT_SECS`: Per-request timeout (default: 10)
/// - `TASKBOARD_AUTH__TOKEN_PATH`: Token file (default: ~/.config/taskboard/auth.json)
/// - `TASKBOARD_CSRF__COOKIE_NAME`: CSRF cookie name (default: csrfToken)
/// - `TASKBOARD_CSRF__HEADER_NAME`: CSRF header name (default: X-CSRF-TOKEN)
/// - `TASKBOARD_CSRF__ON_FAILURE`: `continue` or `abort` (default: continue)
/// - `TASKBOARD_CSRF__SETTLE`: `confirm` or `delay` (default: confirm)
/// - `TASKBOARD_CSRF__SETTLE_DELAY_MS`: Delay for `settle = delay` (default: 100)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use taskboard_client::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Talking to {}", config.api.base_url);
/// # Ok(())
/// # }
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default post-CSRF settle delay when `settle = delay`
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// REST API configuration
    pub api: ApiConfig,

    /// Token persistence
    #[serde(default)]
    pub auth: AuthConfig,

    /// CSRF handling
    #[serde(default)]
    pub csrf: CsrfConfig,
}

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: String,

    /// Blanket per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Token persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token file; `None` means the default location
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

/// What the bootstrap does when the CSRF token cannot be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsrfFailurePolicy {
    /// Log and carry on to session verification
    #[default]
    Continue,

    /// Treat the failure as fatal for the session: log out
    Abort,
}

/// How the bootstrap waits for the CSRF cookie before verifying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsrfSettle {
    /// Read the token back from the cookie jar / response
    #[default]
    Confirm,

    /// Sleep for `settle_delay_ms`
    Delay,
}

/// CSRF configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Cookie the backend sets with the CSRF token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Header the token is mirrored into
    #[serde(default = "default_header_name")]
    pub header_name: String,

    #[serde(default)]
    pub on_failure: CsrfFailurePolicy,

    #[serde(default)]
    pub settle: CsrfSettle,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            header_name: default_header_name(),
            on_failure: CsrfFailurePolicy::default(),
            settle: CsrfSettle::default(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl CsrfConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_cookie_name() -> String {
    "csrfToken".to_string()
}

fn default_header_name() -> String {
    "X-CSRF-TOKEN".to_string()
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl Config {
    /// Loads configuration from defaults, the optional config file and
    /// environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TASKBOARD_API__BASE_URL` (or `api.base_url` in the file) is missing
    /// - A value has the wrong type
    /// - The base URL is not an http(s) URL, or the timeout is zero
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let file = std::env::var("TASKBOARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskboard.toml"));

        Self::load(Some(&file))
    }

    /// Loads configuration from an explicit file plus environment variables
    ///
    /// A missing file is not an error.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("csrf.settle_delay_ms", DEFAULT_SETTLE_DELAY_MS as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("TASKBOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Configuration for a base URL with every other value defaulted
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            auth: AuthConfig::default(),
            csrf: CsrfConfig::default(),
        }
    }

    /// Checks values that deserialize fine but cannot work
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow::anyhow!("api.base_url is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api.base_url must use http or https, got {}", url.scheme());
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }

        if self.csrf.cookie_name.trim().is_empty() || self.csrf.header_name.trim().is_empty() {
            anyhow::bail!("csrf.cookie_name and csrf.header_name must not be empty");
        }

        Ok(())
    }

    /// Base URL normalized to end with `/` so relative paths join under it
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

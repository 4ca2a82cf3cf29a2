/// Error handling for the Taskboard client
///
/// Every gateway and controller operation returns `ClientResult<T>`. HTTP
/// failures are classified once, in the HTTP core, so callers match on
/// intent (`Unauthorized`, `Validation`, ...) rather than on status codes.
///
/// # Status mapping
///
/// | Response | Error |
/// |---|---|
/// | transport failure | `Network` |
/// | timeout | `Timeout` |
/// | 401 | `Unauthorized` (session is force-logged-out first) |
/// | 404 | `NotFound` |
/// | other 4xx | `Validation` (message + field details when given) |
/// | 5xx | `Server` |
/// | undecodable 2xx body | `MalformedResponse` |
///
/// # Example
///
/// ```
/// use taskboard_client::error::ClientError;
///
/// let err = ClientError::Unauthorized("Token expired".to_string());
/// assert!(err.is_unauthorized());
/// assert_eq!(err.user_message(), "Token expired");
/// ```

use serde::Deserialize;
use taskboard_shared::board::PolicyViolation;
use taskboard_shared::storage::StorageError;
use taskboard_shared::validation::ValidationErrorDetail;

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Message used when the backend gives no usable one
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Unified client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// 401 from any endpoint, or no token where one is required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login rejected
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Local validation failure or a 4xx rejection
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx whose body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Board rule refused the operation before any request was sent
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// Token storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Validation error from local field checks
    pub fn from_details(details: Vec<ValidationErrorDetail>) -> Self {
        let message = details
            .first()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());
        ClientError::Validation { message, details }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Short message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Could not reach the server".to_string(),
            ClientError::Timeout => "The server took too long to respond".to_string(),
            ClientError::Unauthorized(msg)
            | ClientError::InvalidCredentials(msg)
            | ClientError::NotFound(msg)
            | ClientError::Server { message: msg, .. } => msg.clone(),
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::MalformedResponse(_) => FALLBACK_MESSAGE.to_string(),
            ClientError::Policy(violation) => violation.to_string(),
            ClientError::Storage(_) => "Could not access saved session".to_string(),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    /// Classifies a non-success response
    ///
    /// `body` is the raw response text; a JSON `message` field is surfaced
    /// verbatim, anything else becomes [`FALLBACK_MESSAGE`].
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        let message = parsed.message;

        match status {
            401 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            400..=499 => ClientError::Validation {
                message,
                details: parsed.details,
            },
            _ => ClientError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::MalformedResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

/// Backend error body, as far as it can be understood
#[derive(Debug, Default, PartialEq)]
struct ErrorBody {
    message: String,
    details: Vec<ValidationErrorDetail>,
}

#[derive(Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    message: Option<String>,

    #[serde(default, alias = "errors")]
    details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        let raw: Option<RawErrorBody> = serde_json::from_str(body).ok();

        let message = raw
            .as_ref()
            .and_then(|r| r.message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        // Details are optional and their shape is not guaranteed
        let details = raw
            .and_then(|r| r.details)
            .and_then(|v| serde_json::from_value::<Vec<ValidationErrorDetail>>(v).ok())
            .unwrap_or_default();

        ErrorBody { message, details }
    }
}

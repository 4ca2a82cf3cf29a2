/// Authentication types
///
/// The backend does all credential checking; this module holds the request
/// and response bodies for the auth endpoints and the local validation that
/// runs before a form is submitted.
///
/// # Modules
///
/// - [`credentials`]: Login/registration/verify bodies
/// - [`password`]: Password strength rules for new accounts
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::credentials::Registration;
/// use taskboard_shared::validation::check;
///
/// let form = Registration {
///     username: "ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password: "Tomato-Basil-42".to_string(),
///     confirm_password: "Tomato-Basil-42".to_string(),
/// };
/// assert!(check(&form).is_ok());
/// ```

pub mod credentials;
pub mod password;

pub use credentials::{Credentials, LoginResponse, Registration, VerifyResponse};

/// Password strength rules for registration
///
/// The backend stores and hashes passwords; the client only refuses to send
/// a registration whose password would be rejected anyway.
///
/// # Rules
///
/// - At least 12 characters
/// - At least one uppercase letter, one lowercase letter and one digit
/// - At least one character that is not an ASCII letter or digit
/// - Not one of a short list of passwords known to pass the rules above
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Tomato-Basil-42").is_ok());
/// assert!(validate_password_strength("short").is_err());
/// ```

use validator::ValidationError;

use crate::validation::error_with_message;

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Passwords that satisfy the character rules but are too common to allow
const COMMON_PASSWORDS: [&str; 2] = ["Password123!", "Aa3456789012"];

/// Validates password strength
///
/// Returns the first rule the password breaks, as a user-facing message.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Must contain at least one number".to_string());
    }

    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err("Must contain at least one special character".to_string());
    }

    if COMMON_PASSWORDS.contains(&password) {
        return Err("Password is too common".to_string());
    }

    Ok(())
}

/// `validator` adapter for [`validate_password_strength`]
pub(crate) fn strong_password(password: &str) -> Result<(), ValidationError> {
    validate_password_strength(password).map_err(|message| {
        let mut error = error_with_message("weak_password", "Password is too weak");
        error.message = Some(message.into());
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_strength_valid() {
        assert!(validate_password_strength("Tomato-Basil-42").is_ok());
        assert!(validate_password_strength("C0rrect horse!").is_ok());
    }

    #[test]
    fn test_validate_password_strength_too_short() {
        let result = validate_password_strength("Ab1!");
        assert_eq!(result.unwrap_err(), "Password must be at least 12 characters");
    }

    #[test]
    fn test_validate_password_strength_no_uppercase() {
        let result = validate_password_strength("tomato-basil-42");
        assert!(result.unwrap_err().contains("uppercase"));
    }

    #[test]
    fn test_validate_password_strength_no_lowercase() {
        let result = validate_password_strength("TOMATO-BASIL-42");
        assert!(result.unwrap_err().contains("lowercase"));
    }

    #[test]
    fn test_validate_password_strength_no_digit() {
        let result = validate_password_strength("Tomato-Basil-xx");
        assert!(result.unwrap_err().contains("number"));
    }

    #[test]
    fn test_validate_password_strength_no_special() {
        let result = validate_password_strength("TomatoBasil42");
        assert!(result.unwrap_err().contains("special"));
    }

    #[test]
    fn test_validate_password_strength_common() {
        let result = validate_password_strength("Password123!");
        assert_eq!(result.unwrap_err(), "Password is too common");
    }

    #[test]
    fn test_strong_password_carries_message() {
        let error = strong_password("short").unwrap_err();
        assert_eq!(error.code, "weak_password");
        assert_eq!(
            error.message.as_deref(),
            Some("Password must be at least 12 characters")
        );
    }
}

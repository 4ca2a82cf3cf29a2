/// Field-level validation helpers
///
/// Inputs are validated with the `validator` derive before anything is sent
/// to the backend. This module flattens `validator`'s nested error map into a
/// list of `{field, message}` pairs that callers can show next to the
/// offending form field.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError, ValidationErrors};

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` errors into field/message pairs
///
/// Output is sorted by field name so messages are stable across runs.
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Runs `Validate::validate` and returns the flattened details on failure
pub fn check<T: Validate>(input: &T) -> Result<(), Vec<ValidationErrorDetail>> {
    input.validate().map_err(|e| collect_field_errors(&e))
}

/// Builds a `ValidationError` carrying a human-readable message
pub(crate) fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Rejects strings that are empty after trimming
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", "This field is required"));
    }
    Ok(())
}

/// Accepts a blank value or a valid URL
pub(crate) fn blank_or_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_url() {
        return Ok(());
    }
    Err(error_with_message("url", "Please enter a valid image URL"))
}

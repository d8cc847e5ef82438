//! Validation error shared by every layer that checks caller input.

use thiserror::Error;

/// Result type alias for validation checks.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// A caller-supplied value is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field, as the caller spelled it.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required field was absent or blank.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

/// Fail with [`ValidationError::missing`] when `value` is empty or whitespace.
pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

//! Errors raised by the matching and scoring pipeline.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Password is {length} characters long, the maximum accepted is {max}")]
    PasswordTooLong { length: usize, max: usize },
    #[error("Evaluation cancelled")]
    Cancelled,
    #[error("Invalid regex pattern for matcher '{name}': {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Rejects the empty password. Every matcher entry point goes through here.
pub(crate) fn ensure_not_empty(password: &str) -> Result<(), EstimateError> {
    if password.is_empty() {
        return Err(EstimateError::EmptyPassword);
    }
    Ok(())
}

use thiserror::Error;

/// A structural validation failure on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// JSON name of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

/// Failure raised by a lifecycle hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-validation fault inside a domain hook (hashing, encoding, ...).
    #[error("hook failed: {0}")]
    Internal(String),
}

impl HookError {
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

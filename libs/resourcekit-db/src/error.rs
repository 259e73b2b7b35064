use resourcekit_meta::{HookError, ValidationError};
use sea_orm::DbErr;
use thiserror::Error;

/// Failure of a generic resource operation.
///
/// Only the HTTP layer turns these into status codes; everything below it propagates them
/// untouched.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("invalid request body: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("invalid id: {0}")]
    MalformedId(String),

    #[error("invalid filter on '{field}': {message}")]
    InvalidFilter { field: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(#[from] DbErr),
}

impl ResourceError {
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    #[must_use]
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    #[must_use]
    pub fn malformed_id(raw: impl Into<String>) -> Self {
        Self::MalformedId(raw.into())
    }

    #[must_use]
    pub fn invalid_filter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// `true` for failures caused by the caller's input rather than by the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::Store(_))
    }
}

impl From<HookError> for ResourceError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::Validation(v) => Self::Validation(v),
            HookError::Internal(msg) => Self::Internal(msg),
        }
    }
}

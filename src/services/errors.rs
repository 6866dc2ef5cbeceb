use thiserror::Error;
use validator::ValidationErrors;

/// Classified outcome of a CRUD function. Callers show the message; the
/// underlying cause of `Internal` is already logged with context.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

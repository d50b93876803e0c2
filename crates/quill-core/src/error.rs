//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query execution failed: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("resource not found".to_string()),
            RepoError::Constraint(msg) => DomainError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

//! Domain errors for the Precedent engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the Precedent system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Filing registry error: {0}")]
    RegistryError(String),

    #[error("Text backend error: {0}")]
    BackendError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

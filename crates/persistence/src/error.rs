//! Repository error type.

use domain::DomainError;
use shared::pagination::CursorError;
use thiserror::Error;

use crate::db::ConnectionError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// The save-time transform rejected the document.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0} not found")]
    NotFound(String),

    /// A unique index rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    InvalidCursor(#[from] CursorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        RepositoryError::NotFound(what.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    /// The domain error, when the save-time transform failed.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            RepositoryError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Record".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => RepositoryError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("duplicate value violates {}", c))
                        .unwrap_or_else(|| "Resource already exists".into()),
                ),
                // foreign_key_violation
                Some("23503") => RepositoryError::NotFound("Referenced record".into()),
                _ => RepositoryError::Database(sqlx::Error::Database(db_err)),
            },
            other => RepositoryError::Database(other),
        }
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        RepositoryError::Internal(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn test_domain_error_passthrough() {
        let err: RepositoryError = DomainError::rule("Scheduled pages require a scheduled date").into();
        assert!(err.domain().is_some());
        assert_eq!(err.to_string(), "Scheduled pages require a scheduled date");
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_pool_closed_is_database_error() {
        let err: RepositoryError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}

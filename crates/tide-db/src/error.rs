//! Database error types for tide-db.

use thiserror::Error;
use tide_engine::StoreError;

use crate::retry::is_transient_error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The write would leave a task in an invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Convert to a [`StoreError`], reporting a missing row as `NotFound { id }`.
    #[must_use]
    pub fn for_task(self, id: &str) -> StoreError {
        match self {
            Self::NoResult => StoreError::NotFound { id: id.to_string() },
            other => other.into(),
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::InvalidState(message) => Self::Rejected(message),
            DatabaseError::LibSql(ref e) if is_transient_error(e) => {
                Self::Unavailable(error.to_string())
            }
            other => Self::Other(other.into()),
        }
    }
}

// Store error taxonomy

use thiserror::Error;

/// Failure of an [`ExpenseStore`](crate::db::ExpenseStore) operation.
///
/// Both variants carry the name of the operation that failed. Nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected by a column constraint (bad cadence, empty name,
    /// non-positive amount, missing required value)
    #[error("{operation}: rejected by schema constraint: {message}")]
    Validation {
        operation: &'static str,
        message: String,
    },

    /// Any other SQLite fault: I/O, locking, corrupt rows
    #[error("{operation} failed: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// Classify a SQLite error raised while running `operation`
    pub fn from_sqlite(operation: &'static str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Validation {
                    operation,
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            other => StoreError::Storage {
                operation,
                source: other,
            },
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::Validation { operation, .. } | StoreError::Storage { operation, .. } => {
                operation
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Adapter for `map_err`: `.map_err(op("create"))`
pub(crate) fn op(operation: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |err| StoreError::from_sqlite(operation, err)
}

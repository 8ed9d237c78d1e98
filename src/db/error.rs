use rusqlite::ErrorCode;
use std::path::Path;
use thiserror::Error;

/// Failures reported by [`super::TransactionStore`]. Engine errors are
/// translated here and never returned raw.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Cannot open database {path}: {message}")]
    Connection { path: String, message: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn connection(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Connection {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                Self::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Returned by [`super::TransactionStore::insert_all`] when a row fails.
/// Rows before it stay stored; `stored` lists their ids.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("stored {} of {total} transactions, row {} failed: {source}", .stored.len(), .stored.len() + 1)]
pub struct BatchInsertError {
    pub stored: Vec<i64>,
    pub total: usize,
    pub source: StoreError,
}

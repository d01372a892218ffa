//! Error types for record store operations

use thiserror::Error;

/// Result type for record store operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum RecordError {
    /// Underlying SQLite failure
    #[error("record database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking writer
    #[error("record database lock poisoned")]
    LockPoisoned,
}

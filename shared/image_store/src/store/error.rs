//! Error types for object store operations

use std::time::Duration;

use thiserror::Error;

use crate::record::RecordError;

/// Result type for object store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during object store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Upload exceeds the per-request size ceiling
    #[error("file too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge {
        /// Size of the rejected upload in bytes
        size: u64,
        /// Configured per-request maximum in bytes
        max: u64,
    },

    /// Requested time-to-live exceeds the configured maximum
    #[error("invalid ttl: {} seconds exceeds the {} second limit", ttl.as_secs(), max.as_secs())]
    InvalidTtl {
        /// Requested time-to-live
        ttl: Duration,
        /// Configured maximum time-to-live
        max: Duration,
    },

    /// No record exists for the given id
    #[error("image not found: {0}")]
    NotFound(String),

    /// Record database failure
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Filesystem failure
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

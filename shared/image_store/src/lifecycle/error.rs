//! Error types for lifecycle operations

use thiserror::Error;

use crate::quota::QuotaError;
use crate::store::StoreError;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors surfaced by the lifecycle coordinator
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The create would push the owner over the storage ceiling
    #[error("quota exceeded: {used} bytes held plus {incoming} incoming exceeds the {ceiling} byte ceiling")]
    QuotaExceeded {
        /// Bytes currently held under the owner's namespace
        used: u64,
        /// Size of the incoming upload in bytes
        incoming: u64,
        /// Configured per-owner ceiling in bytes
        ceiling: u64,
    },

    /// The requesting identity does not own the object, or an anonymous-pool
    /// deletion was attempted
    #[error("not authorized to delete this object")]
    Unauthorized,

    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QuotaError> for LifecycleError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::Exceeded {
                used,
                incoming,
                ceiling,
            } => Self::QuotaExceeded {
                used,
                incoming,
                ceiling,
            },
            QuotaError::Store(err) => Self::Store(err),
        }
    }
}

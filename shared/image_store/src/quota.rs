//! Per-owner storage quota gate

use thiserror::Error;

use crate::store::{ObjectStore, StoreError};

/// Result type for quota checks
pub type QuotaResult<T> = Result<T, QuotaError>;

/// Errors that can occur during quota checks
#[derive(Error, Debug)]
pub enum QuotaError {
    /// The create would push the owner over the configured ceiling
    #[error("quota exceeded: {used} bytes held plus {incoming} incoming exceeds the {ceiling} byte ceiling")]
    Exceeded {
        /// Bytes currently held under the owner's namespace
        used: u64,
        /// Size of the incoming upload in bytes
        incoming: u64,
        /// Configured per-owner ceiling in bytes
        ceiling: u64,
    },

    /// The current usage could not be computed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Enforces the per-owner storage ceiling
///
/// The check recomputes the owner's on-disk total on every call and runs
/// before any byte of the new upload is persisted (check-then-write). No
/// reservation is held between check and write, so concurrent uploads from
/// one owner can jointly exceed the ceiling: a soft limit, not a hard
/// allocation guarantee.
#[derive(Debug, Clone, Copy)]
pub struct QuotaEnforcer {
    ceiling: u64,
}

impl QuotaEnforcer {
    /// Creates an enforcer with the given byte ceiling
    #[must_use]
    pub const fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    /// Rejects the incoming upload if it would push the owner over the
    /// ceiling
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Exceeded` when over the ceiling and
    /// `QuotaError::Store` if the owner's usage cannot be computed
    pub async fn check(
        &self,
        store: &ObjectStore,
        owner: &str,
        incoming: u64,
    ) -> QuotaResult<()> {
        let used = store.total_bytes(owner).await?;
        if used + incoming > self.ceiling {
            return Err(QuotaError::Exceeded {
                used,
                incoming,
                ceiling: self.ceiling,
            });
        }
        Ok(())
    }
}

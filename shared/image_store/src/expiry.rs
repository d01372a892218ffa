//! Lazy per-owner expiry of time-limited objects

use chrono::Utc;
use tracing::{info, warn};

use crate::store::{ObjectStore, StoreError, StoreResult};

/// Reaps expired objects on access
///
/// Runs at the start of every authenticated listing for that caller's
/// namespace only; there is no background sweep. An expired object that is
/// never listed again is never reclaimed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryReaper;

impl ExpiryReaper {
    /// Deletes every object of `owner` whose time-to-live has elapsed
    ///
    /// Candidates are snapshotted first and deleted in a separate pass, so
    /// the scan never mutates a collection it is still iterating. Returns the
    /// number of objects reaped.
    ///
    /// # Errors
    ///
    /// Returns a store error if the snapshot cannot be collected
    pub async fn reap(&self, store: &ObjectStore, owner: &str) -> StoreResult<usize> {
        let candidates = store.expired(owner, Utc::now())?;
        let mut reaped = 0;
        for record in candidates {
            match store.delete(&record.id).await {
                Ok(()) => {
                    info!(id = %record.id, owner, "reaped expired object");
                    reaped += 1;
                }
                // A concurrent delete got there first; nothing left to reap.
                Err(StoreError::NotFound(_)) => {}
                Err(err) => {
                    warn!(id = %record.id, owner, error = %err, "failed to reap expired object");
                }
            }
        }
        Ok(reaped)
    }
}

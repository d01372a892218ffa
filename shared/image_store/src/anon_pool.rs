//! Bounded anonymous pool: count-based eviction and variant promotion

use tracing::info;

use crate::store::{ObjectStore, StoreResult};

/// Manages the shared anonymous namespace
///
/// The pool is bounded by object count, not bytes: once it holds more than
/// the configured maximum, the oldest object (by creation time, insertion
/// order as tiebreaker) is evicted through the store's shared delete routine.
/// Promotion folds a finished derived variant into the original slot so a
/// full-resolution anonymous upload is never served once a thumbnail exists.
#[derive(Debug, Clone, Copy)]
pub struct AnonymousPool {
    max_objects: u64,
}

impl AnonymousPool {
    /// Creates a pool manager with the given object-count bound
    #[must_use]
    pub const fn new(max_objects: u64) -> Self {
        Self { max_objects }
    }

    /// Evicts oldest objects until the pool is back at its bound
    ///
    /// Runs after an anonymous create persists and before an anonymous
    /// listing is materialized. Each eviction removes the record and its
    /// backing files together.
    ///
    /// # Errors
    ///
    /// Returns a store error if counting or deleting fails
    pub async fn enforce_bound(&self, store: &ObjectStore) -> StoreResult<()> {
        while store.count(None)? > self.max_objects {
            let Some(oldest) = store.oldest(None)? else {
                break;
            };
            info!(id = %oldest.id, "evicting oldest anonymous object");
            store.delete(&oldest.id).await?;
        }
        Ok(())
    }

    /// Promotes the derived variant of one pool object, if its file exists
    ///
    /// Runs after the listing rows for the current request have been
    /// materialized; only the filesystem and the record slots change, so the
    /// already-returned rows are unaffected and the next read reflects the
    /// promoted path.
    ///
    /// # Errors
    ///
    /// Returns a store error if the promotion rename or slot update fails
    pub async fn promote_derived(&self, store: &ObjectStore, id: &str) -> StoreResult<()> {
        store.promote_derived(id).await
    }
}

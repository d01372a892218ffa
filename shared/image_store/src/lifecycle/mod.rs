//! Lifecycle coordinator tying the store, quota, pool and reaper together
//!
//! One request runs its phases strictly in sequence: validate, quota or
//! bound check, persist, derive, respond. Eviction and expiry execute inline
//! within the request that triggers them; there is no background worker.

mod error;

use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use crate::anon_pool::AnonymousPool;
use crate::expiry::ExpiryReaper;
use crate::quota::QuotaEnforcer;
use crate::record::ImageRecord;
use crate::resize::{ImageResizer, ResizeTarget};
use crate::store::ObjectStore;

pub use error::{LifecycleError, LifecycleResult};

/// Coordinates gating, persistence and policy for every image operation
pub struct ImageLifecycle {
    store: ObjectStore,
    quota: QuotaEnforcer,
    pool: AnonymousPool,
    reaper: ExpiryReaper,
    resizer: Arc<dyn ImageResizer>,
    target: ResizeTarget,
}

impl ImageLifecycle {
    /// Creates a coordinator over `store`, deriving variants with `resizer`
    #[must_use]
    pub fn new(store: ObjectStore, resizer: Arc<dyn ImageResizer>) -> Self {
        let config = store.config();
        let quota = QuotaEnforcer::new(config.owner_quota_bytes);
        let pool = AnonymousPool::new(config.anonymous_pool_max);
        let target = ResizeTarget::new(config.derived_long_edge, config.derived_quality);
        Self {
            store,
            quota,
            pool,
            reaper: ExpiryReaper,
            resizer,
            target,
        }
    }

    /// The underlying object store
    #[must_use]
    pub const fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Accepts an anonymous upload into the shared pool
    ///
    /// Validates the size, persists the original, evicts the oldest pool
    /// objects past the bound and derives the resized variant. A failed
    /// resize is non-fatal: the original stays valid and servable.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` for size validation and persistence
    /// failures
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn create_anonymous(&self, bytes: Vec<u8>) -> LifecycleResult<ImageRecord> {
        self.store.validate(bytes.len() as u64, None)?;
        let record = self.store.create(None, &bytes, None).await?;
        self.pool.enforce_bound(&self.store).await?;
        Ok(self.derive(record, bytes).await)
    }

    /// Accepts an authenticated upload into the owner's namespace
    ///
    /// Size and time-to-live are validated before the quota is computed, and
    /// the quota before any byte is persisted; a rejected create leaves no
    /// partial state.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::QuotaExceeded` when over the owner's ceiling
    /// and `LifecycleError::Store` for validation and persistence failures
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn create_authenticated(
        &self,
        owner: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> LifecycleResult<ImageRecord> {
        self.store.validate(bytes.len() as u64, ttl)?;
        self.quota
            .check(&self.store, owner, bytes.len() as u64)
            .await?;
        let record = self.store.create(Some(owner), &bytes, ttl).await?;
        Ok(self.derive(record, bytes).await)
    }

    /// Deletes an object on behalf of `requesting_owner`
    ///
    /// The requesting identity must equal the object's owner; anonymous-pool
    /// objects cannot be deleted by callers at all.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Unauthorized` on an ownership mismatch and
    /// `LifecycleError::Store(StoreError::NotFound)` for unknown ids
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str, requesting_owner: &str) -> LifecycleResult<()> {
        let record = self.store.get(id)?;
        match record.owner.as_deref() {
            Some(owner) if owner == requesting_owner => {
                self.store.delete(id).await?;
                Ok(())
            }
            _ => Err(LifecycleError::Unauthorized),
        }
    }

    /// Lists a namespace, applying its access-time policy first
    ///
    /// Authenticated: reap the caller's expired objects, then list.
    /// Anonymous: enforce the pool bound, materialize the listing, then
    /// promote finished derived variants; the returned rows are the
    /// pre-promotion ones, the next read reflects the promoted paths.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` on store failures
    #[instrument(skip(self))]
    pub async fn list(&self, owner: Option<&str>) -> LifecycleResult<Vec<ImageRecord>> {
        match owner {
            Some(owner) => {
                self.reaper.reap(&self.store, owner).await?;
                Ok(self.store.list(Some(owner))?)
            }
            None => {
                self.pool.enforce_bound(&self.store).await?;
                let records = self.store.list(None)?;
                for record in &records {
                    if let Err(err) = self.pool.promote_derived(&self.store, &record.id).await {
                        warn!(id = %record.id, error = %err, "failed to promote derived variant");
                    }
                }
                Ok(records)
            }
        }
    }

    /// Reads the served artifact of an object for the content route
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store(StoreError::NotFound)` if the record or
    /// its backing file is missing
    pub async fn serve(&self, id: &str) -> LifecycleResult<(ImageRecord, Vec<u8>)> {
        Ok(self.store.read_served(id).await?)
    }

    /// Derives the resized variant; failure leaves the original servable
    async fn derive(&self, record: ImageRecord, bytes: Vec<u8>) -> ImageRecord {
        let derived = match self.resizer.resize(bytes, self.target).await {
            Ok(derived) => derived,
            Err(err) => {
                warn!(id = %record.id, error = %err, "resize failed; serving original only");
                return record;
            }
        };
        match self.store.attach_derived(&record.id, &derived).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!(id = %record.id, error = %err, "failed to attach derived variant");
                record
            }
        }
    }
}

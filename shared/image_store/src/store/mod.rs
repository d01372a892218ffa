//! Filesystem-backed image object store
//!
//! Persists image bytes under per-owner directories and keeps the matching
//! metadata records in the embedded [`RecordStore`]. All three destruction
//! paths (explicit delete, pool eviction, expiry) funnel through
//! [`ObjectStore::delete`], so a record never outlives its backing files and
//! vice versa.

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::record::{ImageRecord, RecordStore};

pub use error::{StoreError, StoreResult};

/// Directory name of the shared identity-less namespace
pub const ANONYMOUS_NAMESPACE: &str = "anonymous";

/// Object store combining per-owner file namespaces with metadata records
pub struct ObjectStore {
    records: RecordStore,
    config: StoreConfig,
}

impl ObjectStore {
    /// Opens the store rooted at the configured media directory, creating the
    /// directory and record database if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the media root cannot be created and
    /// `StoreError::Record` if the record database cannot be opened
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.media_root)?;
        let records = RecordStore::open(&config.db_path())?;
        Ok(Self { records, config })
    }

    /// The store's configuration
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Directory name of a namespace: the owner id, or the anonymous pool
    #[must_use]
    pub fn namespace(owner: Option<&str>) -> &str {
        owner.unwrap_or(ANONYMOUS_NAMESPACE)
    }

    /// Absolute location of a path stored relative to the media root
    #[must_use]
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        self.config.media_root.join(relative)
    }

    /// Validates upload size and time-to-live against the configured limits
    ///
    /// Runs before any byte is persisted; a rejected create leaves no file on
    /// disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FileTooLarge` or `StoreError::InvalidTtl`
    pub fn validate(&self, size: u64, ttl: Option<Duration>) -> StoreResult<()> {
        if size > self.config.max_upload_bytes {
            return Err(StoreError::FileTooLarge {
                size,
                max: self.config.max_upload_bytes,
            });
        }
        if let Some(ttl) = ttl {
            if ttl > self.config.max_ttl {
                return Err(StoreError::InvalidTtl {
                    ttl,
                    max: self.config.max_ttl,
                });
            }
        }
        Ok(())
    }

    /// Persists an upload and its metadata record
    ///
    /// Assigns the identity, writes the original file under the namespace
    /// directory and inserts the record. If the record insert fails the
    /// freshly written file is removed again, so a failed create leaves no
    /// partial state.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`ObjectStore::validate`],
    /// `StoreError::Io` if the file cannot be written and
    /// `StoreError::Record` if the record insert fails
    pub async fn create(
        &self,
        owner: Option<&str>,
        bytes: &[u8],
        ttl: Option<Duration>,
    ) -> StoreResult<ImageRecord> {
        self.validate(bytes.len() as u64, ttl)?;

        let id = Uuid::new_v4().simple().to_string();
        let namespace = Self::namespace(owner);
        let relative = format!("{namespace}/{id}.{}", extension_for(bytes));
        let absolute = self.absolute_path(&relative);

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, bytes).await?;

        let record = ImageRecord {
            id,
            owner: owner.map(ToString::to_string),
            original_path: relative,
            derived_path: None,
            ttl,
            created_at: Utc::now(),
        };
        if let Err(err) = self.records.insert(&record) {
            if let Err(remove_err) = tokio::fs::remove_file(&absolute).await {
                warn!(path = %absolute.display(), error = %remove_err, "failed to remove file after record insert failure");
            }
            return Err(err.into());
        }

        debug!(id = %record.id, namespace, size = bytes.len(), "stored image");
        Ok(record)
    }

    /// Writes the derived variant file and fills the record's derived slot
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists for `id`,
    /// `StoreError::Io` if the file cannot be written and
    /// `StoreError::Record` if the slot update fails
    pub async fn attach_derived(&self, id: &str, bytes: &[u8]) -> StoreResult<ImageRecord> {
        let record = self.get(id)?;
        let namespace = Self::namespace(record.owner.as_deref());
        let relative = format!(
            "{namespace}/{id}-{}.jpg",
            self.config.derived_long_edge
        );
        let absolute = self.absolute_path(&relative);

        tokio::fs::write(&absolute, bytes).await?;
        self.records.set_derived(id, &relative)?;
        self.get(id)
    }

    /// Fetches a record by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists for `id`
    pub fn get(&self, id: &str) -> StoreResult<ImageRecord> {
        self.records
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Lists all records in one namespace, oldest first
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Record` on database failure
    pub fn list(&self, owner: Option<&str>) -> StoreResult<Vec<ImageRecord>> {
        Ok(self.records.list(owner)?)
    }

    /// Number of records in one namespace
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Record` on database failure
    pub fn count(&self, owner: Option<&str>) -> StoreResult<u64> {
        Ok(self.records.count(owner)?)
    }

    /// Oldest record in one namespace, if any
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Record` on database failure
    pub fn oldest(&self, owner: Option<&str>) -> StoreResult<Option<ImageRecord>> {
        Ok(self.records.oldest(owner)?)
    }

    /// Snapshot of an owner's expired records at `now`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Record` on database failure
    pub fn expired(&self, owner: &str, now: DateTime<Utc>) -> StoreResult<Vec<ImageRecord>> {
        Ok(self.records.expired(owner, now)?)
    }

    /// Deletes a record and every backing file associated with it
    ///
    /// The record is removed first: metadata is the source of truth for
    /// listing and quota, and an orphaned file is a cleanup nuisance rather
    /// than a correctness violation. File-removal failures are logged and
    /// swallowed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists for `id` and
    /// `StoreError::Record` if the record deletion fails
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let record = self.get(id)?;
        self.records.delete(id)?;

        let mut paths = vec![record.original_path];
        if let Some(derived) = record.derived_path {
            paths.push(derived);
        }
        for relative in paths {
            let absolute = self.absolute_path(&relative);
            if let Err(err) = tokio::fs::remove_file(&absolute).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(id, path = %absolute.display(), error = %err, "failed to remove backing file");
                }
            }
        }
        debug!(id, "deleted image");
        Ok(())
    }

    /// Sum of the sizes of all files under an owner's namespace directory
    ///
    /// Walks the directory on every call; there is no cached counter to
    /// drift. O(files for that owner).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be read
    pub async fn total_bytes(&self, owner: &str) -> StoreResult<u64> {
        let mut total = 0;
        let mut pending = vec![self.config.media_root.join(owner)];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                } else {
                    total += metadata.len();
                }
            }
        }
        Ok(total)
    }

    /// Folds the derived variant into the original slot
    ///
    /// If the derived file exists on disk, the original file is removed and
    /// the derived file renamed onto the original path, making the
    /// full-resolution upload inaccessible. Idempotent: once the derived file
    /// is gone from its own name the operation is a no-op apart from healing
    /// a dangling derived slot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists for `id`,
    /// `StoreError::Io` if the rename fails and `StoreError::Record` if the
    /// slot update fails
    pub async fn promote_derived(&self, id: &str) -> StoreResult<()> {
        let record = self.get(id)?;
        let Some(derived_relative) = record.derived_path else {
            return Ok(());
        };
        let derived = self.absolute_path(&derived_relative);
        let original = self.absolute_path(&record.original_path);

        match tokio::fs::metadata(&derived).await {
            Ok(_) => {
                if let Err(err) = tokio::fs::remove_file(&original).await {
                    if err.kind() != std::io::ErrorKind::NotFound {
                        return Err(err.into());
                    }
                }
                tokio::fs::rename(&derived, &original).await?;
                self.records.clear_derived(id)?;
                debug!(id, "promoted derived variant");
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                // Already promoted but the slot update did not land; heal it.
                self.records.clear_derived(id)?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    /// Reads the bytes of the served artifact: derived slot if filled, else
    /// the original
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record or its backing file is
    /// missing
    pub async fn read_served(&self, id: &str) -> StoreResult<(ImageRecord, Vec<u8>)> {
        let record = self.get(id)?;
        let absolute = self.absolute_path(record.served_path());
        match tokio::fs::read(&absolute).await {
            Ok(bytes) => Ok((record, bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// File extension for an upload, guessed from its magic bytes
fn extension_for(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first())
        .copied()
        .unwrap_or("bin")
}

//! Storage limits and derived-variant parameters

use std::path::PathBuf;
use std::time::Duration;

/// Per-request upload ceiling: 8 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// Per-owner storage ceiling: 30 MiB
pub const DEFAULT_OWNER_QUOTA_BYTES: u64 = 30 * 1024 * 1024;

/// Maximum number of objects held in the shared anonymous pool
pub const DEFAULT_ANONYMOUS_POOL_MAX: u64 = 5;

/// Longest time-to-live an object may be created with: 30 days
pub const MAX_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Long edge of the derived (resized) variant in pixels
pub const DEFAULT_DERIVED_LONG_EDGE: u32 = 720;

/// JPEG quality of the derived variant
pub const DEFAULT_DERIVED_QUALITY: u8 = 70;

/// Configuration for the object store and its lifecycle policies
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for stored files; namespaced per owner below it
    pub media_root: PathBuf,
    /// Maximum size of a single upload in bytes
    pub max_upload_bytes: u64,
    /// Per-owner total storage ceiling in bytes
    pub owner_quota_bytes: u64,
    /// Maximum object count of the anonymous pool
    pub anonymous_pool_max: u64,
    /// Longest accepted time-to-live
    pub max_ttl: Duration,
    /// Long edge of the derived variant in pixels
    pub derived_long_edge: u32,
    /// JPEG quality of the derived variant
    pub derived_quality: u8,
}

impl StoreConfig {
    /// Creates a configuration with the default limits rooted at `media_root`
    #[must_use]
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            owner_quota_bytes: DEFAULT_OWNER_QUOTA_BYTES,
            anonymous_pool_max: DEFAULT_ANONYMOUS_POOL_MAX,
            max_ttl: MAX_TTL,
            derived_long_edge: DEFAULT_DERIVED_LONG_EDGE,
            derived_quality: DEFAULT_DERIVED_QUALITY,
        }
    }

    /// Path of the embedded record database under the media root
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.media_root.join("images.db")
    }
}

//! Environment configuration for different deployment stages

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use image_store::config::StoreConfig;
use tracing::warn;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the media root directory for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `MEDIA_ROOT` environment variable is not set outside of
    /// development
    #[must_use]
    pub fn media_root(&self) -> PathBuf {
        match self {
            Self::Production | Self::Staging => env::var("MEDIA_ROOT")
                .expect("MEDIA_ROOT environment variable is not set")
                .into(),
            Self::Development => env::var("MEDIA_ROOT")
                .unwrap_or_else(|_| "./media".to_string())
                .into(),
        }
    }

    /// Store configuration with the default limits, overridable through
    /// `MAX_UPLOAD_BYTES`, `OWNER_QUOTA_BYTES` and `ANONYMOUS_POOL_MAX`
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::new(self.media_root());
        if let Some(max) = parse_u64_var("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = max;
        }
        if let Some(quota) = parse_u64_var("OWNER_QUOTA_BYTES") {
            config.owner_quota_bytes = quota;
        }
        if let Some(bound) = parse_u64_var("ANONYMOUS_POOL_MAX") {
            config.anonymous_pool_max = bound;
        }
        config
    }

    /// Bearer token to owner-id map from the `API_KEYS` environment variable
    /// (`token:owner[,token:owner]*`)
    #[must_use]
    pub fn api_keys(&self) -> HashMap<String, String> {
        env::var("API_KEYS")
            .map(|raw| parse_api_keys(&raw))
            .unwrap_or_default()
    }
}

fn parse_u64_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|val| val.parse::<u64>().ok())
}

/// Owner ids double as directory names, so restrict their alphabet. The
/// anonymous pool's directory name is reserved.
fn valid_owner(owner: &str) -> bool {
    !owner.is_empty()
        && owner != image_store::store::ANONYMOUS_NAMESPACE
        && owner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_api_keys(raw: &str) -> HashMap<String, String> {
    let mut keys = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once(':') {
            Some((token, owner)) if !token.is_empty() && valid_owner(owner) => {
                keys.insert(token.to_string(), owner.to_string());
            }
            _ => warn!("Skipping malformed API_KEYS entry"),
        }
    }
    keys
}

//! Application state management

use std::collections::HashMap;
use std::sync::Arc;

use image_store::lifecycle::ImageLifecycle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Lifecycle coordinator over the object store
    pub lifecycle: Arc<ImageLifecycle>,
    /// Bearer token to owner-id map for authenticated requests
    pub api_keys: Arc<HashMap<String, String>>,
}

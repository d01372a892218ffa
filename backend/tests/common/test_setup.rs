use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use tempfile::TempDir;
use tower::ServiceExt;

use backend::{routes, state::AppState};
use image_store::config::StoreConfig;
use image_store::lifecycle::ImageLifecycle;
use image_store::resize::PixelResizer;
use image_store::store::ObjectStore;

/// Token resolving to the `alice` owner in tests
pub const ALICE_TOKEN: &str = "alice-token";
/// Token resolving to the `bob` owner in tests
pub const BOB_TOKEN: &str = "bob-token";

/// Test harness with the real router over a temp-dir store
pub struct TestSetup {
    pub router: Router,
    pub media_root: PathBuf,
    // Keep the temp dir alive for the duration of the test
    _dir: TempDir,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(adjust: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let media_root = dir.path().to_path_buf();
        let config = adjust(StoreConfig::new(&media_root));
        let store = ObjectStore::open(config).expect("failed to open store");
        let lifecycle = Arc::new(ImageLifecycle::new(store, Arc::new(PixelResizer::new())));

        let mut api_keys = HashMap::new();
        api_keys.insert(ALICE_TOKEN.to_string(), "alice".to_string());
        api_keys.insert(BOB_TOKEN.to_string(), "bob".to_string());

        let state = AppState {
            lifecycle,
            api_keys: Arc::new(api_keys),
        };

        Self {
            router: routes::routes().with_state(state),
            media_root,
            _dir: dir,
        }
    }

    /// POST raw bytes to `/v1/images`, optionally authenticated, with an
    /// optional query string such as `?ttl_secs=60`
    pub async fn upload(&self, bytes: Vec<u8>, token: Option<&str>, query: &str) -> Response {
        let mut builder = Request::builder()
            .uri(format!("/v1/images{query}"))
            .method("POST")
            .header("Content-Type", "application/octet-stream");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(bytes)).expect("invalid request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn send_get_request(&self, route: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("invalid request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn send_delete_request(&self, route: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("DELETE");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("invalid request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Files currently present under one namespace directory
    pub fn files_in(&self, namespace: &str) -> Vec<PathBuf> {
        std::fs::read_dir(self.media_root.join(namespace))
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default()
    }
}

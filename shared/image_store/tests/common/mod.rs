// Not every helper is used in every test file, so we allow dead code
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::TempDir;

use image_store::config::StoreConfig;
use image_store::lifecycle::ImageLifecycle;
use image_store::resize::{ImageResizer, PixelResizer, ResizeResult, ResizeTarget};
use image_store::store::ObjectStore;

/// A store rooted in a temp directory; the directory lives as long as the
/// harness
pub struct TestStore {
    pub lifecycle: ImageLifecycle,
    pub media_root: std::path::PathBuf,
    _dir: TempDir,
}

impl TestStore {
    /// Store with the production resizer and default limits
    pub fn new() -> Self {
        Self::build(|config| config, Arc::new(PixelResizer::new()))
    }

    /// Store with custom limits and the production resizer
    pub fn with_config(adjust: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        Self::build(adjust, Arc::new(PixelResizer::new()))
    }

    /// Store with a custom resizer
    pub fn with_resizer(resizer: Arc<dyn ImageResizer>) -> Self {
        Self::build(|config| config, resizer)
    }

    pub fn build(
        adjust: impl FnOnce(StoreConfig) -> StoreConfig,
        resizer: Arc<dyn ImageResizer>,
    ) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let media_root = dir.path().to_path_buf();
        let config = adjust(StoreConfig::new(&media_root));
        let store = ObjectStore::open(config).expect("failed to open store");
        Self {
            lifecycle: ImageLifecycle::new(store, resizer),
            media_root,
            _dir: dir,
        }
    }

    pub fn store(&self) -> &ObjectStore {
        self.lifecycle.store()
    }

    /// Absolute path of a stored relative path
    pub fn path(&self, relative: &str) -> std::path::PathBuf {
        self.media_root.join(relative)
    }

    /// Sum of file sizes under one namespace directory, computed
    /// independently of the store
    pub fn on_disk_bytes(&self, namespace: &str) -> u64 {
        let mut total = 0;
        let dir = self.media_root.join(namespace);
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                total += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        total
    }
}

/// Encoded PNG of the given dimensions, for upload payloads
pub fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 200, 90])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("failed to encode test image");
    out.into_inner()
}

/// Resizer that always returns the same fixed bytes
pub struct StaticResizer(pub Vec<u8>);

#[async_trait]
impl ImageResizer for StaticResizer {
    async fn resize(&self, _bytes: Vec<u8>, _target: ResizeTarget) -> ResizeResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Resizer that always fails, to exercise the degraded path
pub struct FailingResizer;

#[async_trait]
impl ImageResizer for FailingResizer {
    async fn resize(&self, _bytes: Vec<u8>, _target: ResizeTarget) -> ResizeResult<Vec<u8>> {
        let err = image::load_from_memory(&[]).expect_err("empty input never decodes");
        Err(err.into())
    }
}

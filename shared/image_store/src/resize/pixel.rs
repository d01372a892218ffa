//! Production resize backend over the `image` crate

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use super::{derived_dimensions, ImageResizer, ResizeResult, ResizeTarget};

/// Resizer decoding and re-encoding in memory with Lanczos3 resampling
///
/// Decoding and encoding are CPU-bound, so the work runs on the blocking
/// thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelResizer;

impl PixelResizer {
    /// Creates the production resizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn resize_blocking(bytes: &[u8], target: ResizeTarget) -> ResizeResult<Vec<u8>> {
        let source = image::load_from_memory(bytes)?;
        let (width, height) = derived_dimensions(source.width(), source.height(), target.long_edge);
        let resized = source.resize_exact(width, height, FilterType::Lanczos3);

        // JPEG output; flatten any alpha channel first.
        let resized = DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, target.quality);
        resized.write_with_encoder(encoder)?;
        Ok(out)
    }
}

#[async_trait]
impl ImageResizer for PixelResizer {
    async fn resize(&self, bytes: Vec<u8>, target: ResizeTarget) -> ResizeResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || Self::resize_blocking(&bytes, target)).await?
    }
}

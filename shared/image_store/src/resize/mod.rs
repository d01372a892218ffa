//! Image resize seam
//!
//! The store only needs "source bytes in, smaller encoded image out"; the
//! [`ImageResizer`] trait keeps that capability swappable and mockable. The
//! production backend lives in [`pixel`]; the dimension math is a pure
//! function so it can be tested without decoding anything.

mod error;
mod pixel;

use async_trait::async_trait;

pub use error::{ResizeError, ResizeResult};
pub use pixel::PixelResizer;

/// Target of a derived variant: fit to height, bound width proportionally,
/// cap the long edge
#[derive(Debug, Clone, Copy)]
pub struct ResizeTarget {
    /// Cap for the longer edge of the output in pixels
    pub long_edge: u32,
    /// JPEG quality of the output
    pub quality: u8,
}

impl ResizeTarget {
    /// Creates a target with the given long-edge cap and JPEG quality
    #[must_use]
    pub const fn new(long_edge: u32, quality: u8) -> Self {
        Self { long_edge, quality }
    }
}

/// Produces a resized re-encoding of an original image
#[async_trait]
pub trait ImageResizer: Send + Sync {
    /// Resizes `bytes` to the given target
    ///
    /// # Errors
    ///
    /// Returns a `ResizeError` if the bytes cannot be decoded or the variant
    /// cannot be encoded
    async fn resize(&self, bytes: Vec<u8>, target: ResizeTarget) -> ResizeResult<Vec<u8>>;
}

/// Output dimensions for a source of `width` x `height`: height scaled to
/// `long_edge`, width following the aspect ratio, then the width capped at
/// `long_edge` if the source is wide enough to overshoot it
#[must_use]
pub fn derived_dimensions(width: u32, height: u32, long_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (long_edge.max(1), long_edge.max(1));
    }
    let aspect = f64::from(width) / f64::from(height);
    let mut new_height = long_edge;
    let mut new_width = (aspect * f64::from(new_height)).round() as u32;
    if new_width > long_edge {
        new_width = long_edge;
        new_height = (f64::from(new_width) / aspect).round() as u32;
    }
    (new_width.max(1), new_height.max(1))
}

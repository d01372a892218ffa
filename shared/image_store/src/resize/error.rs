//! Error types for resize operations

use thiserror::Error;

/// Result type for resize operations
pub type ResizeResult<T> = Result<T, ResizeError>;

/// Errors that can occur while producing a derived variant
#[derive(Error, Debug)]
pub enum ResizeError {
    /// The source bytes could not be decoded or the variant not encoded
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// The blocking resize task was cancelled or panicked
    #[error("resize task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

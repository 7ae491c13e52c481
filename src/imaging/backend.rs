//! Image processing backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the two capabilities the pipeline needs
//! from an imaging library: identify (decode-only, for ingest) and resize
//! (decode, resample, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Backends hold no per-call state; every resize owns its own pixel
//! buffers, so one backend can serve many threads at once.

use super::calculations::Dimensions;
use super::params::{Encoded, ResizeParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The bytes are not a valid image in any compiled-in format.
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to resample image: {0}")]
    Resample(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Fully decode `bytes` and report the pixel size, so truncated or
    /// corrupt images are caught here rather than at resize time.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, fit into `params.target`, and encode with `params.codec`.
    fn resize(&self, params: &ResizeParams<'_>) -> Result<Encoded, BackendError>;
}

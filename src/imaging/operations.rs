//! High-level image operations.
//!
//! These functions combine codec selection with backend execution. They
//! decide *what* to produce for a stored file; the backend does the pixels.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{BoundingBox, Dimensions};
use super::codec::select_codec;
use super::params::{Encoded, Quality, ResizeParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Decoded pixel size of an uploaded original.
///
/// Used once at ingest to populate a stored file's width and height. Bytes
/// that don't decode are a [`BackendError::Decode`]; the upload must be
/// rejected.
pub fn extract_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<Dimensions> {
    backend.identify(bytes)
}

/// Resize `source` into `target` and encode it in the format `extension`
/// maps to, at maximum quality.
pub fn render_derivative(
    backend: &impl ImageBackend,
    extension: &str,
    source: &[u8],
    target: BoundingBox,
) -> Result<Encoded> {
    let codec = select_codec(extension);
    backend.resize(&ResizeParams {
        source,
        target,
        codec,
        quality: Quality::MAX,
    })
}

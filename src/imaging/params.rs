//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations) (which decides what
//! derivative to produce) and the [`backend`](super::backend) (which does the
//! pixel work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality. Derivatives always use [`Quality::MAX`].
//! - [`ResizeParams`] — Source bytes, bounding box, codec and quality for one resize.
//! - [`Encoded`] — What a resize hands back: encoded bytes plus their pixel size.

use super::calculations::{BoundingBox, Dimensions};
use super::codec::Codec;

/// Quality setting for lossy image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(100);

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Parameters for a single derivative resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams<'a> {
    /// Encoded bytes of the stored original.
    pub source: &'a [u8],
    pub target: BoundingBox,
    pub codec: Codec,
    pub quality: Quality,
}

/// An encoded derivative, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

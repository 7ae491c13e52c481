//! Image processing: geometry, codec choice, decode/resample/encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | full decode via `image::ImageReader` |
//! | **Resize** | `CatmullRom` (bicubic), premultiplied alpha |
//! | **Encode** | JPEG at quality 100, or PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Codec**: Extension → output format mapping
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining codec choice + backend

pub mod backend;
mod calculations;
mod codec;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{BoundingBox, Dimensions, fit, requires_resize, width_constrains};
pub use codec::{Codec, select_codec};
pub use operations::{extract_dimensions, render_derivative};
pub use params::{Encoded, Quality, ResizeParams};
pub use rust_backend::{RustBackend, supported_input_extensions};

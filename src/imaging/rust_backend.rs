//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Resample | `fast_image_resize::Resizer`, `CatmullRom` (bicubic) convolution |
//! | Alpha | `MulDiv` premultiply before and divide after resampling, so transparent pixels don't bleed dark fringes |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality, alpha flattened onto white |
//! | Encode → PNG | `image::codecs::png::PngEncoder` with best compression, alpha kept |
//!
//! Only the first frame of multi-frame sources (animated GIF) is decoded.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{Dimensions, fit};
use super::codec::Codec;
use super::params::{Encoded, Quality, ResizeParams};
use fast_image_resize::{self as fr, MulDiv, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const DECODABLE: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    DECODABLE
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Backend built on the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image from memory, sniffing the format from its magic bytes.
fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Resample into exactly `size` with a CatmullRom (bicubic) convolution.
///
/// Images with an alpha channel are resampled premultiplied, otherwise fully
/// transparent pixels (usually black) would darken the edges they touch.
fn resample(img: DynamicImage, size: Dimensions) -> Result<DynamicImage, BackendError> {
    if img.width() == size.width && img.height() == size.height {
        return Ok(img);
    }

    let has_alpha = img.color().has_alpha();
    let (pixel_type, pixels) = if has_alpha {
        (PixelType::U8x4, img.to_rgba8().into_raw())
    } else {
        (PixelType::U8x3, img.to_rgb8().into_raw())
    };
    let mut src = fr::images::Image::from_vec_u8(img.width(), img.height(), pixels, pixel_type)
        .map_err(|e| BackendError::Resample(e.to_string()))?;
    let mut dst = fr::images::Image::new(size.width, size.height, pixel_type);

    let mul_div = MulDiv::default();
    if has_alpha {
        mul_div
            .multiply_alpha_inplace(&mut src)
            .map_err(|e| BackendError::Resample(e.to_string()))?;
    }
    let options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(fr::FilterType::CatmullRom));
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| BackendError::Resample(e.to_string()))?;
    if has_alpha {
        mul_div
            .divide_alpha_inplace(&mut dst)
            .map_err(|e| BackendError::Resample(e.to_string()))?;
    }

    let raw = dst.into_vec();
    let resized = if has_alpha {
        RgbaImage::from_raw(size.width, size.height, raw).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(size.width, size.height, raw).map(DynamicImage::ImageRgb8)
    };
    resized.ok_or_else(|| BackendError::Resample("resized buffer has the wrong length".into()))
}

/// Composite over an opaque white background.
fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y);
        let a = px[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    })
}

/// Encode with the selected codec into an in-memory buffer.
fn encode(img: &DynamicImage, codec: Codec, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let pixels = match (img.color().has_alpha(), codec.supports_alpha()) {
        (true, true) => DynamicImage::ImageRgba8(img.to_rgba8()),
        (true, false) => DynamicImage::ImageRgb8(flatten_onto_white(&img.to_rgba8())),
        (false, _) => DynamicImage::ImageRgb8(img.to_rgb8()),
    };

    let mut out = Vec::new();
    let result = match codec {
        Codec::Jpeg => {
            pixels.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.value()))
        }
        Codec::Png => pixels.write_with_encoder(PngEncoder::new_with_quality(
            &mut out,
            CompressionType::Best,
            PngFilter::Adaptive,
        )),
    };
    result.map_err(|e| BackendError::Encode(format!("{codec} encode failed: {e}")))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let img = decode(bytes)?;
        Ok(Dimensions::new(img.width(), img.height()))
    }

    fn resize(&self, params: &ResizeParams<'_>) -> Result<Encoded, BackendError> {
        let img = decode(params.source)?;
        let size = fit(Dimensions::new(img.width(), img.height()), params.target);
        let resized = resample(img, size)?;
        let bytes = encode(&resized, params.codec, params.quality)?;
        Ok(Encoded {
            bytes,
            dimensions: size,
        })
    }
}

//! Shared test utilities: synthetic images, records, and an in-memory media store.
//!
//! Images are generated with the `image` encoders so the suite needs no
//! binary fixtures.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::media::MediaStore;
use crate::store::StoredFile;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// A valid JPEG with a colour gradient.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

/// A valid opaque RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

/// A single-frame GIF with a transparent border.
pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 128, 255, 255])
        }
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Gif)
}

/// Left half opaque red, right half fully transparent black.
pub fn half_transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

// =========================================================================
// Records
// =========================================================================

pub fn stored(location: &str, width: u32, height: u32) -> StoredFile {
    let extension = location.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    StoredFile::new(location, extension, width, height)
}

// =========================================================================
// Media store
// =========================================================================

/// In-memory [`MediaStore`]; originals and derivatives share one map.
#[derive(Default)]
pub struct MemoryMedia {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, location: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(location.to_string(), bytes.to_vec());
    }

    pub fn get(&self, location: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(location).cloned()
    }

    /// Make every subsequent write fail as if the disk were full.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl MediaStore for MemoryMedia {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        self.get(location)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.to_string()))
    }

    fn write(&self, location: &str, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "mock: storage full"));
        }
        self.put(location, bytes);
        Ok(())
    }
}

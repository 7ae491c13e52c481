//! Output codec selection from a stored file's extension.
//!
//! | Extension | Output |
//! |---|---|
//! | `jpg`, `jpeg` | JPEG |
//! | `png` | PNG |
//! | `gif` | PNG (keeps transparency, drops animation) |
//! | anything else | JPEG |

use std::fmt;

/// Encode strategy for a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Jpeg,
    Png,
}

impl Codec {
    pub fn mime_type(self) -> &'static str {
        match self {
            Codec::Jpeg => "image/jpeg",
            Codec::Png => "image/png",
        }
    }

    /// Whether the encoder can store an alpha channel.
    pub fn supports_alpha(self) -> bool {
        matches!(self, Codec::Png)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Jpeg => f.write_str("JPEG"),
            Codec::Png => f.write_str("PNG"),
        }
    }
}

/// Pick the output codec for a file extension.
///
/// Case-insensitive; a leading dot and surrounding whitespace are ignored.
/// Unknown extensions fall back to JPEG.
pub fn select_codec(extension: &str) -> Codec {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Codec::Jpeg,
        "png" | "gif" => Codec::Png,
        _ => Codec::Jpeg,
    }
}

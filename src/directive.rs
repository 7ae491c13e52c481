//! Resize directives embedded in derivative filenames.
//!
//! A derivative is named after its canonical original with `_w<N>` or
//! `_h<N>` spliced in before the extension:
//!
//! - `photo.jpg` + width 480 → `photo_w480.jpg`
//! - `photo.jpg` + height 64 → `photo_h64.jpg`
//!
//! [`parse`] undoes [`derivative_name`] exactly. Anything between the last
//! `_` and the last `.` of the filename that isn't `w`/`h` followed by digits
//! is not a directive, and the path is left alone.

use std::fmt;

/// Axis a directive constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    fn letter(self) -> char {
        match self {
            Axis::Width => 'w',
            Axis::Height => 'h',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c {
            'w' => Some(Axis::Width),
            'h' => Some(Axis::Height),
            _ => None,
        }
    }
}

/// A requested size parsed from a derivative filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeDirective {
    pub axis: Axis,
    pub value: u32,
}

impl ResizeDirective {
    pub const fn width(value: u32) -> Self {
        Self {
            axis: Axis::Width,
            value,
        }
    }

    pub const fn height(value: u32) -> Self {
        Self {
            axis: Axis::Height,
            value,
        }
    }

    /// Parse a bare candidate like `w480`.
    fn from_candidate(candidate: &str) -> Option<Self> {
        let mut chars = candidate.chars();
        let axis = Axis::from_letter(chars.next()?)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = digits.parse::<u32>().ok()?;
        Some(Self { axis, value })
    }
}

impl fmt::Display for ResizeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axis.letter(), self.value)
    }
}

/// Result of parsing a requested URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Directive-free lookup key, without a leading `/`.
    pub canonical: String,
    pub directive: Option<ResizeDirective>,
}

/// Split a requested path into its canonical path and optional directive.
///
/// One leading `/` is stripped. Only the final path segment is inspected.
///
/// - `"photo_w480.jpg"` → canonical `"photo.jpg"`, `Some(w480)`
/// - `"/media/photo_h64.png"` → canonical `"media/photo.png"`, `Some(h64)`
/// - `"photo.jpg"`, `"photo_x480.jpg"`, `"photo_w.jpg"` → unchanged, `None`
pub fn parse(url_path: &str) -> ParsedPath {
    let path = url_path.strip_prefix('/').unwrap_or(url_path);

    match locate_directive(path) {
        Some((underscore, dot, directive)) => ParsedPath {
            canonical: format!("{}{}", &path[..underscore], &path[dot..]),
            directive: Some(directive),
        },
        None => ParsedPath {
            canonical: path.to_string(),
            directive: None,
        },
    }
}

/// Byte offsets of the directive's `_` and the extension's `.`.
fn locate_directive(path: &str) -> Option<(usize, usize, ResizeDirective)> {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    let filename = &path[file_start..];

    let underscore = filename.rfind('_')?;
    let dot = filename.rfind('.')?;
    // Candidate needs at least an axis letter and one digit.
    if dot < underscore + 3 {
        return None;
    }

    let directive = ResizeDirective::from_candidate(&filename[underscore + 1..dot])?;
    Some((file_start + underscore, file_start + dot, directive))
}

/// Filename of the derivative of `name.ext` under `directive`.
pub fn derivative_name(name: &str, extension: &str, directive: ResizeDirective) -> String {
    format!("{name}_{directive}.{extension}")
}

/// Derivative location for a canonical path, splicing the directive in
/// before the final extension.
///
/// Returns `None` when the filename has no extension, since such a name
/// could not be parsed back.
pub fn derivative_path(canonical: &str, directive: ResizeDirective) -> Option<String> {
    let file_start = canonical.rfind('/').map_or(0, |i| i + 1);
    let dot = file_start + canonical[file_start..].rfind('.')?;
    Some(derivative_name(
        &canonical[..dot],
        &canonical[dot + 1..],
        directive,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(canonical: &str, directive: Option<ResizeDirective>) -> ParsedPath {
        ParsedPath {
            canonical: canonical.to_string(),
            directive,
        }
    }

    #[test]
    fn width_directive() {
        assert_eq!(
            parse("photo_w480.jpg"),
            parsed("photo.jpg", Some(ResizeDirective::width(480)))
        );
    }

    #[test]
    fn height_directive() {
        assert_eq!(
            parse("photo_h64.png"),
            parsed("photo.png", Some(ResizeDirective::height(64)))
        );
    }

    #[test]
    fn no_directive() {
        assert_eq!(parse("photo.jpg"), parsed("photo.jpg", None));
    }

    #[test]
    fn invalid_axis_letter() {
        assert_eq!(parse("photo_x480.jpg"), parsed("photo_x480.jpg", None));
    }

    #[test]
    fn axis_without_digits() {
        assert_eq!(parse("photo_w.jpg"), parsed("photo_w.jpg", None));
    }

    #[test]
    fn non_numeric_suffix() {
        assert_eq!(parse("photo_w48x.jpg"), parsed("photo_w48x.jpg", None));
        assert_eq!(parse("photo_w-5.jpg"), parsed("photo_w-5.jpg", None));
        assert_eq!(parse("photo_w+5.jpg"), parsed("photo_w+5.jpg", None));
    }

    #[test]
    fn uppercase_axis_is_not_a_directive() {
        assert_eq!(parse("photo_W480.jpg"), parsed("photo_W480.jpg", None));
    }

    #[test]
    fn ordinary_underscore_in_name() {
        assert_eq!(parse("my_holiday.jpg"), parsed("my_holiday.jpg", None));
    }

    #[test]
    fn underscore_after_dot() {
        assert_eq!(parse("photo.tar_w10"), parsed("photo.tar_w10", None));
    }

    #[test]
    fn missing_dot_or_underscore() {
        assert_eq!(parse("photo_w480"), parsed("photo_w480", None));
        assert_eq!(parse("photo"), parsed("photo", None));
    }

    #[test]
    fn leading_slash_is_stripped_once() {
        assert_eq!(
            parse("/content/photo_w480.jpg"),
            parsed("content/photo.jpg", Some(ResizeDirective::width(480)))
        );
        assert_eq!(parse("//photo.jpg"), parsed("/photo.jpg", None));
    }

    #[test]
    fn directory_segments_are_ignored() {
        // The `_w1` lives in a directory name, not the filename.
        assert_eq!(parse("a_w1.d/photo.jpg"), parsed("a_w1.d/photo.jpg", None));
    }

    #[test]
    fn directive_overflowing_u32_is_ignored() {
        assert_eq!(
            parse("photo_w99999999999.jpg"),
            parsed("photo_w99999999999.jpg", None)
        );
    }

    #[test]
    fn zero_is_a_valid_value() {
        assert_eq!(
            parse("photo_h0.jpg"),
            parsed("photo.jpg", Some(ResizeDirective::height(0)))
        );
    }

    #[test]
    fn only_last_underscore_counts() {
        assert_eq!(
            parse("my_photo_w100.gif"),
            parsed("my_photo.gif", Some(ResizeDirective::width(100)))
        );
    }

    #[test]
    fn directive_display() {
        assert_eq!(ResizeDirective::width(480).to_string(), "w480");
        assert_eq!(ResizeDirective::height(64).to_string(), "h64");
    }

    #[test]
    fn derivative_name_convention() {
        assert_eq!(
            derivative_name("photo", "jpg", ResizeDirective::width(480)),
            "photo_w480.jpg"
        );
        assert_eq!(
            derivative_name("photo", "png", ResizeDirective::height(64)),
            "photo_h64.png"
        );
    }

    #[test]
    fn derivative_path_splices_before_extension() {
        assert_eq!(
            derivative_path("media/2024/photo.jpeg", ResizeDirective::width(320)).as_deref(),
            Some("media/2024/photo_w320.jpeg")
        );
        assert_eq!(
            derivative_path("archive.tar.gz", ResizeDirective::height(10)).as_deref(),
            Some("archive.tar_h10.gz")
        );
    }

    #[test]
    fn derivative_path_without_extension() {
        assert_eq!(derivative_path("dir.d/README", ResizeDirective::width(1)), None);
    }

    #[test]
    fn parse_reverses_derivative_path() {
        let derived = derivative_path("x_w10/my_photo.jpg", ResizeDirective::height(64)).unwrap();
        assert_eq!(derived, "x_w10/my_photo_h64.jpg");
        assert_eq!(
            parse(&derived),
            parsed("x_w10/my_photo.jpg", Some(ResizeDirective::height(64)))
        );
    }

    #[test]
    fn parse_reverses_derivative_name() {
        let names = [
            "photo",
            "",
            "my_photo",
            "photo_",
            "_",
            "x_w10",
            "photo_h12_",
            "archive.tar",
            "a.b.c",
            ".hidden",
            "dir/photo",
            "dir_w1.d/sub/img",
            "dir/",
            "photo w480",
        ];
        let extensions = ["jpg", "PNG", "gif", "jpeg", "w480", ""];
        let values = [0, 1, 64, 480, u32::MAX];

        for name in names {
            for extension in extensions {
                for value in values {
                    for directive in [ResizeDirective::width(value), ResizeDirective::height(value)] {
                        let derived = derivative_name(name, extension, directive);
                        assert_eq!(
                            parse(&derived),
                            parsed(&format!("{name}.{extension}"), Some(directive)),
                            "{derived}"
                        );
                    }
                }
            }
        }
    }
}

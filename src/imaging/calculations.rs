//! Pure calculation functions for derivative dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use serde::{Deserialize, Serialize};

/// Pixel size of an image (decoded original or computed output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Maximum width/height a derivative must fit within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Whether `target` is smaller than `original` on at least one axis.
///
/// A target equal to the original on both axes does not require a resize.
pub fn requires_resize(original: Dimensions, target: BoundingBox) -> bool {
    target.width < original.width || target.height < original.height
}

/// Scale `original` down to fit inside `target`, preserving aspect ratio.
///
/// The axis that overflows the box the most is brought exactly to its bound;
/// the other axis is scaled by the same ratio and floored. Never upscales, and
/// never returns a dimension below 1.
///
/// # Examples
/// ```
/// # use mediasize::imaging::{fit, BoundingBox, Dimensions};
/// // 2:1 landscape into a square box: width constrains
/// assert_eq!(
///     fit(Dimensions::new(1000, 500), BoundingBox::new(500, 500)),
///     Dimensions::new(500, 250)
/// );
///
/// // Smaller than the box: returned unchanged
/// assert_eq!(
///     fit(Dimensions::new(100, 100), BoundingBox::new(500, 500)),
///     Dimensions::new(100, 100)
/// );
/// ```
pub fn fit(original: Dimensions, target: BoundingBox) -> Dimensions {
    if !requires_resize(original, target) {
        return original;
    }
    // A zero bound is an infinite ratio: both axes floor to nothing.
    if target.width == 0 || target.height == 0 {
        return Dimensions::new(1, 1);
    }

    let (ow, oh) = (original.width as u64, original.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    // Integer arithmetic so the constraining axis lands exactly on its bound.
    let (width, height) = if width_constrains(original, target) {
        (tw, oh * tw / ow)
    } else {
        (ow * th / oh, th)
    };

    Dimensions {
        width: (width as u32).max(1),
        height: (height as u32).max(1),
    }
}

/// Whether the width axis overflows `target` at least as much as the height
/// axis does. Ties go to width; a zero bound always overflows.
pub fn width_constrains(original: Dimensions, target: BoundingBox) -> bool {
    if target.width == 0 {
        return true;
    }
    if target.height == 0 {
        return false;
    }
    // ow/tw >= oh/th, cross-multiplied
    original.width as u64 * target.height as u64 >= original.height as u64 * target.width as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height)
    }

    fn bbox(width: u32, height: u32) -> BoundingBox {
        BoundingBox::new(width, height)
    }

    // =========================================================================
    // requires_resize tests
    // =========================================================================

    #[test]
    fn requires_resize_when_width_smaller() {
        assert!(requires_resize(dims(800, 600), bbox(799, 600)));
    }

    #[test]
    fn requires_resize_when_height_smaller() {
        assert!(requires_resize(dims(800, 600), bbox(800, 599)));
    }

    #[test]
    fn equal_target_does_not_require_resize() {
        assert!(!requires_resize(dims(800, 600), bbox(800, 600)));
    }

    #[test]
    fn larger_target_does_not_require_resize() {
        assert!(!requires_resize(dims(100, 100), bbox(500, 500)));
    }

    // =========================================================================
    // fit tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        // ratio = max(2.0, 1.0) = 2.0
        assert_eq!(fit(dims(1000, 500), bbox(500, 500)), dims(500, 250));
    }

    #[test]
    fn fit_portrait_into_square() {
        assert_eq!(fit(dims(500, 1000), bbox(500, 500)), dims(250, 500));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit(dims(100, 100), bbox(500, 500)), dims(100, 100));
    }

    #[test]
    fn fit_equal_target_is_unchanged() {
        assert_eq!(fit(dims(800, 600), bbox(800, 600)), dims(800, 600));
    }

    #[test]
    fn fit_clamps_to_one_pixel() {
        // 1000x1 into 1x1: ratio 1000, height floors to 0 then clamps
        assert_eq!(fit(dims(1000, 1), bbox(1, 1)), dims(1, 1));
    }

    #[test]
    fn fit_floors_fractional_pixels() {
        // ratio = 2.0, 333 / 2.0 = 166.5 -> 166
        assert_eq!(fit(dims(1000, 333), bbox(500, 500)), dims(500, 166));
    }

    #[test]
    fn fit_height_constrains_when_only_height_overflows() {
        // Width already fits; height ratio 2.0 drives both axes
        assert_eq!(fit(dims(400, 1200), bbox(640, 600)), dims(200, 600));
    }

    #[test]
    fn fit_zero_target_clamps_instead_of_dividing_by_zero() {
        assert_eq!(fit(dims(300, 200), bbox(0, 200)), dims(1, 1));
    }

    #[test]
    fn fit_zero_width_on_portrait_is_one_pixel() {
        // Height alone would allow 1x10; the zero bound wins
        assert_eq!(fit(dims(100, 1000), bbox(0, 1000)), dims(1, 1));
        assert_eq!(fit(dims(1000, 100), bbox(1000, 0)), dims(1, 1));
    }

    #[test]
    fn fit_presets_large_landscape() {
        // 4000x3000 photo into 640x480 keeps 4:3 exactly
        assert_eq!(fit(dims(4000, 3000), bbox(640, 480)), dims(640, 480));
    }

    #[test]
    fn fit_non_dyadic_ratios_hit_the_bound() {
        assert_eq!(fit(dims(1000, 2000), bbox(480, 2000)), dims(480, 960));
        assert_eq!(fit(dims(999, 500), bbox(333, 500)), dims(333, 166));
        assert_eq!(fit(dims(700, 300), bbox(700, 7)), dims(16, 7));
        assert_eq!(fit(dims(3, 1000), bbox(3, 999)), dims(2, 999));
    }

    #[test]
    fn fit_constraining_axis_equals_bound() {
        let widths = [7, 99, 333, 480, 999, 1000, 1023, 4000, 6001];
        for ow in widths {
            for tw in 1..ow.min(700) {
                let oh = ow * 2 + 1;
                let out = fit(dims(ow, oh), bbox(tw, u32::MAX));
                assert_eq!(out.width, tw, "{ow}x{oh} -> w{tw}");
                // height is floor(oh * tw / ow)
                let (h, oh, tw, ow) = (out.height as u64, oh as u64, tw as u64, ow as u64);
                assert!(h * ow <= oh * tw && oh * tw < (h + 1) * ow, "{ow}x{oh} -> w{tw}: {h}");

                let out = fit(dims(oh as u32, ow as u32), bbox(u32::MAX, tw as u32));
                assert_eq!(out.height as u64, tw, "{oh}x{ow} -> h{tw}");
                assert_eq!(out.width as u64, h);
            }
        }
    }

    #[test]
    fn fit_output_within_bounds_and_aspect_preserved() {
        // (original, target, expected)
        let cases = [
            (dims(1, 1), bbox(1, 1), dims(1, 1)),
            (dims(7, 3), bbox(1, 1), dims(1, 1)),
            (dims(7, 3), bbox(64, 64), dims(7, 3)),
            (dims(640, 480), bbox(75, 100), dims(75, 56)),
            (dims(1920, 1080), bbox(64, 64), dims(64, 36)),
            (dims(1920, 1080), bbox(640, 480), dims(640, 360)),
            (dims(3000, 4000), bbox(75, 100), dims(75, 100)),
            (dims(3000, 4000), bbox(640, 480), dims(360, 480)),
            (dims(10_000, 17), bbox(64, 64), dims(64, 1)),
            (dims(17, 10_000), bbox(640, 480), dims(1, 480)),
        ];

        for (original, target, expected) in cases {
            let out = fit(original, target);
            assert_eq!(out, expected, "{original:?} -> {target:?}");
            assert!(out.width <= original.width.max(1));
            assert!(out.height <= original.height.max(1));
            assert!(out.width <= target.width.max(1) && out.height <= target.height.max(1));
        }
    }

    #[test]
    fn width_constrains_picks_the_larger_overflow() {
        assert!(width_constrains(dims(4000, 3000), bbox(480, 640)));
        assert!(!width_constrains(dims(3000, 4000), bbox(640, 480)));
        // Tie goes to width
        assert!(width_constrains(dims(4000, 3000), bbox(640, 480)));
        assert!(width_constrains(dims(10, 10), bbox(0, 0)));
        assert!(!width_constrains(dims(10, 10), bbox(5, 0)));
    }
}

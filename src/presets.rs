//! Fixed catalog of named derivative sizes.
//!
//! Offered to callers that build size pickers or pre-generate derivatives.
//! The catalog is declared, not computed, and never changes at runtime.

use crate::imaging::BoundingBox;

/// A named bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSize {
    pub label: &'static str,
    pub size: BoundingBox,
}

impl PresetSize {
    const fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            size: BoundingBox::new(width, height),
        }
    }
}

const CATALOG: [PresetSize; 7] = [
    PresetSize::new("Large - Portrait", 480, 640),
    PresetSize::new("Large - Landscape", 640, 480),
    PresetSize::new("Medium - Portrait", 240, 320),
    PresetSize::new("Medium - Landscape", 320, 240),
    PresetSize::new("Small - Portrait", 75, 100),
    PresetSize::new("Small - Landscape", 100, 75),
    PresetSize::new("Thumbnail", 64, 64),
];

/// All presets, largest first.
pub fn preset_sizes() -> &'static [PresetSize] {
    &CATALOG
}

/// Look up a preset by label, ignoring ASCII case.
pub fn find_preset(label: &str) -> Option<&'static PresetSize> {
    CATALOG
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(label.trim()))
}

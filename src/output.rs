//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability, and the binary prints the lines. Format functions are pure.
//!
//! ```text
//! media/photo_w480.jpg
//!     Original: media/photo.jpg (4000x3000)
//!     Derivative: 480x360 image/jpeg
//! ```

use crate::pipeline::{DerivativeError, Served, Warmed};
use crate::presets::PresetSize;
use crate::store::StoredFile;

fn record_line(file: &StoredFile) -> String {
    format!("{} ({}x{})", file.location, file.width, file.height)
}

/// `resolve`: the canonical record a URL maps to.
pub fn format_resolved(url: &str, file: Option<&StoredFile>) -> Vec<String> {
    match file {
        Some(file) => vec![url.to_string(), format!("    Original: {}", record_line(file))],
        None => vec![url.to_string(), "    Not found".to_string()],
    }
}

/// `serve`: what a request produced.
pub fn format_served(url: &str, served: Option<&Served>) -> Vec<String> {
    let mut lines = vec![url.to_string()];
    match served {
        None => lines.push("    Not found".to_string()),
        Some(Served::Original(file)) => {
            lines.push(format!("    Original: {}", record_line(file)));
        }
        Some(Served::Derivative {
            original,
            derivative,
        }) => {
            lines.push(format!("    Original: {}", record_line(original)));
            lines.push(format!(
                "    Derivative: {}x{} {}",
                derivative.dimensions.width,
                derivative.dimensions.height,
                derivative.codec.mime_type()
            ));
        }
    }
    lines
}

/// `serve`: a request that failed.
pub fn format_serve_failed(url: &str, error: &DerivativeError) -> Vec<String> {
    vec![url.to_string(), format!("    Error: {error}")]
}

/// `presets`: the catalog, aligned.
pub fn format_presets(presets: &[PresetSize]) -> Vec<String> {
    let width = presets.iter().map(|p| p.label.len()).max().unwrap_or(0);
    presets
        .iter()
        .map(|p| {
            format!(
                "{:<width$}  {}x{}",
                p.label, p.size.width, p.size.height
            )
        })
        .collect()
}

/// `ingest`: accepted records and rejections.
pub fn format_ingested(accepted: &[StoredFile], rejected: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = accepted.iter().map(record_line).collect();
    for reason in rejected {
        lines.push(format!("    Rejected: {reason}"));
    }
    lines.push(format!(
        "Ingested {} file{}, rejected {}",
        accepted.len(),
        if accepted.len() == 1 { "" } else { "s" },
        rejected.len()
    ));
    lines
}

/// `warm`: per-file derivative list or error.
pub fn format_warmed(warmed: &[Warmed]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut produced = 0;
    let mut failed = 0;
    for w in warmed {
        lines.push(w.location.clone());
        match &w.result {
            Ok(derivatives) => {
                produced += derivatives.len();
                for d in derivatives {
                    lines.push(format!(
                        "    {} ({}x{})",
                        d.location, d.dimensions.width, d.dimensions.height
                    ));
                }
            }
            Err(e) => {
                failed += 1;
                lines.push(format!("    Error: {e}"));
            }
        }
    }
    lines.push(format!(
        "Wrote {produced} derivatives for {} originals, {failed} failed",
        warmed.len()
    ));
    lines
}

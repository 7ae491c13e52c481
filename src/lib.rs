//! # mediasize
//!
//! On-demand image derivatives. One canonical original is stored per image;
//! any number of resized variants are requested by URL and produced on the
//! fly, with the requested size encoded in the filename itself:
//!
//! ```text
//! media/photo.jpg         ← stored original (4000x3000)
//! media/photo_w480.jpg    ← derivative, fitted to 480px wide  → 480x360
//! media/photo_h64.jpg     ← derivative, fitted to 64px tall   → 85x64
//! ```
//!
//! No metadata is stored per derivative: the filename is the request.
//!
//! # Pipeline
//!
//! ```text
//! 1. Parse     request URL  →  canonical path + directive   (directive)
//! 2. Resolve   canonical    →  StoredFile                   (store)
//! 3. Fit       original, box →  output size                 (imaging::fit)
//! 4. Codec     extension    →  JPEG | PNG                   (imaging::select_codec)
//! 5. Render    bytes        →  decoded, resampled, encoded  (imaging backend)
//! 6. Write     encoded      →  temp file + rename           (media)
//! ```
//!
//! Each stage is independently testable; only stage 5 touches pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | `_w<N>` / `_h<N>` filename directives: parse and build |
//! | [`store`] | `StoredFile` records, repository trait, JSON index, read-through cache |
//! | [`media`] | byte storage for originals and derivatives, atomic writes |
//! | [`imaging`] | scale-to-fit geometry, codec choice, `image`-crate backend |
//! | [`presets`] | fixed catalog of named sizes |
//! | [`pipeline`] | `resolve_original`, `produce_derivative`, `serve`, `ingest`, `warm` |
//! | [`config`] | `mediasize.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never upscale, always floor
//!
//! A derivative is only ever smaller than its original. The axis that
//! overflows the bounding box the most is brought exactly to its bound and
//! the other is floored, clamped to at least one pixel.
//!
//! ## GIF becomes PNG
//!
//! GIF originals are re-encoded as PNG to keep transparency. Only the first
//! frame survives; animated GIFs lose their animation.
//!
//! ## Collaborators are injected
//!
//! [`pipeline::Pipeline`] takes its repository, media store, and imaging
//! backend as constructor arguments. There is no global registry to swap in
//! tests.

pub mod config;
pub mod directive;
pub mod imaging;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod presets;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

//! The request-facing pipeline: URL → original → derivative.
//!
//! ```text
//! request URL ─ directive::parse ─▶ canonical path ─ repository ─▶ StoredFile
//!                     │                                              │
//!                     └─ directive ─▶ BoundingBox ─ imaging ─▶ encoded bytes ─ media ─▶ written
//! ```
//!
//! A [`Pipeline`] is handed its collaborators (repository, media store,
//! imaging backend) at construction; tests substitute doubles there. It holds
//! no per-request state, so one instance serves any number of threads.

use crate::directive::{Axis, ResizeDirective, derivative_path, parse};
use crate::imaging::{
    BackendError, BoundingBox, Codec, Dimensions, ImageBackend, extract_dimensions, fit,
    render_derivative, select_codec, width_constrains,
};
use crate::media::MediaStore;
use crate::presets::PresetSize;
use crate::store::{FileRepository, StoreError, StoredFile};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while producing a derivative.
#[derive(Error, Debug)]
pub enum DerivativeError {
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error("Failed to read original {location}: {source}")]
    Read { location: String, source: io::Error },
    #[error("Failed to write derivative {location}: {source}")]
    Write { location: String, source: io::Error },
}

/// Failure while ingesting an upload. The repository is untouched.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read upload {location}: {source}")]
    Read { location: String, source: io::Error },
    #[error("Rejected {location}: {source}")]
    Imaging {
        location: String,
        source: BackendError,
    },
    #[error("Rejected {location}: filename carries a resize directive")]
    DirectiveInName { location: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A derivative that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    pub location: String,
    pub codec: Codec,
    pub dimensions: Dimensions,
}

/// What a request URL resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Served {
    /// The URL named an original directly.
    Original(StoredFile),
    /// The URL carried a directive; the derivative now exists at its path.
    Derivative {
        original: StoredFile,
        derivative: Derivative,
    },
}

/// Outcome of warming one stored file.
#[derive(Debug)]
pub struct Warmed {
    pub location: String,
    pub result: Result<Vec<Derivative>, DerivativeError>,
}

/// Bounding box a directive asks for on a given original.
///
/// Only the named axis constrains; the other is bounded by the original
/// itself, so it can never force a resize on its own.
pub fn directive_bounds(directive: ResizeDirective, original: Dimensions) -> BoundingBox {
    match directive.axis {
        Axis::Width => BoundingBox::new(directive.value, original.height),
        Axis::Height => BoundingBox::new(original.width, directive.value),
    }
}

/// The directive that reproduces fitting `original` into `preset`.
///
/// Picks the axis that overflows the preset the most, matching the axis
/// [`fit`] scales by.
pub fn preset_directive(original: Dimensions, preset: BoundingBox) -> ResizeDirective {
    if width_constrains(original, preset) {
        ResizeDirective::width(preset.width)
    } else {
        ResizeDirective::height(preset.height)
    }
}

pub struct Pipeline<R, M, B> {
    repository: R,
    media: M,
    backend: B,
}

impl<R, M, B> Pipeline<R, M, B>
where
    R: FileRepository,
    M: MediaStore,
    B: ImageBackend,
{
    pub fn new(repository: R, media: M, backend: B) -> Self {
        Self {
            repository,
            media,
            backend,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Strip any resize directive from `request_url` and look up the
    /// original it refers to.
    pub fn resolve_original(&self, request_url: &str) -> Option<StoredFile> {
        let parsed = parse(request_url);
        if let Some(directive) = parsed.directive {
            debug!(url = request_url, canonical = %parsed.canonical, %directive, "stripped directive");
        }
        let found = self.repository.find_by_location(&parsed.canonical);
        if found.is_none() {
            debug!(canonical = %parsed.canonical, "no stored original");
        }
        found
    }

    /// Fit `source_bytes` into `target`, encode it in the codec `file`'s
    /// extension maps to, and write it at `destination`.
    pub fn produce_derivative(
        &self,
        file: &StoredFile,
        target: BoundingBox,
        source_bytes: &[u8],
        destination: &str,
    ) -> Result<Derivative, DerivativeError> {
        let encoded = render_derivative(&self.backend, &file.extension, source_bytes, target)
            .inspect_err(|e| warn!(location = %file.location, error = %e, "derivative failed"))?;

        self.media
            .write(destination, &encoded.bytes)
            .map_err(|source| DerivativeError::Write {
                location: destination.to_string(),
                source,
            })?;

        let derivative = Derivative {
            location: destination.to_string(),
            codec: select_codec(&file.extension),
            dimensions: encoded.dimensions,
        };
        info!(
            location = %derivative.location,
            width = derivative.dimensions.width,
            height = derivative.dimensions.height,
            codec = %derivative.codec,
            "wrote derivative"
        );
        Ok(derivative)
    }

    /// Handle a request URL end to end.
    ///
    /// `Ok(None)` when no original matches. A directive-free URL resolves to
    /// the original unchanged; otherwise the derivative is written at the
    /// requested path.
    pub fn serve(&self, request_url: &str) -> Result<Option<Served>, DerivativeError> {
        let parsed = parse(request_url);
        let Some(original) = self.repository.find_by_location(&parsed.canonical) else {
            debug!(canonical = %parsed.canonical, "no stored original");
            return Ok(None);
        };
        let Some(directive) = parsed.directive else {
            return Ok(Some(Served::Original(original)));
        };

        let bytes = self.read_original(&original)?;
        let target = directive_bounds(directive, original.dimensions());
        let destination = request_url.strip_prefix('/').unwrap_or(request_url);
        let derivative = self.produce_derivative(&original, target, &bytes, destination)?;

        Ok(Some(Served::Derivative {
            original,
            derivative,
        }))
    }

    /// Derivative location for `file` at `preset`, as a URL [`serve`](Self::serve)
    /// would answer. `None` if the location has no extension.
    pub fn preset_location(&self, file: &StoredFile, preset: &PresetSize) -> Option<String> {
        derivative_path(
            &file.location,
            preset_directive(file.dimensions(), preset.size),
        )
    }

    /// Record an uploaded original at `location`.
    ///
    /// The bytes must decode; their pixel size becomes the record's
    /// dimensions. Re-ingesting a location updates its dimensions.
    pub fn ingest(&self, location: &str, bytes: &[u8]) -> Result<StoredFile, IngestError> {
        let location = location.strip_prefix('/').unwrap_or(location);
        if parse(location).directive.is_some() {
            return Err(IngestError::DirectiveInName {
                location: location.to_string(),
            });
        }

        let dims =
            extract_dimensions(&self.backend, bytes).map_err(|source| IngestError::Imaging {
                location: location.to_string(),
                source,
            })?;

        let filename = location.rsplit('/').next().unwrap_or(location);
        let extension = filename.rsplit_once('.').map_or("", |(_, ext)| ext);
        let file = StoredFile::new(location, extension, dims.width, dims.height);
        self.repository.save(file.clone())?;

        info!(location, width = dims.width, height = dims.height, "ingested");
        Ok(file)
    }

    /// [`ingest`](Self::ingest) an original already present in the media store.
    pub fn ingest_stored(&self, location: &str) -> Result<StoredFile, IngestError> {
        let bytes = self
            .media
            .read(location)
            .map_err(|source| IngestError::Read {
                location: location.to_string(),
                source,
            })?;
        self.ingest(location, &bytes)
    }

    /// Produce every preset derivative for every stored file, in parallel.
    ///
    /// Each original is read once. A failure affects only that file's entry.
    pub fn warm(&self, presets: &[PresetSize]) -> Vec<Warmed> {
        self.repository
            .all()
            .into_par_iter()
            .map(|file| Warmed {
                location: file.location.clone(),
                result: self.warm_file(&file, presets),
            })
            .collect()
    }

    fn warm_file(
        &self,
        file: &StoredFile,
        presets: &[PresetSize],
    ) -> Result<Vec<Derivative>, DerivativeError> {
        let locations: BTreeMap<String, BoundingBox> = presets
            .iter()
            .filter_map(|preset| {
                let location = self.preset_location(file, preset)?;
                let directive = parse(&location).directive?;
                Some((location, directive_bounds(directive, file.dimensions())))
            })
            .collect();
        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let bytes = self.read_original(file)?;
        locations
            .iter()
            .map(|(location, target)| self.produce_derivative(file, *target, &bytes, location))
            .collect()
    }

    fn read_original(&self, file: &StoredFile) -> Result<Vec<u8>, DerivativeError> {
        self.media
            .read(&file.location)
            .map_err(|source| DerivativeError::Read {
                location: file.location.clone(),
                source,
            })
    }
}

/// Expected size of the derivative `directive` produces for `original`.
pub fn derivative_dimensions(directive: ResizeDirective, original: Dimensions) -> Dimensions {
    fit(original, directive_bounds(directive, original))
}

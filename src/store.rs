//! Stored-file records and the repositories that look them up.
//!
//! The pipeline only ever needs one query: "which original lives at this
//! canonical location?" That is the whole [`FileRepository`] surface, plus
//! `save` for ingest and `all` for batch warming.
//!
//! | Repository | Backing |
//! |---|---|
//! | [`MemoryRepository`] | `RwLock<HashMap>`; tests and embedding |
//! | [`IndexRepository`] | JSON index file, flushed atomically |
//! | [`CachedRepository`] | read-through cache over any of the above |
//!
//! A location is write-once: once a record exists its location never
//! changes, so cached lookups never go stale in a way that matters.

use crate::imaging::Dimensions;
use crate::media::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Index parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported index version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// A persisted original image.
///
/// `width`/`height` are the decoded size of the upload itself, never of a
/// derivative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Canonical, directive-free location. Unique.
    pub location: String,
    /// Extension without the dot, as uploaded.
    pub extension: String,
    pub width: u32,
    pub height: u32,
}

impl StoredFile {
    pub fn new(location: &str, extension: &str, width: u32, height: u32) -> Self {
        Self {
            location: location.to_string(),
            extension: extension.to_string(),
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Lookup of stored originals by canonical location.
pub trait FileRepository: Sync {
    /// Exact-match lookup. Absence is a normal outcome.
    fn find_by_location(&self, location: &str) -> Option<StoredFile>;

    /// Insert a record, or update the dimensions of an existing one.
    fn save(&self, file: StoredFile) -> Result<(), StoreError>;

    /// Every record, ordered by location.
    fn all(&self) -> Vec<StoredFile>;
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryRepository {
    files: RwLock<HashMap<String, StoredFile>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(files: impl IntoIterator<Item = StoredFile>) -> Self {
        let files = files
            .into_iter()
            .map(|f| (f.location.clone(), f))
            .collect();
        Self {
            files: RwLock::new(files),
        }
    }
}

impl FileRepository for MemoryRepository {
    fn find_by_location(&self, location: &str) -> Option<StoredFile> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    fn save(&self, file: StoredFile) -> Result<(), StoreError> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file.location.clone(), file);
        Ok(())
    }

    fn all(&self) -> Vec<StoredFile> {
        let mut files: Vec<StoredFile> = self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        files.sort_by(|a, b| a.location.cmp(&b.location));
        files
    }
}

// ============================================================================
// JSON index
// ============================================================================

/// Version of the index file format.
const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    files: Vec<StoredFile>,
}

/// Repository persisted as a JSON index file.
///
/// The whole index is held in memory; [`flush`](Self::flush) rewrites the
/// file via a temp file and rename.
#[derive(Debug)]
pub struct IndexRepository {
    path: PathBuf,
    files: RwLock<BTreeMap<String, StoredFile>>,
}

impl IndexRepository {
    /// Load the index at `path`. A missing file is an empty index; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let files = match std::fs::read_to_string(path) {
            Ok(content) => {
                let index: IndexFile = serde_json::from_str(&content)?;
                if index.version != INDEX_VERSION {
                    return Err(StoreError::Version {
                        found: index.version,
                        expected: INDEX_VERSION,
                    });
                }
                index
                    .files
                    .into_iter()
                    .map(|f| (f.location.clone(), f))
                    .collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), records = files.len(), "loaded index");
        Ok(Self {
            path: path.to_path_buf(),
            files: RwLock::new(files),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the index back to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        let index = IndexFile {
            version: INDEX_VERSION,
            files: self.all(),
        };
        let json = serde_json::to_string_pretty(&index)?;
        write_atomic(&self.path, json.as_bytes())?;
        Ok(())
    }
}

impl FileRepository for IndexRepository {
    fn find_by_location(&self, location: &str) -> Option<StoredFile> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    fn save(&self, file: StoredFile) -> Result<(), StoreError> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file.location.clone(), file);
        Ok(())
    }

    fn all(&self) -> Vec<StoredFile> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

// ============================================================================
// Read-through cache
// ============================================================================

/// Read-through cache in front of another repository.
///
/// Hits are served under a read lock. On a miss the lock is released before
/// the backing lookup, and the result is inserted afterwards under a short
/// write lock; concurrent misses for the same key may both hit the backing
/// store, which is harmless since records are immutable. Misses are not
/// cached, so a later ingest becomes visible immediately.
#[derive(Debug)]
pub struct CachedRepository<R> {
    inner: R,
    cache: RwLock<HashMap<String, StoredFile>>,
}

impl<R: FileRepository> CachedRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached records.
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<R: FileRepository> FileRepository for CachedRepository<R> {
    fn find_by_location(&self, location: &str) -> Option<StoredFile> {
        let hit = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned();
        if let Some(file) = hit {
            debug!(location, "repository cache hit");
            return Some(file);
        }

        let file = self.inner.find_by_location(location)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.to_string(), file.clone());
        Some(file)
    }

    fn save(&self, file: StoredFile) -> Result<(), StoreError> {
        self.inner.save(file.clone())?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file.location.clone(), file);
        Ok(())
    }

    fn all(&self) -> Vec<StoredFile> {
        self.inner.all()
    }
}

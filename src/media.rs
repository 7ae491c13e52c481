//! Byte storage for originals and derivatives.
//!
//! Locations are `/`-separated paths relative to a store root. Derivative
//! writes are atomic: bytes land in a temp file next to the destination and
//! are renamed into place, so a concurrent reader sees either the previous
//! file or the complete new one. Two requests producing the same derivative
//! write identical bytes, so whichever rename lands last is fine.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Read originals and write derivatives by location.
pub trait MediaStore: Sync {
    fn read(&self, location: &str) -> io::Result<Vec<u8>>;

    fn write(&self, location: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Write `bytes` to `path` via a sibling temp file and rename.
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Map a location onto a path under `root`.
///
/// Leading separators and `.` segments are dropped; `..` and empty
/// locations are rejected.
fn resolve(root: &Path, location: &str) -> io::Result<PathBuf> {
    let relative = Path::new(location.trim_start_matches('/'));
    let mut path = root.to_path_buf();
    let mut depth = 0;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("location escapes the media root: {location}"),
                ));
            }
        }
    }

    if depth == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("empty location: {location:?}"),
        ));
    }
    Ok(path)
}

/// Filesystem-backed store: originals under one root, derivatives under
/// another (often the same directory).
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    originals: PathBuf,
    derivatives: PathBuf,
}

impl FsMediaStore {
    pub fn new(originals: impl Into<PathBuf>, derivatives: impl Into<PathBuf>) -> Self {
        Self {
            originals: originals.into(),
            derivatives: derivatives.into(),
        }
    }

    /// Originals and derivatives side by side under one root.
    pub fn shared(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::new(root.clone(), root)
    }

    pub fn originals_root(&self) -> &Path {
        &self.originals
    }

    /// Filesystem path a derivative location is written to.
    pub fn derivative_path(&self, location: &str) -> io::Result<PathBuf> {
        resolve(&self.derivatives, location)
    }
}

impl MediaStore for FsMediaStore {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        fs::read(resolve(&self.originals, location)?)
    }

    fn write(&self, location: &str, bytes: &[u8]) -> io::Result<()> {
        write_atomic(&resolve(&self.derivatives, location)?, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_strips_leading_slash() {
        let path = resolve(Path::new("/srv/media"), "/2024/photo.jpg").unwrap();
        assert_eq!(path, Path::new("/srv/media/2024/photo.jpg"));
    }

    #[test]
    fn resolve_rejects_parent_segments() {
        let err = resolve(Path::new("/srv/media"), "../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = resolve(Path::new("/srv/media"), "a/../../b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn resolve_rejects_empty() {
        assert!(resolve(Path::new("/srv"), "/").is_err());
        assert!(resolve(Path::new("/srv"), "").is_err());
    }

    #[test]
    fn write_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let store = FsMediaStore::shared(tmp.path());

        store.write("a/b/c_w10.jpg", b"bytes").unwrap();
        assert_eq!(fs::read(tmp.path().join("a/b/c_w10.jpg")).unwrap(), b"bytes");
    }

    #[test]
    fn write_replaces_existing_file_and_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let store = FsMediaStore::shared(tmp.path());

        store.write("photo_w10.jpg", b"old").unwrap();
        store.write("photo_w10.jpg", b"new").unwrap();

        assert_eq!(fs::read(tmp.path().join("photo_w10.jpg")).unwrap(), b"new");
        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn read_and_write_use_separate_roots() {
        let originals = TempDir::new().unwrap();
        let derivatives = TempDir::new().unwrap();
        fs::write(originals.path().join("photo.jpg"), b"original").unwrap();

        let store = FsMediaStore::new(originals.path(), derivatives.path());
        assert_eq!(store.read("photo.jpg").unwrap(), b"original");

        store.write("photo_w1.jpg", b"derived").unwrap();
        assert!(derivatives.path().join("photo_w1.jpg").exists());
        assert!(!originals.path().join("photo_w1.jpg").exists());
    }

    #[test]
    fn read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = FsMediaStore::shared(tmp.path());
        assert_eq!(
            store.read("nope.jpg").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn concurrent_writes_of_same_derivative() {
        use rayon::prelude::*;

        let tmp = TempDir::new().unwrap();
        let store = FsMediaStore::shared(tmp.path());
        let bytes = vec![7u8; 64 * 1024];

        (0..16).into_par_iter().for_each(|_| {
            store.write("same_w64.png", &bytes).unwrap();
        });

        assert_eq!(fs::read(tmp.path().join("same_w64.png")).unwrap(), bytes);
    }
}

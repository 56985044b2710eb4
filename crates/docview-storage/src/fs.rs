//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`], mapping virtual paths onto a base directory of the
//! local filesystem.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::storage::{FileInfo, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// The virtual path `"/a/b"` maps to `<base>/a/b`. Using `/` as the base exposes
/// the host filesystem as-is, which is what the server does with absolute
/// configured roots.
///
/// # Example
///
/// ```ignore
/// use docview_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new("/");
/// let entries = storage.read_dir("/srv/docs/")?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    base: PathBuf,
}

impl FsStorage {
    /// Create a filesystem storage rooted at `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Map a virtual path to an OS path below the base directory.
    ///
    /// Rejects relative paths and paths containing `..` so that a virtual path
    /// can never escape the base directory.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let Some(rel) = path.strip_prefix('/') else {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        };

        let has_parent_dir = rel.split('/').any(|segment| segment == "..");
        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }

        let rel = rel.trim_end_matches('/');
        if rel.is_empty() {
            Ok(self.base.clone())
        } else {
            Ok(self.base.join(rel))
        }
    }

    fn io_error(err: std::io::Error, path: &str) -> StorageError {
        StorageError::io(err, Some(path.to_owned())).with_backend(BACKEND)
    }
}

fn file_info(name: String, meta: &fs::Metadata) -> FileInfo {
    FileInfo {
        name,
        is_dir: meta.is_dir(),
        len: if meta.is_dir() { 0 } else { meta.len() },
        modified: meta.modified().unwrap_or(std::time::UNIX_EPOCH),
    }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_owned())
}

impl Storage for FsStorage {
    fn stat(&self, path: &str) -> Result<FileInfo, StorageError> {
        let os_path = self.resolve(path)?;
        let meta = fs::metadata(&os_path).map_err(|e| Self::io_error(e, path))?;
        Ok(file_info(name_of(&os_path), &meta))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<FileInfo>, StorageError> {
        let os_path = self.resolve(path)?;
        let entries = fs::read_dir(&os_path).map_err(|e| Self::io_error(e, path))?;

        let mut infos = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(e, path))?;
            // fs::metadata follows symlinks; dangling ones are skipped
            match fs::metadata(entry.path()) {
                Ok(meta) => {
                    infos.push(file_info(entry.file_name().to_string_lossy().into_owned(), &meta));
                }
                Err(err) => {
                    tracing::debug!(path = %entry.path().display(), error = %err, "Skipping unreadable entry");
                }
            }
        }
        Ok(infos)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let os_path = self.resolve(path)?;
        fs::read(&os_path).map_err(|e| Self::io_error(e, path))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, StorageError> {
        let os_path = self.resolve(path)?;
        let file = fs::File::open(&os_path).map_err(|e| Self::io_error(e, path))?;
        Ok(Box::new(file))
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        self.resolve(path).ok()
    }
}

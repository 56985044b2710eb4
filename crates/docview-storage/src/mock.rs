//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::storage::{FileInfo, Storage, StorageError, StorageErrorKind};
use crate::vpath;

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    modified: SystemTime,
}

/// Mock storage for testing.
///
/// Holds an in-memory tree keyed by cleaned virtual path (without the
/// directory marker). Parent directories are created implicitly.
///
/// # Example
///
/// ```ignore
/// use docview_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("/docs/README.md", "# Docs")
///     .with_mtime("/docs/README.md", 1_700_000_000);
///
/// let info = storage.stat("/docs/README.md").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MockStorage {
    entries: BTreeMap<String, Entry>,
}

impl Default for MockStorage {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "/".to_owned(),
            Entry {
                node: Node::Dir,
                modified: UNIX_EPOCH,
            },
        );
        Self { entries }
    }
}

fn key(path: &str) -> String {
    let cleaned = vpath::clean(path);
    let trimmed = cleaned.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

impl MockStorage {
    /// Create a new mock storage containing only the root directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        let key = key(path);
        self.ensure_parents(&key);
        self.entries.insert(
            key,
            Entry {
                node: Node::File(content.into()),
                modified: UNIX_EPOCH,
            },
        );
        self
    }

    /// Add an (empty) directory.
    #[must_use]
    pub fn with_dir(mut self, path: &str) -> Self {
        let key = key(path);
        self.ensure_parents(&key);
        self.entries.entry(key).or_insert(Entry {
            node: Node::Dir,
            modified: UNIX_EPOCH,
        });
        self
    }

    /// Set the modification time of an existing entry, in seconds since the epoch.
    ///
    /// # Panics
    ///
    /// Panics if no entry exists at `path`.
    #[must_use]
    pub fn with_mtime(self, path: &str, secs: u64) -> Self {
        self.with_modified(path, UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Set the modification time of an existing entry.
    ///
    /// # Panics
    ///
    /// Panics if no entry exists at `path`.
    #[must_use]
    pub fn with_modified(mut self, path: &str, modified: SystemTime) -> Self {
        let entry = self
            .entries
            .get_mut(&key(path))
            .unwrap_or_else(|| panic!("no mock entry at {path}"));
        entry.modified = modified;
        self
    }

    fn ensure_parents(&mut self, leaf: &str) {
        let mut dir = vpath::parent(leaf);
        loop {
            let dir_key = key(&dir);
            self.entries.entry(dir_key.clone()).or_insert(Entry {
                node: Node::Dir,
                modified: UNIX_EPOCH,
            });
            if dir_key == "/" {
                break;
            }
            dir = vpath::parent(&dir);
        }
    }

    fn lookup(&self, path: &str) -> Result<(String, &Entry), StorageError> {
        let key = key(path);
        match self.entries.get(&key) {
            Some(entry) => Ok((key, entry)),
            None => Err(StorageError::not_found(path).with_backend(BACKEND)),
        }
    }

    fn info(key: &str, entry: &Entry) -> FileInfo {
        let (is_dir, len) = match &entry.node {
            Node::Dir => (true, 0),
            Node::File(bytes) => (false, bytes.len() as u64),
        };
        FileInfo {
            name: vpath::base_name(key).to_owned(),
            is_dir,
            len,
            modified: entry.modified,
        }
    }

    fn file_bytes(&self, path: &str) -> Result<&[u8], StorageError> {
        let (_, entry) = self.lookup(path)?;
        match &entry.node {
            Node::File(bytes) => Ok(bytes),
            Node::Dir => Err(StorageError::new(StorageErrorKind::WrongType)
                .with_path(path)
                .with_backend(BACKEND)),
        }
    }
}

impl Storage for MockStorage {
    fn stat(&self, path: &str) -> Result<FileInfo, StorageError> {
        let (key, entry) = self.lookup(path)?;
        Ok(Self::info(&key, entry))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<FileInfo>, StorageError> {
        let (key, entry) = self.lookup(path)?;
        if !matches!(entry.node, Node::Dir) {
            return Err(StorageError::new(StorageErrorKind::WrongType)
                .with_path(path)
                .with_backend(BACKEND));
        }

        let prefix = if key == "/" { key } else { format!("{key}/") };
        Ok(self
            .entries
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter(|(k, _)| k.len() > prefix.len() && !k[prefix.len()..].contains('/'))
            .map(|(k, e)| Self::info(k, e))
            .collect())
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.file_bytes(path).map(<[u8]>::to_vec)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, StorageError> {
        let bytes = self.file_bytes(path)?.to_vec();
        Ok(Box::new(Cursor::new(bytes)))
    }
}

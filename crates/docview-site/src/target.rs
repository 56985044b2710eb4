//! Request path resolution.
//!
//! Maps a request path below a storage root to a directory/file decomposition,
//! substituting the index document for directories.

use chrono::{DateTime, Utc};
use docview_storage::{Storage, StorageError, vpath};

use crate::content_type::{ContentKind, ContentTypes};

/// Resolution failure.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Nothing exists at the request path.
    #[error("not found: {0}")]
    NotFound(String),
    /// A file was requested with a trailing directory marker.
    #[error("not a directory: {0}")]
    BadRequestType(String),
    /// The configured index name is unusable (empty, or carries a `/`).
    #[error("bad index name: {0:?}")]
    BadIndexConfiguration(String),
    /// Any other storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Format a timestamp as an HTTP date (`Last-Modified`).
#[must_use]
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// A resolved request.
///
/// All paths are virtual paths. `request_path`, `dir` and `document_path` are
/// relative to the root (but start with `/`); the `full_*` accessors prepend
/// the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTarget {
    root: String,
    request: String,
    index_name: String,
    is_dir: bool,
    has_document: bool,
    dir: String,
    name: String,
    ext: String,
    kind: Option<ContentKind>,
    mime: String,
    mod_time: DateTime<Utc>,
}

impl RequestTarget {
    /// Resolve `request` below `root`.
    ///
    /// Directories are coerced to directory form and get `index_name`
    /// substituted when it exists; the effective modification time is then the
    /// later of the two.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`].
    pub fn resolve(
        storage: &dyn Storage,
        types: &ContentTypes,
        root: &str,
        request: &str,
        index_name: &str,
    ) -> Result<Self, ResolveError> {
        if index_name.is_empty() || index_name.contains('/') {
            return Err(ResolveError::BadIndexConfiguration(index_name.to_owned()));
        }

        let root = vpath::set_dir(&vpath::clean(root));
        let mut request = vpath::clean(&format!("/{request}"));
        let full = vpath::join(&root, &request);

        let info = storage.stat(&full).map_err(|err| {
            if err.is_not_found() {
                ResolveError::NotFound(request.clone())
            } else {
                ResolveError::Storage(err)
            }
        })?;

        if info.is_dir {
            request = vpath::set_dir(&request);
        } else if vpath::is_dir(&request) {
            return Err(ResolveError::BadRequestType(request));
        }

        let mut target = Self {
            root,
            request,
            index_name: index_name.to_owned(),
            is_dir: info.is_dir,
            has_document: !info.is_dir,
            dir: String::new(),
            name: String::new(),
            ext: String::new(),
            kind: None,
            mime: String::new(),
            mod_time: info.modified.into(),
        };

        if target.is_dir {
            target.dir.clone_from(&target.request);
            let index_path = vpath::join(&target.full_dir(), index_name);
            match storage.stat(&index_path) {
                // a directory under the index name leaves the listing in place
                Ok(index) if index.is_dir => {}
                Ok(index) => {
                    target.has_document = true;
                    target.name = index_name.to_owned();
                    target.update_mod_time(index.modified.into());
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        } else {
            let (dir, name) = vpath::split(&target.request);
            target.dir = dir.to_owned();
            target.name = name.to_owned();
        }

        if target.has_document {
            target.ext = vpath::ext(&target.name).to_owned();
            let (kind, mime) = types.lookup(&target.ext);
            target.kind = Some(kind);
            target.mime = mime;
        }

        Ok(target)
    }

    /// Resolve `rel` relative to this target's directory, under the same rules.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`].
    pub fn sibling(
        &self,
        storage: &dyn Storage,
        types: &ContentTypes,
        rel: &str,
    ) -> Result<Self, ResolveError> {
        let request = vpath::join(&self.dir, rel);
        Self::resolve(storage, types, &self.root, &request, &self.index_name)
    }

    /// Raise the effective modification time; earlier times are ignored.
    pub fn update_mod_time(&mut self, time: DateTime<Utc>) {
        if time > self.mod_time {
            self.mod_time = time;
        }
    }

    /// Storage root (with directory marker).
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Cleaned request path, in directory form for directories.
    #[must_use]
    pub fn request_path(&self) -> &str {
        &self.request
    }

    /// Request path prefixed with the root.
    #[must_use]
    pub fn full_request_path(&self) -> String {
        vpath::join(&self.root, &self.request)
    }

    /// True when the request named a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// True when there is a document to serve (a file, or a directory's index).
    #[must_use]
    pub fn has_document(&self) -> bool {
        self.has_document
    }

    /// Directory part, relative to the root.
    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Directory part prefixed with the root.
    #[must_use]
    pub fn full_dir(&self) -> String {
        vpath::join(&self.root, &self.dir)
    }

    /// Document file name (empty for a directory without index).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document path relative to the root, if any.
    #[must_use]
    pub fn document_path(&self) -> Option<String> {
        self.has_document
            .then(|| vpath::join(&self.dir, &self.name))
    }

    /// Document path prefixed with the root, if any.
    #[must_use]
    pub fn full_document_path(&self) -> Option<String> {
        self.has_document
            .then(|| vpath::join(&self.full_dir(), &self.name))
    }

    /// Document extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.ext
    }

    /// Document content kind, if there is a document.
    #[must_use]
    pub fn kind(&self) -> Option<ContentKind> {
        self.kind
    }

    /// Document MIME type (empty without a document).
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Effective modification time.
    #[must_use]
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mod_time
    }

    /// Effective modification time as an HTTP date.
    #[must_use]
    pub fn last_modified(&self) -> String {
        http_date(self.mod_time)
    }
}

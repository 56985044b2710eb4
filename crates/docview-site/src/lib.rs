//! Request-side building blocks for docview.
//!
//! Everything here is computed per request from immutable startup state:
//!
//! - [`ContentTypes`] classifies an extension into a [`ContentKind`] and MIME type
//! - [`RequestTarget`] resolves a request path against a storage root
//! - [`DirectoryListing`] merges directory entries across priority-ordered roots
//! - [`path_links`] builds breadcrumb links
//! - [`CacheValidator`] derives `Etag` values from a fingerprint and a timestamp

mod breadcrumbs;
mod content_type;
mod listing;
mod target;
mod validator;

pub use breadcrumbs::{PathLink, path_links};
pub use content_type::{ContentKind, ContentTypes};
pub use listing::{DirectoryEntry, DirectoryListing, DEFAULT_HIDDEN, DEFAULT_TIMESTAMP_FORMAT};
pub use target::{RequestTarget, ResolveError, http_date};
pub use validator::{CacheValidator, Fingerprint};

/// Error raised while building site components at startup.
#[derive(Debug, thiserror::Error)]
pub enum SiteConfigError {
    /// Malformed MIME extension table.
    #[error("MIME table line {line}: {message}")]
    MimeTable {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// Invalid hidden-name or hidden-path pattern.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// Timestamp format rejected by the formatter.
    #[error("invalid timestamp format: {0:?}")]
    TimestampFormat(String),
}

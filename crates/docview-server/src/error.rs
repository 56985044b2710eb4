//! Server error types.

use docview_renderer::RenderConfigError;
use docview_site::SiteConfigError;
use docview_storage::StorageError;

/// Failure while building a [`View`](crate::View) at startup.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// A template failed to load, parse or render the empty page.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    /// A template file could not be read.
    #[error("Cannot read template: {0}")]
    Storage(#[from] StorageError),
    /// A template file is not UTF-8.
    #[error("Template {0} is not valid UTF-8")]
    TemplateEncoding(String),
    /// Invalid listing configuration.
    #[error(transparent)]
    Site(#[from] SiteConfigError),
    /// Invalid render configuration.
    #[error(transparent)]
    Render(#[from] RenderConfigError),
    /// The render configuration could not be fingerprinted.
    #[error("Cannot fingerprint render configuration: {0}")]
    Fingerprint(#[from] serde_json::Error),
    /// A configured path cannot be used as a virtual path.
    #[error("Unusable path {0}")]
    Path(String),
}

/// Server startup or runtime failure.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for rendering configuration and conversion.

/// Startup error: the render configuration cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum RenderConfigError {
    /// `auto_ids.type` names no known strategy.
    #[error("unknown heading id strategy: {0:?}")]
    UnknownIdStrategy(String),
    /// An embed rule is missing a required field or has an unknown type.
    #[error("embed rule {section}[{index}]: {message}")]
    EmbedRule {
        /// Rule table (`video`, `audio` or `iframe`).
        section: &'static str,
        /// Position within the table.
        index: usize,
        /// What is wrong.
        message: String,
    },
    /// An embed rule regex does not compile.
    #[error("embed rule {section}[{index}]: {source}")]
    EmbedPattern {
        /// Rule table (`video`, `audio` or `iframe`).
        section: &'static str,
        /// Position within the table.
        index: usize,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },
    /// A configuration document is not valid TOML for its schema.
    #[error("invalid {what}: {source}")]
    Parse {
        /// Which document failed.
        what: &'static str,
        /// Parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Per-document conversion failure.
///
/// Never carries partial output; callers map it to an internal error.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Sanitizer input is not UTF-8.
    #[error("HTML is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// Sanitized HTML could not be walked for headings.
    #[error("table of contents: {0}")]
    Toc(#[from] quick_xml::Error),
    /// Heading text could not be decoded.
    #[error("table of contents encoding: {0}")]
    TocEncoding(#[from] quick_xml::encoding::EncodingError),
}

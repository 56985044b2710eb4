//! Extension to content kind and MIME type classification.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::SiteConfigError;

/// Packaged default table (`ext mime` per line).
const DEFAULT_TABLE: &str = include_str!("../data/mime_types.conf");

/// MIME type reported for markdown documents.
const MARKDOWN_MIME: &str = "text/markdown; charset=utf-8";

/// Fallback for extensions nobody knows.
const OCTET_STREAM: &str = "application/octet-stream";

/// Semantic kind of a document, driving request dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Markdown source, rendered to HTML.
    Markdown,
    /// `text/html`, rendered as an inline template.
    Html,
    /// Any other `text/*`.
    Text,
    /// `image/*`.
    Image,
    /// `audio/*`.
    Audio,
    /// `video/*`.
    Video,
    /// `application/*` and everything unclassified.
    Application,
}

impl ContentKind {
    /// Derive the kind from a full MIME type (parameters are ignored).
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "text/markdown" => Self::Markdown,
            "text/html" => Self::Html,
            _ => match essence.split('/').next() {
                Some("text") => Self::Text,
                Some("image") => Self::Image,
                Some("audio") => Self::Audio,
                Some("video") => Self::Video,
                _ => Self::Application,
            },
        }
    }
}

/// Extension table, mutable while building at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    by_ext: HashMap<String, String>,
    markdown: HashSet<String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let by_ext = parse_table(DEFAULT_TABLE)
            .map(|entries| entries.into_iter().collect())
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, "Packaged MIME table is invalid");
                HashMap::new()
            });
        Self {
            by_ext,
            markdown: ["md", "markdown"].into_iter().map(str::to_owned).collect(),
        }
    }
}

impl ContentTypes {
    /// Create the table from packaged defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay entries from a table in `ext mime` line format.
    ///
    /// # Errors
    ///
    /// Returns [`SiteConfigError::MimeTable`] for the first malformed line.
    pub fn with_table(mut self, table: &str) -> Result<Self, SiteConfigError> {
        self.by_ext.extend(parse_table(table)?);
        Ok(self)
    }

    /// Replace the set of extensions treated as markdown.
    #[must_use]
    pub fn with_markdown_extensions<S: AsRef<str>>(mut self, exts: &[S]) -> Self {
        self.markdown = exts
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Classify an extension (without the dot, any case).
    #[must_use]
    pub fn lookup(&self, ext: &str) -> (ContentKind, String) {
        let ext = ext.to_ascii_lowercase();
        if self.markdown.contains(&ext) {
            return (ContentKind::Markdown, MARKDOWN_MIME.to_owned());
        }

        let mime = self.by_ext.get(&ext).cloned().or_else(|| {
            (!ext.is_empty())
                .then(|| mime_guess::from_ext(&ext).first_raw())
                .flatten()
                .map(str::to_owned)
        });
        match mime {
            // only the configured extensions are rendered as markdown
            Some(mime) => match ContentKind::from_mime(&mime) {
                ContentKind::Markdown => (ContentKind::Text, mime),
                kind => (kind, mime),
            },
            None => (ContentKind::Application, OCTET_STREAM.to_owned()),
        }
    }

    /// Coarse icon class for a listing entry name (`"docs/"`, `"a.png"`, `"../"`).
    ///
    /// Returns one of `dir-root`, `dir`, `file-img`, `file-app`, `file-txt` or `file`.
    #[must_use]
    pub fn file_type(&self, name: &str) -> &'static str {
        if name == "/" {
            return "dir-root";
        }
        if name.ends_with('/') {
            return "dir";
        }
        let ext = docview_storage::vpath::ext(name);
        if ext.is_empty() {
            return "file";
        }
        match self.lookup(ext).0 {
            ContentKind::Image => "file-img",
            ContentKind::Application => "file-app",
            ContentKind::Markdown | ContentKind::Html | ContentKind::Text => "file-txt",
            ContentKind::Audio | ContentKind::Video => "file",
        }
    }
}

/// Parse `ext mime` lines.
///
/// Every line, including the last one, must end with a newline. Extensions
/// must not contain dots and lines must be printable.
fn parse_table(table: &str) -> Result<Vec<(String, String)>, SiteConfigError> {
    let mut entries = Vec::new();
    let mut rest = table;
    let mut line_no = 0;

    while !rest.is_empty() {
        line_no += 1;
        let err = |message: &str| SiteConfigError::MimeTable {
            line: line_no,
            message: message.to_owned(),
        };

        let Some(end) = rest.find('\n') else {
            return Err(err("missing trailing newline"));
        };
        let line = &rest[..end];
        rest = &rest[end + 1..];

        if line.chars().any(char::is_control) {
            return Err(err("non-printable character"));
        }
        let Some((ext, mime)) = line.split_once(' ') else {
            return Err(err("expected `ext mime`"));
        };
        if ext.is_empty() || ext.contains('.') {
            return Err(err(&format!("bad extension {ext:?}")));
        }
        let mime = normalize_media_type(mime).ok_or_else(|| err("bad MIME type"))?;

        entries.push((ext.to_ascii_lowercase(), mime));
    }

    Ok(entries)
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
        })
}

/// Validate `type/subtype; key=value` and format it canonically.
fn normalize_media_type(raw: &str) -> Option<String> {
    let mut parts = raw.split(';');
    let essence = parts.next()?.trim().to_ascii_lowercase();
    let (top, sub) = essence.split_once('/')?;
    if !is_token(top) || !is_token(sub) {
        return None;
    }

    let mut out = essence.clone();
    for param in parts {
        let (key, value) = param.trim().split_once('=')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().trim_matches('"');
        if !is_token(&key) || value.is_empty() {
            return None;
        }
        out.push_str("; ");
        out.push_str(&key);
        out.push('=');
        out.push_str(value);
    }
    Some(out)
}

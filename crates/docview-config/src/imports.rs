//! Imported configuration documents.
//!
//! The main file names further documents (MIME table, markdown config) and
//! the markdown config names its own (emoji mapping, embed rules). They are
//! loaded in a second phase, after the main file is parsed and its paths are
//! resolved, and the newest modification time across all of them is kept.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use docview_renderer::{EmbedRules, EmojiMapping, MarkdownConfig, MarkdownOptions};
use docview_site::ContentTypes;
use serde::Deserialize;

use crate::ConfigError;

/// Reads import files and tracks the newest modification time.
#[derive(Debug, Default)]
pub(crate) struct ImportTracker {
    mod_time: Option<SystemTime>,
}

impl ImportTracker {
    /// Newest modification time seen so far.
    pub(crate) fn mod_time(&self) -> Option<SystemTime> {
        self.mod_time
    }

    /// Read a file and record its modification time.
    pub(crate) fn read(&mut self, path: &Path) -> Result<String, ConfigError> {
        let io_err = |source| ConfigError::ImportIo {
            path: path.to_path_buf(),
            source,
        };
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(io_err)?;
        let text = std::fs::read_to_string(path).map_err(io_err)?;

        self.mod_time = Some(self.mod_time.map_or(modified, |t| t.max(modified)));
        Ok(text)
    }

    /// Load `path` as `T`, or the packaged default when there is no path.
    pub(crate) fn import<T: Importable>(&mut self, path: Option<&Path>) -> Result<T, ConfigError> {
        match path {
            Some(path) => {
                let text = self.read(path)?;
                T::parse(&text, path, self)
            }
            None => Ok(T::packaged()),
        }
    }
}

/// A configuration document that can be imported by path.
pub(crate) trait Importable: Sized {
    /// Value used when the import is not configured.
    fn packaged() -> Self;

    /// Parse `text` read from `path`, importing nested documents through `tracker`.
    fn parse(text: &str, path: &Path, tracker: &mut ImportTracker) -> Result<Self, ConfigError>;
}

impl Importable for EmojiMapping {
    fn packaged() -> Self {
        Self::default()
    }

    fn parse(text: &str, _path: &Path, _tracker: &mut ImportTracker) -> Result<Self, ConfigError> {
        Ok(Self::from_toml(text)?)
    }
}

impl Importable for EmbedRules {
    fn packaged() -> Self {
        Self::default()
    }

    fn parse(text: &str, _path: &Path, _tracker: &mut ImportTracker) -> Result<Self, ConfigError> {
        Ok(Self::from_toml(text)?)
    }
}

impl Importable for ContentTypes {
    fn packaged() -> Self {
        Self::new()
    }

    fn parse(text: &str, _path: &Path, _tracker: &mut ImportTracker) -> Result<Self, ConfigError> {
        Ok(Self::new().with_table(text)?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmojiImport {
    mapping: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmbedImport {
    rules: Option<String>,
}

/// Markdown configuration document as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MarkdownFile {
    #[serde(flatten)]
    options: MarkdownOptions,
    emoji: EmojiImport,
    embed: EmbedImport,
}

impl Importable for MarkdownConfig {
    fn packaged() -> Self {
        Self::default()
    }

    fn parse(text: &str, path: &Path, tracker: &mut ImportTracker) -> Result<Self, ConfigError> {
        let file: MarkdownFile = toml::from_str(text).map_err(|source| ConfigError::ImportParse {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let resolve = |rel: Option<String>| rel.map(|rel| dir.join(rel));

        let emoji_path: Option<PathBuf> = resolve(file.emoji.mapping);
        let embed_path: Option<PathBuf> = resolve(file.embed.rules);
        Ok(Self {
            options: file.options,
            emoji: tracker.import(emoji_path.as_deref())?,
            embed: tracker.import(embed_path.as_deref())?,
        })
    }
}

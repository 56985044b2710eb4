//! Render configuration.
//!
//! [`MarkdownOptions`] is the part read from the `markdown_config` document;
//! the emoji mapping and embed rules are imported from their own documents
//! and combined into a [`MarkdownConfig`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embed_rules::EmbedRules;
use crate::error::RenderConfigError;

const DEFAULT_EMOJI: &str = include_str!("../data/emoji.toml");

/// Per-extension toggles. Each flag enables exactly one pipeline stage or
/// parser option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtensionFlags {
    pub table: bool,
    pub strikethrough: bool,
    pub task_list: bool,
    pub definition_list: bool,
    pub footnote: bool,
    pub autolinks: bool,
    pub cjk: bool,
    pub emoji: bool,
    pub highlight: bool,
    pub math: bool,
    /// Client-side diagram rendering; only reaches the templates.
    pub mermaid: bool,
    /// Client-side map rendering; only reaches the templates.
    pub geomap: bool,
    pub embed: bool,
}

impl Default for ExtensionFlags {
    fn default() -> Self {
        Self {
            table: true,
            strikethrough: true,
            task_list: true,
            definition_list: true,
            footnote: true,
            autolinks: true,
            cjk: false,
            emoji: true,
            highlight: true,
            math: false,
            mermaid: false,
            geomap: false,
            embed: false,
        }
    }
}

/// Heading anchor generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoIds {
    /// Strategy name; `""` and `"safe"` are supported.
    #[serde(rename = "type")]
    pub strategy: String,
}

/// Footnote rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootnoteOptions {
    /// Raw HTML placed in each back-reference link.
    pub backlink_html: String,
}

impl Default for FootnoteOptions {
    fn default() -> Self {
        Self {
            backlink_html: "&#x21a9;&#xfe0e;".to_owned(),
        }
    }
}

/// Options read directly from the markdown configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    pub extension: ExtensionFlags,
    pub auto_ids: AutoIds,
    pub footnote: FootnoteOptions,
}

/// One emoji: the glyph and extra shortcodes besides its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiDefinition {
    pub emoji: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Emoji names to definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiMapping(BTreeMap<String, EmojiDefinition>);

impl Default for EmojiMapping {
    fn default() -> Self {
        Self::parse(DEFAULT_EMOJI).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Packaged emoji mapping is invalid");
            Self(BTreeMap::new())
        })
    }
}

impl EmojiMapping {
    /// Packaged mapping overlaid with the definitions in `text`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::Parse`] if `text` is not a mapping.
    pub fn from_toml(text: &str) -> Result<Self, RenderConfigError> {
        let mut mapping = Self::default();
        mapping.0.extend(Self::parse(text)?.0);
        Ok(mapping)
    }

    fn parse(text: &str) -> Result<Self, RenderConfigError> {
        toml::from_str(text).map_err(|source| RenderConfigError::Parse {
            what: "emoji mapping",
            source,
        })
    }

    /// Every shortcode (names and aliases) with its glyph.
    pub fn shortcodes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(name, def)| {
            std::iter::once(name.as_str())
                .chain(def.aliases.iter().map(String::as_str))
                .map(|code| (code, def.emoji.as_str()))
        })
    }

    /// Number of emoji definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Complete, immutable render configuration.
///
/// Serializes to a stable form used for fingerprinting and as the `markdown`
/// template parameter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkdownConfig {
    #[serde(flatten)]
    pub options: MarkdownOptions,
    pub emoji: EmojiMapping,
    pub embed: EmbedRules,
}

impl MarkdownConfig {
    /// Parse options from TOML, using packaged emoji and embed data.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::Parse`] on invalid TOML.
    pub fn from_toml(text: &str) -> Result<Self, RenderConfigError> {
        let options = toml::from_str(text).map_err(|source| RenderConfigError::Parse {
            what: "markdown configuration",
            source,
        })?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Extension flags.
    #[must_use]
    pub fn extension(&self) -> &ExtensionFlags {
        &self.options.extension
    }
}

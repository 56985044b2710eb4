//! Event-stream transforms applied between parsing and HTML generation.
//!
//! Each optional extension is one [`Stage`]. Stages are selected once from
//! the configuration flags and run in a fixed order; every stage implements
//! [`DocumentTransform`] and keeps no state between documents.

mod autolink;
mod cjk;
mod emoji;
mod embed;
mod footnote;
mod heading_ids;
mod highlight;

use pulldown_cmark::Event;

pub use heading_ids::{IdGenerator, IdStrategy};

use crate::config::MarkdownConfig;
use crate::error::RenderConfigError;

/// Rewrites one document's event stream.
pub trait DocumentTransform: Send + Sync {
    /// Transform the complete event list of a document.
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>>;
}

/// Optional pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Heading anchors; always enabled.
    HeadingIds,
    Emoji,
    Cjk,
    Autolink,
    Embed,
    Highlight,
    Footnotes,
}

impl Stage {
    /// Stages enabled by `config`, in execution order.
    #[must_use]
    pub fn enabled(config: &MarkdownConfig) -> Vec<Self> {
        let flags = config.extension();
        [
            (Self::HeadingIds, true),
            (Self::Emoji, flags.emoji),
            (Self::Cjk, flags.cjk),
            (Self::Autolink, flags.autolinks),
            (Self::Embed, flags.embed),
            (Self::Highlight, flags.highlight),
            (Self::Footnotes, flags.footnote),
        ]
        .into_iter()
        .filter_map(|(stage, on)| on.then_some(stage))
        .collect()
    }

    /// Build the transform for this stage.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::UnknownIdStrategy`] for an unsupported
    /// `auto_ids.type`.
    pub fn build(self, config: &MarkdownConfig) -> Result<Box<dyn DocumentTransform>, RenderConfigError> {
        Ok(match self {
            Self::HeadingIds => Box::new(heading_ids::HeadingIds::new(IdStrategy::from_name(
                &config.options.auto_ids.strategy,
            )?)),
            Self::Emoji => Box::new(emoji::EmojiShortcodes::new(&config.emoji)),
            Self::Cjk => Box::new(cjk::CjkLineBreaks),
            Self::Autolink => Box::new(autolink::Autolinks::new()),
            Self::Embed => Box::new(embed::MediaEmbeds::new(config.embed.clone())),
            Self::Highlight => Box::new(highlight::CodeHighlight::new(config.extension().mermaid)),
            Self::Footnotes => Box::new(footnote::Footnotes::new(
                &config.options.footnote.backlink_html,
            )),
        })
    }
}

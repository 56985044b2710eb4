//! Markdown to sanitized HTML for docview.
//!
//! The [`Converter`] runs three steps per document:
//!
//! 1. [`MarkdownPipeline`] parses markdown with `pulldown-cmark` and runs the
//!    enabled [`Stage`]s over the event stream. Raw HTML is passed through.
//! 2. [`Sanitizer`] strips everything outside the [`AllowList`].
//! 3. [`extract_toc`] walks the sanitized headings for a nested TOC and the title.
//!
//! All three are built once from a [`MarkdownConfig`] and are reentrant.
//!
//! # Example
//!
//! ```
//! use docview_renderer::{Converter, MarkdownConfig};
//!
//! let converter = Converter::new(&MarkdownConfig::default()).unwrap();
//! let doc = converter.convert(b"# Hello\n\n<script>x()</script>text").unwrap();
//!
//! assert_eq!(doc.title, "Hello");
//! assert!(!doc.html.contains("script"));
//! ```

mod config;
mod convert;
mod embed_rules;
mod error;
mod pipeline;
mod sanitize;
mod toc;
pub mod transform;
mod util;

pub use config::{
    AutoIds, EmojiDefinition, EmojiMapping, ExtensionFlags, FootnoteOptions, MarkdownConfig,
    MarkdownOptions,
};
pub use convert::{Converter, MarkdownDocument};
pub use embed_rules::{Embed, EmbedRules, IframeRule, MediaRule};
pub use error::{ConvertError, RenderConfigError};
pub use pipeline::MarkdownPipeline;
pub use sanitize::{AllowList, Sanitizer};
pub use toc::{TableOfContents, extract_toc};
pub use transform::{DocumentTransform, Stage};
pub use util::{escape_html, slugify};

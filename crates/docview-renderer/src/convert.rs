//! Markdown document conversion.

use crate::config::MarkdownConfig;
use crate::error::{ConvertError, RenderConfigError};
use crate::pipeline::MarkdownPipeline;
use crate::sanitize::Sanitizer;
use crate::toc::extract_toc;

/// A converted markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    /// Sanitized body HTML.
    pub html: String,
    /// Nested `<ul>` table of contents.
    pub toc_html: String,
    /// First heading text, or empty.
    pub title: String,
}

/// Render, sanitize and extract the TOC of markdown documents.
#[derive(Debug)]
pub struct Converter {
    pipeline: MarkdownPipeline,
    sanitizer: Sanitizer,
}

impl Converter {
    /// Build a converter with the packaged allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError`] when `config` is unusable.
    pub fn new(config: &MarkdownConfig) -> Result<Self, RenderConfigError> {
        Ok(Self {
            pipeline: MarkdownPipeline::new(config)?,
            sanitizer: Sanitizer::default(),
        })
    }

    /// Replace the sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Convert markdown source bytes.
    ///
    /// Invalid UTF-8 in the source is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if sanitizing or TOC extraction fails.
    pub fn convert(&self, source: &[u8]) -> Result<MarkdownDocument, ConvertError> {
        let markdown = String::from_utf8_lossy(source);
        let raw = self.pipeline.render(&markdown);
        let html = self.sanitizer.sanitize(raw.as_bytes())?;
        let toc = extract_toc(&html)?;

        Ok(MarkdownDocument {
            html,
            toc_html: toc.html,
            title: toc.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn converter() -> Converter {
        let mut config = MarkdownConfig::default();
        config.options.extension.embed = true;
        config.options.extension.math = true;
        Converter::new(&config).unwrap()
    }

    #[test]
    fn test_title_and_nested_toc() {
        let doc = converter()
            .convert(b"# Docs\n\nIntro.\n\n## Install\n\n### Linux\n\n## Usage\n")
            .unwrap();

        assert_eq!(doc.title, "Docs");
        assert_eq!(
            doc.toc_html,
            "<ul>\n<li><a href=\"#docs\">Docs</a>\
             \n<ul>\n<li><a href=\"#install\">Install</a>\
             \n<ul>\n<li><a href=\"#linux\">Linux</a></li>\n</ul>\n\
             </li>\n<li><a href=\"#usage\">Usage</a></li>\n</ul>\n\
             </li>\n</ul>\n"
        );
    }

    #[test]
    fn test_unsafe_markup_removed_text_kept() {
        let doc = converter()
            .convert(b"Hello <img src=x onerror=\"alert(1)\"> world <script>evil()</script>done\n")
            .unwrap();

        assert!(!doc.html.contains("onerror"));
        assert!(!doc.html.contains("script"));
        assert!(!doc.html.contains("evil"));
        assert!(doc.html.contains("Hello"));
        assert!(doc.html.contains("world"));
        assert!(doc.html.contains("done"));
    }

    #[test]
    fn test_idempotent() {
        let c = converter();
        let source = "# A\n\n## B :tada:\n\n| x |\n|---|\n| 1 |\n\n![v](a.mp4)\n\n$x^2$\n".as_bytes();

        assert_eq!(c.convert(source).unwrap(), c.convert(source).unwrap());
    }

    #[test]
    fn test_embeds_survive_sanitizing() {
        let doc = converter()
            .convert(b"![talk](https://youtu.be/abc)\n\n![clip](clip.webm)\n")
            .unwrap();

        assert!(doc.html.contains("<iframe class=\"embed-youtube\" src=\"https://www.youtube-nocookie.com/embed/abc\""));
        assert!(doc.html.contains("<video controls=\"\" src=\"clip.webm\""));
    }

    #[test]
    fn test_task_list_checkbox_survives() {
        let doc = converter().convert(b"- [x] done\n").unwrap();

        assert!(doc.html.contains("<input"));
        assert!(doc.html.contains("checked"));
    }

    #[test]
    fn test_void_elements_stay_self_closing() {
        let doc = converter().convert(b"a  \nb\n\n---\n").unwrap();

        assert_eq!(doc.html, "<p>a<br />\nb</p>\n<hr />\n");
    }

    #[test]
    fn test_empty_document() {
        let doc = converter().convert(b"").unwrap();

        assert_eq!(doc, MarkdownDocument {
            html: String::new(),
            toc_html: String::new(),
            title: String::new(),
        });
    }

    #[test]
    fn test_invalid_utf8_source_is_replaced() {
        let doc = converter().convert(b"caf\xe9\n").unwrap();

        assert!(doc.html.contains("caf\u{fffd}"));
    }
}

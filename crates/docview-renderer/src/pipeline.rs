//! Markdown to raw HTML.

use pulldown_cmark::{Event, Options, Parser, TextMergeStream, html};

use crate::config::MarkdownConfig;
use crate::error::RenderConfigError;
use crate::transform::{DocumentTransform, Stage};

/// Parser options and transform stages, fixed at construction.
///
/// Rendering never fails: malformed markdown degrades per CommonMark rules.
/// Raw HTML in the source is passed through untouched, so the output must be
/// sanitized before it is served.
pub struct MarkdownPipeline {
    options: Options,
    stages: Vec<Box<dyn DocumentTransform>>,
}

impl std::fmt::Debug for MarkdownPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownPipeline")
            .field("options", &self.options)
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl MarkdownPipeline {
    /// Assemble the pipeline for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError`] for an unsupported heading id strategy.
    pub fn new(config: &MarkdownConfig) -> Result<Self, RenderConfigError> {
        let stages = Stage::enabled(config)
            .into_iter()
            .map(|stage| stage.build(config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            options: parser_options(config),
            stages,
        })
    }

    /// Parser options in effect.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Render `markdown` to HTML.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();
        for stage in &self.stages {
            events = stage.transform(events);
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn parser_options(config: &MarkdownConfig) -> Options {
    let flags = config.extension();
    let mut options = Options::ENABLE_HEADING_ATTRIBUTES;
    for (on, option) in [
        (flags.table, Options::ENABLE_TABLES),
        (flags.strikethrough, Options::ENABLE_STRIKETHROUGH),
        (flags.task_list, Options::ENABLE_TASKLISTS),
        (flags.definition_list, Options::ENABLE_DEFINITION_LIST),
        (flags.footnote, Options::ENABLE_FOOTNOTES),
        (flags.math, Options::ENABLE_MATH),
    ] {
        options.set(option, on);
    }
    options
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pipeline(edit: impl FnOnce(&mut MarkdownConfig)) -> MarkdownPipeline {
        let mut config = MarkdownConfig::default();
        edit(&mut config);
        MarkdownPipeline::new(&config).unwrap()
    }

    #[test]
    fn test_flags_toggle_parser_options() {
        let p = pipeline(|c| {
            c.options.extension.table = false;
            c.options.extension.math = true;
        });

        assert!(!p.options().contains(Options::ENABLE_TABLES));
        assert!(p.options().contains(Options::ENABLE_MATH));
        assert!(p.options().contains(Options::ENABLE_STRIKETHROUGH));
    }

    #[test]
    fn test_table_flag() {
        let source = "| a |\n|---|\n| 1 |\n";

        assert!(pipeline(|_| {}).render(source).contains("<table>"));
        assert!(!pipeline(|c| c.options.extension.table = false)
            .render(source)
            .contains("<table>"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = pipeline(|_| {}).render("<div onclick=\"x()\">hi</div>\n");

        assert_eq!(html, "<div onclick=\"x()\">hi</div>\n");
    }

    #[test]
    fn test_void_elements_self_close() {
        let html = pipeline(|_| {}).render("a  \nb\n\n---\n\n- [x] done\n");

        assert!(html.contains("<br />"));
        assert!(html.contains("<hr />"));
        assert!(html.contains("checked=\"\"/>"));
    }

    #[test]
    fn test_headings_get_unique_ids() {
        let html = pipeline(|_| {}).render("# Intro\n\n## Intro\n");

        assert_eq!(
            html,
            "<h1 id=\"intro\">Intro</h1>\n<h2 id=\"intro-1\">Intro</h2>\n"
        );
    }

    #[test]
    fn test_deterministic() {
        let p = pipeline(|c| c.options.extension.embed = true);
        let source = "# T\n\nText[^1] :smile: https://example.com\n\n[^1]: Note\n";

        assert_eq!(p.render(source), p.render(source));
    }

    #[test]
    fn test_unknown_strategy_is_config_error() {
        let mut config = MarkdownConfig::default();
        config.options.auto_ids.strategy = "gfm".to_owned();

        assert!(matches!(
            MarkdownPipeline::new(&config),
            Err(RenderConfigError::UnknownIdStrategy(_))
        ));
    }
}

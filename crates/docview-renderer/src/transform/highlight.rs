//! Code block markup for client-side highlighting.
//!
//! Fenced and indented code is emitted as `chrm-` prefixed line spans so a
//! stylesheet or script can decorate it. Mermaid blocks are left as plain
//! `language-mermaid` code when diagrams are enabled.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};

use super::DocumentTransform;
use crate::util::escape_html;

const PREFIX: &str = "chrm-";

pub(super) struct CodeHighlight {
    keep_mermaid: bool,
}

impl CodeHighlight {
    pub(super) fn new(keep_mermaid: bool) -> Self {
        Self { keep_mermaid }
    }
}

fn render_block(lang: &str, code: &str) -> String {
    let mut html = format!("<pre tabindex=\"0\" class=\"{PREFIX}chroma\"><code");
    if !lang.is_empty() {
        let lang = escape_html(lang);
        html.push_str(&format!(" class=\"language-{lang}\" data-lang=\"{lang}\""));
    }
    html.push('>');
    for line in code.split_inclusive('\n') {
        html.push_str(&format!(
            "<span class=\"{PREFIX}line\"><span class=\"{PREFIX}cl\">{}</span></span>",
            escape_html(line)
        ));
    }
    html.push_str("</code></pre>\n");
    html
}

impl DocumentTransform for CodeHighlight {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        // (language, collected code) of the block being replaced
        let mut block: Option<(String, String)> = None;

        for event in events {
            if let Some((lang, code)) = &mut block {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        out.push(Event::Html(CowStr::from(render_block(lang, code))));
                        block = None;
                    }
                    Event::Text(text) => code.push_str(&text),
                    _ => {}
                }
                continue;
            }

            if let Event::Start(Tag::CodeBlock(kind)) = &event {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                if !(self.keep_mermaid && lang == "mermaid") {
                    block = Some((lang.to_owned(), String::new()));
                    continue;
                }
            }
            out.push(event);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Parser, html};

    use super::*;

    fn render(keep_mermaid: bool, markdown: &str) -> String {
        let events = CodeHighlight::new(keep_mermaid).transform(Parser::new(markdown).collect());
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_fenced_block_gets_line_spans() {
        assert_eq!(
            render(false, "```rust title=x\nlet a = 1 < 2;\nok\n```\n"),
            "<pre tabindex=\"0\" class=\"chrm-chroma\">\
             <code class=\"language-rust\" data-lang=\"rust\">\
             <span class=\"chrm-line\"><span class=\"chrm-cl\">let a = 1 &lt; 2;\n</span></span>\
             <span class=\"chrm-line\"><span class=\"chrm-cl\">ok\n</span></span>\
             </code></pre>\n"
        );
    }

    #[test]
    fn test_indented_block_has_no_language() {
        assert_eq!(
            render(false, "    x\n"),
            "<pre tabindex=\"0\" class=\"chrm-chroma\"><code>\
             <span class=\"chrm-line\"><span class=\"chrm-cl\">x\n</span></span>\
             </code></pre>\n"
        );
    }

    #[test]
    fn test_mermaid_kept_when_enabled() {
        let markdown = "```mermaid\ngraph TD\n```\n";

        assert_eq!(
            render(true, markdown),
            "<pre><code class=\"language-mermaid\">graph TD\n</code></pre>\n"
        );
        assert!(render(false, markdown).contains("chrm-line"));
    }
}

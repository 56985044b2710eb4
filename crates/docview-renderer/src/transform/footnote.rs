//! Numbered footnotes with back-references.
//!
//! References become `<sup>` links numbered in order of first use, and all
//! definitions are moved to a list at the end of the document.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use super::DocumentTransform;

pub(super) struct Footnotes {
    backlink_html: String,
}

impl Footnotes {
    pub(super) fn new(backlink_html: &str) -> Self {
        Self {
            backlink_html: backlink_html.to_owned(),
        }
    }
}

/// Label numbering and per-footnote reference counts for one document.
#[derive(Default)]
struct Numbering {
    numbers: HashMap<String, usize>,
    refs: HashMap<usize, usize>,
}

impl Numbering {
    fn number(&mut self, label: &str) -> usize {
        let next = self.numbers.len() + 1;
        *self.numbers.entry(label.to_owned()).or_insert(next)
    }

    fn reference<'a>(&mut self, label: &str) -> Event<'a> {
        let n = self.number(label);
        let count = self.refs.entry(n).or_insert(0);
        let ref_id = ref_id(n, *count);
        *count += 1;
        Event::InlineHtml(CowStr::from(format!(
            "<sup id=\"{ref_id}\"><a href=\"#fn:{n}\" class=\"footnote-ref\" role=\"doc-noteref\">{n}</a></sup>"
        )))
    }

    fn rewrite<'a>(&mut self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        events
            .into_iter()
            .map(|event| match event {
                Event::FootnoteReference(label) => self.reference(&label),
                other => other,
            })
            .collect()
    }
}

/// Id of the `index`-th reference to footnote `n`.
fn ref_id(n: usize, index: usize) -> String {
    if index == 0 {
        format!("fnref:{n}")
    } else {
        format!("fnref{index}:{n}")
    }
}

impl DocumentTransform for Footnotes {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut body = Vec::with_capacity(events.len());
        let mut definitions: Vec<(String, Vec<Event<'a>>)> = Vec::new();
        let mut current: Option<(String, Vec<Event<'a>>)> = None;

        for event in events {
            match event {
                Event::Start(Tag::FootnoteDefinition(label)) => {
                    current = Some((label.to_string(), Vec::new()));
                }
                Event::End(TagEnd::FootnoteDefinition) => {
                    definitions.extend(current.take());
                }
                other => match &mut current {
                    Some((_, inner)) => inner.push(other),
                    None => body.push(other),
                },
            }
        }

        let mut numbering = Numbering::default();
        let mut body = numbering.rewrite(body);
        if definitions.is_empty() {
            return body;
        }

        // unreferenced definitions are numbered after referenced ones
        let mut numbered: Vec<(usize, Vec<Event<'a>>)> = definitions
            .into_iter()
            .map(|(label, inner)| (numbering.number(&label), inner))
            .collect();
        numbered.sort_by_key(|(n, _)| *n);

        body.push(Event::Html(CowStr::Borrowed(
            "<div class=\"footnotes\" role=\"doc-endnotes\">\n<hr />\n<ol>\n",
        )));
        for (n, inner) in numbered {
            let mut inner = numbering.rewrite(inner);
            let backlinks = (0..numbering.refs.get(&n).copied().unwrap_or(0))
                .map(|i| {
                    format!(
                        "&#160;<a href=\"#{}\" class=\"footnote-backref\" role=\"doc-backlink\">{}</a>",
                        ref_id(n, i),
                        self.backlink_html
                    )
                })
                .collect::<String>();

            body.push(Event::Html(CowStr::from(format!("<li id=\"fn:{n}\">\n"))));
            if !backlinks.is_empty() {
                let backlinks = Event::InlineHtml(CowStr::from(backlinks));
                // inside the closing paragraph when there is one
                if matches!(inner.last(), Some(Event::End(TagEnd::Paragraph))) {
                    let at = inner.len() - 1;
                    inner.insert(at, backlinks);
                } else {
                    inner.push(backlinks);
                }
            }
            body.extend(inner);
            body.push(Event::Html(CowStr::Borrowed("</li>\n")));
        }
        body.push(Event::Html(CowStr::Borrowed("</ol>\n</div>\n")));
        body
    }
}

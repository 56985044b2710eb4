//! `:shortcode:` to emoji glyph replacement.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::{Captures, Regex};

use super::DocumentTransform;
use crate::config::EmojiMapping;

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z0-9_+\-]+):").expect("valid regex"));

pub(super) struct EmojiShortcodes {
    glyphs: HashMap<String, String>,
}

impl EmojiShortcodes {
    pub(super) fn new(mapping: &EmojiMapping) -> Self {
        Self {
            glyphs: mapping
                .shortcodes()
                .map(|(code, glyph)| (code.to_owned(), glyph.to_owned()))
                .collect(),
        }
    }

    fn replace<'a>(&self, text: CowStr<'a>) -> CowStr<'a> {
        let replaced = match SHORTCODE_RE.replace_all(&text, |caps: &Captures| {
            self.glyphs
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        }) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        };
        replaced.map_or(text, CowStr::from)
    }
}

impl DocumentTransform for EmojiShortcodes {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut in_code = false;
        events
            .into_iter()
            .map(|event| match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code = true;
                    event
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code = false;
                    event
                }
                Event::Text(text) if !in_code => Event::Text(self.replace(text)),
                other => other,
            })
            .collect()
    }
}

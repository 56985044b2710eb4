//! Heading anchor generation.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use super::DocumentTransform;
use crate::error::RenderConfigError;
use crate::util::slugify;

/// Per-document id allocator.
pub trait IdGenerator {
    /// Mark an explicit id as taken.
    fn reserve(&mut self, id: &str);
    /// Allocate a unique id for heading `text`.
    fn generate(&mut self, text: &str) -> String;
}

/// Supported id strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// ASCII slugs; collisions get `-1`, `-2`, ... suffixes.
    Safe,
}

impl IdStrategy {
    /// Look up a strategy by its configuration name.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::UnknownIdStrategy`] for anything but
    /// `""` and `"safe"`.
    pub fn from_name(name: &str) -> Result<Self, RenderConfigError> {
        match name {
            "" | "safe" => Ok(Self::Safe),
            other => Err(RenderConfigError::UnknownIdStrategy(other.to_owned())),
        }
    }

    /// Fresh allocator for one document.
    #[must_use]
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            Self::Safe => Box::new(SafeIds::default()),
        }
    }
}

#[derive(Debug, Default)]
struct SafeIds {
    used: HashSet<String>,
}

impl IdGenerator for SafeIds {
    fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_owned());
    }

    fn generate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "heading".to_owned();
        }

        let mut id = base.clone();
        let mut n = 0;
        while self.used.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        self.used.insert(id.clone());
        id
    }
}

pub(super) struct HeadingIds {
    strategy: IdStrategy,
}

impl HeadingIds {
    pub(super) fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }
}

impl DocumentTransform for HeadingIds {
    fn transform<'a>(&self, mut events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut ids = self.strategy.generator();

        // explicit `{#id}` attributes win over generated ones anywhere in the document
        for event in &events {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                ids.reserve(id);
            }
        }

        for i in 0..events.len() {
            if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
                continue;
            }
            let generated = ids.generate(&heading_text(&events[i + 1..]));
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(generated));
            }
        }
        events
    }
}

/// Plain text of a heading, up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(s) | Event::Code(s) | Event::InlineMath(s) => text.push_str(s),
            _ => {}
        }
    }
    text
}

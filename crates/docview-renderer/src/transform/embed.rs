//! Image references rendered as media elements.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use super::DocumentTransform;
use crate::embed_rules::{Embed, EmbedRules};
use crate::util::escape_html;

pub(super) struct MediaEmbeds {
    rules: EmbedRules,
}

impl MediaEmbeds {
    pub(super) fn new(rules: EmbedRules) -> Self {
        Self { rules }
    }
}

fn embed_html(embed: &Embed, title: &str) -> String {
    let title = escape_html(title);
    match embed {
        Embed::Video { src } => format!(
            "<video controls=\"\" src=\"{}\" title=\"{title}\"></video>",
            escape_html(src)
        ),
        Embed::Audio { src } => format!(
            "<audio controls=\"\" src=\"{}\" title=\"{title}\"></audio>",
            escape_html(src)
        ),
        Embed::Iframe { site_id, src } => format!(
            "<iframe class=\"embed-{}\" src=\"{}\" title=\"{title}\" allowfullscreen=\"\"></iframe>",
            escape_html(site_id),
            escape_html(src)
        ),
    }
}

impl DocumentTransform for MediaEmbeds {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        // matched image whose alt text is being collected
        let mut pending: Option<(Embed, String)> = None;

        for event in events {
            if let Some((embed, alt)) = &mut pending {
                match event {
                    Event::End(TagEnd::Image) => {
                        out.push(Event::InlineHtml(CowStr::from(embed_html(embed, alt))));
                        pending = None;
                    }
                    Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                    _ => {}
                }
                continue;
            }

            if let Event::Start(Tag::Image { dest_url, .. }) = &event
                && let Some(embed) = self.rules.match_url(dest_url)
            {
                pending = Some((embed, String::new()));
                continue;
            }
            out.push(event);
        }
        out
    }
}

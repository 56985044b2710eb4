//! Bare URL and e-mail address linking.

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

use super::DocumentTransform;

pub(super) struct Autolinks {
    finder: LinkFinder,
}

impl Autolinks {
    pub(super) fn new() -> Self {
        let mut finder = LinkFinder::new();
        finder.kinds(&[LinkKind::Url, LinkKind::Email]);
        Self { finder }
    }

    fn split<'a>(&self, text: &str, out: &mut Vec<Event<'a>>) {
        let mut last = 0;
        for link in self.finder.links(text) {
            if link.start() > last {
                out.push(Event::Text(CowStr::from(text[last..link.start()].to_owned())));
            }
            // the HTML writer adds `mailto:` for email links itself
            let link_type = match link.kind() {
                LinkKind::Email => LinkType::Email,
                _ => LinkType::Autolink,
            };
            out.push(Event::Start(Tag::Link {
                link_type,
                dest_url: CowStr::from(link.as_str().to_owned()),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            out.push(Event::Text(CowStr::from(link.as_str().to_owned())));
            out.push(Event::End(TagEnd::Link));
            last = link.end();
        }
        if last < text.len() {
            out.push(Event::Text(CowStr::from(text[last..].to_owned())));
        }
    }
}

impl DocumentTransform for Autolinks {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        // links, images and code blocks are left alone
        let mut skip_depth = 0_usize;
        for event in events {
            match &event {
                Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                    skip_depth += 1;
                }
                Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                    skip_depth = skip_depth.saturating_sub(1);
                }
                Event::Text(text) if skip_depth == 0 && self.finder.links(text).next().is_some() => {
                    self.split(text, &mut out);
                    continue;
                }
                _ => {}
            }
            out.push(event);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Parser, TextMergeStream, html};

    use super::*;

    fn render(markdown: &str) -> String {
        let events = Autolinks::new().transform(TextMergeStream::new(Parser::new(markdown)).collect());
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_links_bare_urls() {
        assert_eq!(
            render("see https://example.com/a_b?x=1 now"),
            "<p>see <a href=\"https://example.com/a_b?x=1\">https://example.com/a_b?x=1</a> now</p>\n"
        );
    }

    #[test]
    fn test_links_email() {
        assert_eq!(
            render("mail ops@example.com"),
            "<p>mail <a href=\"mailto:ops@example.com\">ops@example.com</a></p>\n"
        );
    }

    #[test]
    fn test_links_email_among_urls() {
        assert_eq!(
            render("a@b.example or https://b.example"),
            "<p><a href=\"mailto:a@b.example\">a@b.example</a> or \
             <a href=\"https://b.example\">https://b.example</a></p>\n"
        );
    }

    #[test]
    fn test_existing_links_and_code_are_untouched() {
        assert_eq!(
            render("[https://a.example](https://b.example) `https://c.example`"),
            "<p><a href=\"https://b.example\">https://a.example</a> <code>https://c.example</code></p>\n"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(render("README.md is here"), "<p>README.md is here</p>\n");
    }
}

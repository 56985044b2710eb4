//! Table of contents extraction from sanitized HTML.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ConvertError;
use crate::util::escape_html;

/// Nested heading list and document title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOfContents {
    /// `<ul>` fragment; empty when no heading has an id.
    pub html: String,
    /// Text of the first heading; empty when there are no headings.
    pub title: String,
}

#[derive(Debug)]
struct Entry {
    level: u8,
    id: String,
    text: String,
}

fn heading_level(name: &[u8]) -> Option<u8> {
    match name {
        [b'h' | b'H', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

fn decode_entity(name: &str) -> String {
    let resolved = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
            .and_then(Result::ok)
            .and_then(char::from_u32),
    };
    resolved.map_or_else(|| format!("&{name};"), String::from)
}

/// Walk the headings of `html`.
///
/// Headings are read in document order; only those with an `id` become TOC
/// entries, while the title is taken from the first heading of any kind.
/// Void elements need not be self-closed.
///
/// # Errors
///
/// Returns [`ConvertError::Toc`] if the markup cannot be tokenized.
pub fn extract_toc(html: &str) -> Result<TableOfContents, ConvertError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut entries = Vec::new();
    let mut title: Option<String> = None;
    // heading being collected: (level, id, text)
    let mut current: Option<(u8, Option<String>, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if current.is_none()
                    && let Some(level) = heading_level(e.name().as_ref())
                {
                    let id = e
                        .html_attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"id")
                        .map(|attr| {
                            attr.unescape_value().map_or_else(
                                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                                std::borrow::Cow::into_owned,
                            )
                        });
                    current = Some((level, id, String::new()));
                }
            }
            Event::Text(e) => {
                if let Some((_, _, text)) = &mut current {
                    text.push_str(&reader.decoder().decode(&e)?);
                }
            }
            Event::GeneralRef(e) => {
                if let Some((_, _, text)) = &mut current {
                    let entity = reader.decoder().decode(&e)?;
                    text.push_str(&decode_entity(&entity));
                }
            }
            Event::CData(e) => {
                if let Some((_, _, text)) = &mut current {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let closes = matches!(
                    (&current, heading_level(e.name().as_ref())),
                    (Some((open, _, _)), Some(level)) if *open == level
                );
                if closes && let Some((level, id, text)) = current.take() {
                    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if title.is_none() {
                        title = Some(text.clone());
                    }
                    if let Some(id) = id.filter(|id| !id.is_empty()) {
                        entries.push(Entry { level, id, text });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(TableOfContents {
        html: render(&entries),
        title: title.unwrap_or_default(),
    })
}

/// Render entries as nested lists.
///
/// A deeper entry opens a list inside the previous item; a shallower one
/// closes lists until its level fits.
fn render(entries: &[Entry]) -> String {
    let mut out = String::new();
    // level of the last item in each open list
    let mut stack: Vec<u8> = Vec::new();

    for entry in entries {
        match stack.last().copied() {
            None => {
                out.push_str("<ul>\n<li>");
                stack.push(entry.level);
            }
            Some(top) if entry.level > top => {
                out.push_str("\n<ul>\n<li>");
                stack.push(entry.level);
            }
            Some(_) => {
                while stack.len() > 1 && entry.level <= stack[stack.len() - 2] {
                    out.push_str("</li>\n</ul>\n");
                    stack.pop();
                }
                out.push_str("</li>\n<li>");
                if let Some(top) = stack.last_mut() {
                    *top = entry.level;
                }
            }
        }
        out.push_str(&format!(
            "<a href=\"#{}\">{}</a>",
            escape_html(&entry.id),
            escape_html(&entry.text)
        ));
    }
    for _ in &stack {
        out.push_str("</li>\n</ul>\n");
    }
    out
}

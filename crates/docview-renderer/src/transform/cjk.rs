//! East Asian line breaks.
//!
//! A soft line break between two CJK characters is dropped instead of being
//! rendered as a space.

use pulldown_cmark::Event;

use super::DocumentTransform;

pub(super) struct CjkLineBreaks;

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{11FF}'     // Hangul Jamo
        | '\u{2E80}'..='\u{2FDF}'   // radicals
        | '\u{3000}'..='\u{303F}'   // CJK symbols and punctuation
        | '\u{3040}'..='\u{30FF}'   // Hiragana, Katakana
        | '\u{3100}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{4E00}'..='\u{9FFF}'   // unified ideographs
        | '\u{AC00}'..='\u{D7AF}'   // Hangul syllables
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}'   // fullwidth forms
        | '\u{20000}'..='\u{2FA1F}'
    )
}

fn ends_cjk(event: Option<&Event<'_>>) -> bool {
    matches!(event, Some(Event::Text(s)) if s.chars().next_back().is_some_and(is_cjk))
}

fn starts_cjk(event: Option<&Event<'_>>) -> bool {
    matches!(event, Some(Event::Text(s)) if s.chars().next().is_some_and(is_cjk))
}

impl DocumentTransform for CjkLineBreaks {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out: Vec<Event<'a>> = Vec::with_capacity(events.len());
        let mut iter = events.into_iter().peekable();
        while let Some(event) = iter.next() {
            if matches!(event, Event::SoftBreak) && ends_cjk(out.last()) && starts_cjk(iter.peek())
            {
                continue;
            }
            out.push(event);
        }
        out
    }
}

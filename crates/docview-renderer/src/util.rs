//! Shared helpers for HTML generation.

/// Escape text for use in HTML content and double-quoted attributes.
///
/// ```
/// use docview_renderer::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert heading text to an ASCII anchor slug.
///
/// Alphanumerics are lowercased, runs of whitespace, `-` and `_` become a
/// single `-`, everything else is dropped.
///
/// ```
/// use docview_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("  API_v2 -- notes "), "api-v2-notes");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html_passes_plain_text() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Überblick"), "berblick");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("1.2 Release"), "12-release");
    }
}

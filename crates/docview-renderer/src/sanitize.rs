//! Allow-list HTML sanitizer.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, RenderConfigError};

const DEFAULT_ALLOW_LIST: &str = include_str!("../data/allow_list.toml");

/// Key in `[tags]` holding attributes allowed on every tag.
const GLOBAL: &str = "*";

/// Tags removed together with their contents.
const CLEAN_CONTENT: [&str; 2] = ["script", "style"];

/// Void elements as serialized by html5ever: `<br>`, `<img src="..">`.
static VOID_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(area|br|col|embed|hr|img|input|source|track|wbr)((?:\s+[^\s"'=<>/]+(?:="[^"]*")?)*)>"#)
        .expect("void element pattern compiles")
});

static PACKAGED: LazyLock<AllowList> = LazyLock::new(|| {
    AllowList::from_toml(DEFAULT_ALLOW_LIST).unwrap_or_else(|err| {
        tracing::error!(error = %err, "Packaged allow-list is invalid");
        AllowList::default()
    })
});

/// Permitted tags with their attributes, and permitted URL schemes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowList {
    pub url_schemes: BTreeSet<String>,
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl AllowList {
    /// Parse a policy document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::Parse`] on invalid TOML.
    pub fn from_toml(text: &str) -> Result<Self, RenderConfigError> {
        toml::from_str(text).map_err(|source| RenderConfigError::Parse {
            what: "allow-list",
            source,
        })
    }

    /// The packaged policy.
    #[must_use]
    pub fn packaged() -> &'static Self {
        &PACKAGED
    }
}

/// Strips everything outside its [`AllowList`].
///
/// Instances own a private copy of the policy and share no state.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    allow: AllowList,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(AllowList::packaged().clone())
    }
}

impl Sanitizer {
    /// Create a sanitizer for `allow`.
    #[must_use]
    pub fn new(allow: AllowList) -> Self {
        Self { allow }
    }

    /// Policy in effect.
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow
    }

    /// Sanitize an HTML fragment.
    ///
    /// Disallowed tags are removed but their text is kept, except for
    /// `script` and `style` whose contents go too. Disallowed attributes and
    /// URLs with other schemes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Encoding`] if `html` is not UTF-8.
    pub fn sanitize(&self, html: &[u8]) -> Result<String, ConvertError> {
        let html = std::str::from_utf8(html)?;

        let tags: HashSet<&str> = self
            .allow
            .tags
            .keys()
            .map(String::as_str)
            .filter(|tag| *tag != GLOBAL && !CLEAN_CONTENT.contains(tag))
            .collect();
        let tag_attributes: HashMap<&str, HashSet<&str>> = self
            .allow
            .tags
            .iter()
            .filter(|(tag, _)| tags.contains(tag.as_str()))
            .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
            .collect();
        let generic: HashSet<&str> = self
            .allow
            .tags
            .get(GLOBAL)
            .map(|attrs| attrs.iter().map(String::as_str).collect())
            .unwrap_or_default();
        let schemes: HashSet<&str> = self.allow.url_schemes.iter().map(String::as_str).collect();

        let mut builder = Builder::empty();
        builder
            .tags(tags)
            .clean_content_tags(CLEAN_CONTENT.into_iter().collect())
            .tag_attributes(tag_attributes)
            .generic_attributes(generic)
            .url_schemes(schemes)
            .link_rel(None);
        let cleaned = builder.clean(html).to_string();
        Ok(VOID_ELEMENT.replace_all(&cleaned, "<${1}${2} />").into_owned())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn clean(html: &str) -> String {
        Sanitizer::default().sanitize(html.as_bytes()).unwrap()
    }

    #[test]
    fn test_packaged_policy_parses() {
        let allow = AllowList::from_toml(DEFAULT_ALLOW_LIST).unwrap();

        assert!(allow.tags.contains_key(GLOBAL));
        assert!(allow.url_schemes.contains("https"));
    }

    #[test]
    fn test_script_removed_with_contents() {
        assert_eq!(
            clean("<p>before<script>alert(1)</script>after</p>"),
            "<p>beforeafter</p>"
        );
    }

    #[test]
    fn test_event_handlers_stripped() {
        assert_eq!(
            clean("<p onclick=\"steal()\" class=\"note\">text</p>"),
            "<p class=\"note\">text</p>"
        );
    }

    #[test]
    fn test_unknown_tags_unwrapped() {
        assert_eq!(clean("<blink>still here</blink>"), "still here");
    }

    #[test]
    fn test_dangerous_schemes_stripped() {
        assert_eq!(
            clean("<a href=\"javascript:alert(1)\">x</a><a href=\"docs/a.md\">y</a>"),
            "<a>x</a><a href=\"docs/a.md\">y</a>"
        );
    }

    #[test]
    fn test_heading_ids_kept() {
        assert_eq!(
            clean("<h2 id=\"setup\">Setup</h2>"),
            "<h2 id=\"setup\">Setup</h2>"
        );
    }

    #[test]
    fn test_void_elements_self_closed() {
        assert_eq!(clean("<p>a<br>b</p><hr>"), "<p>a<br />b</p><hr />");
        assert_eq!(
            clean("<img src=\"a.png\" alt=\"x\">"),
            "<img src=\"a.png\" alt=\"x\" />"
        );
    }

    #[test]
    fn test_escaped_markup_in_text_untouched() {
        assert_eq!(clean("<p>&lt;br&gt;</p>"), "<p>&lt;br&gt;</p>");
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let err = Sanitizer::default().sanitize(&[b'<', b'p', b'>', 0xff]).unwrap_err();

        assert!(matches!(err, ConvertError::Encoding(_)));
    }

    #[test]
    fn test_custom_policy_does_not_touch_packaged() {
        let mut allow = AllowList::packaged().clone();
        allow.tags.remove("p");
        let strict = Sanitizer::new(allow);

        assert_eq!(strict.sanitize(b"<p>x</p>").unwrap(), "x");
        assert_eq!(clean("<p>x</p>"), "<p>x</p>");
    }
}

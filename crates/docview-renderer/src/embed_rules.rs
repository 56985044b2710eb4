//! Media embedding rules.
//!
//! Image references can stand for media: a URL ending in a known audio or
//! video extension, or an absolute URL matched by a site rule. Matching
//! returns an [`Embed`] describing the element to emit instead of `<img>`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{Position, Url};

use crate::error::RenderConfigError;

const DEFAULT_RULES: &str = include_str!("../data/embed_rules.toml");

/// A `video` or `audio` site rule. Either `path` (prefix) or `regex` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRule {
    pub site_id: String,
    pub host: String,
    pub path: String,
    pub regex: String,
}

/// An `iframe` site rule mapping a URL to a player URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IframeRule {
    pub site_id: String,
    pub host: String,
    /// `path`, `query` or `regex`.
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub query: String,
    pub regex: String,
    /// Player URL; `{id}` is replaced by the matched id.
    pub player: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct RuleSet {
    audio_ext: Vec<String>,
    video_ext: Vec<String>,
    video: Vec<MediaRule>,
    audio: Vec<MediaRule>,
    iframe: Vec<IframeRule>,
}

/// Rule document as written; absent keys keep the packaged lists.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RuleOverlay {
    audio_ext: Option<Vec<String>>,
    video_ext: Option<Vec<String>>,
    video: Option<Vec<MediaRule>>,
    audio: Option<Vec<MediaRule>>,
    iframe: Option<Vec<IframeRule>>,
}

/// Element to emit for a matched image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    Video { src: String },
    Audio { src: String },
    Iframe { site_id: String, src: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Video,
    Audio,
}

#[derive(Debug, Clone)]
enum Matcher {
    Prefix(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledMedia {
    kind: MediaKind,
    host: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum IframeMatcher {
    Path(String),
    Query { path: String, key: String },
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledIframe {
    site_id: String,
    host: String,
    matcher: IframeMatcher,
    player: String,
}

/// Validated, compiled embed rules.
#[derive(Debug, Clone)]
pub struct EmbedRules {
    rules: RuleSet,
    media: Vec<CompiledMedia>,
    iframes: Vec<CompiledIframe>,
}

impl Default for EmbedRules {
    fn default() -> Self {
        Self::from_toml(DEFAULT_RULES).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Packaged embed rules are invalid");
            Self {
                rules: RuleSet::default(),
                media: Vec::new(),
                iframes: Vec::new(),
            }
        })
    }
}

impl Serialize for EmbedRules {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rules.serialize(serializer)
    }
}

impl EmbedRules {
    /// Parse a rule document over the packaged rules and validate the result.
    ///
    /// Each top-level key present in `text` replaces the packaged list.
    ///
    /// # Errors
    ///
    /// Returns [`RenderConfigError::Parse`] for invalid TOML and
    /// [`RenderConfigError::EmbedRule`] / [`RenderConfigError::EmbedPattern`]
    /// for invalid rules.
    pub fn from_toml(text: &str) -> Result<Self, RenderConfigError> {
        let parse = |text: &str| {
            toml::from_str::<RuleOverlay>(text).map_err(|source| RenderConfigError::Parse {
                what: "embed rules",
                source,
            })
        };

        let mut rules = RuleSet::default();
        for overlay in [parse(DEFAULT_RULES)?, parse(text)?] {
            if let Some(v) = overlay.audio_ext {
                rules.audio_ext = v;
            }
            if let Some(v) = overlay.video_ext {
                rules.video_ext = v;
            }
            if let Some(v) = overlay.video {
                rules.video = v;
            }
            if let Some(v) = overlay.audio {
                rules.audio = v;
            }
            if let Some(v) = overlay.iframe {
                rules.iframe = v;
            }
        }
        Self::compile(rules)
    }

    fn compile(mut rules: RuleSet) -> Result<Self, RenderConfigError> {
        for ext in rules.audio_ext.iter_mut().chain(rules.video_ext.iter_mut()) {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }

        let mut media = Vec::new();
        for (section, kind, list) in [
            ("video", MediaKind::Video, &rules.video),
            ("audio", MediaKind::Audio, &rules.audio),
        ] {
            for (index, rule) in list.iter().enumerate() {
                let invalid = |message: &str| RenderConfigError::EmbedRule {
                    section,
                    index,
                    message: message.to_owned(),
                };
                if rule.host.is_empty() {
                    return Err(invalid("host is required"));
                }
                let matcher = if !rule.path.is_empty() {
                    Matcher::Prefix(rule.path.clone())
                } else if !rule.regex.is_empty() {
                    Matcher::Pattern(Regex::new(&rule.regex).map_err(|source| {
                        RenderConfigError::EmbedPattern {
                            section,
                            index,
                            source,
                        }
                    })?)
                } else {
                    return Err(invalid("path or regex is required"));
                };
                media.push(CompiledMedia {
                    kind,
                    host: rule.host.clone(),
                    matcher,
                });
            }
        }

        let mut iframes = Vec::new();
        for (index, rule) in rules.iframe.iter().enumerate() {
            let invalid = |message: &str| RenderConfigError::EmbedRule {
                section: "iframe",
                index,
                message: message.to_owned(),
            };
            if rule.host.is_empty() {
                return Err(invalid("host is required"));
            }
            let matcher = match rule.kind.as_str() {
                "path" if rule.path.is_empty() => return Err(invalid("type path requires path")),
                "path" => IframeMatcher::Path(rule.path.clone()),
                "query" if rule.path.is_empty() || rule.query.is_empty() => {
                    return Err(invalid("type query requires path and query"));
                }
                "query" => IframeMatcher::Query {
                    path: rule.path.clone(),
                    key: rule.query.clone(),
                },
                "regex" if rule.regex.is_empty() => {
                    return Err(invalid("type regex requires regex"));
                }
                "regex" => IframeMatcher::Pattern(Regex::new(&rule.regex).map_err(|source| {
                    RenderConfigError::EmbedPattern {
                        section: "iframe",
                        index,
                        source,
                    }
                })?),
                other => return Err(invalid(&format!("unknown type {other:?}"))),
            };
            iframes.push(CompiledIframe {
                site_id: rule.site_id.clone(),
                host: rule.host.clone(),
                matcher,
                player: rule.player.clone(),
            });
        }

        Ok(Self {
            rules,
            media,
            iframes,
        })
    }

    /// Match an image destination against the rules.
    #[must_use]
    pub fn match_url(&self, dest: &str) -> Option<Embed> {
        let ext = url_extension(dest);
        if !ext.is_empty() {
            if self.rules.video_ext.contains(&ext) {
                return Some(Embed::Video {
                    src: dest.to_owned(),
                });
            }
            if self.rules.audio_ext.contains(&ext) {
                return Some(Embed::Audio {
                    src: dest.to_owned(),
                });
            }
        }

        let url = Url::parse(dest).ok()?;
        let host = url.host_str()?;
        let tail = &url[Position::BeforePath..];

        for rule in self.media.iter().filter(|r| r.host == host) {
            let matched = match &rule.matcher {
                Matcher::Prefix(prefix) => url.path().starts_with(prefix.as_str()),
                Matcher::Pattern(re) => re.is_match(tail),
            };
            if matched {
                let src = dest.to_owned();
                return Some(match rule.kind {
                    MediaKind::Video => Embed::Video { src },
                    MediaKind::Audio => Embed::Audio { src },
                });
            }
        }

        self.iframes
            .iter()
            .filter(|r| r.host == host)
            .find_map(|rule| {
                let id = match &rule.matcher {
                    IframeMatcher::Path(prefix) => url
                        .path()
                        .strip_prefix(prefix.as_str())
                        .map(|rest| rest.trim_start_matches('/'))
                        .and_then(|rest| rest.split('/').next())
                        .map(str::to_owned),
                    IframeMatcher::Query { path, key } => (url.path() == path)
                        .then(|| {
                            url.query_pairs()
                                .find(|(k, _)| k == key)
                                .map(|(_, v)| v.into_owned())
                        })
                        .flatten(),
                    IframeMatcher::Pattern(re) => re.captures(tail).and_then(|caps| {
                        caps.get(1)
                            .or_else(|| caps.get(0))
                            .map(|m| m.as_str().to_owned())
                    }),
                }
                .filter(|id| !id.is_empty())?;

                let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
                Some(Embed::Iframe {
                    site_id: rule.site_id.clone(),
                    src: rule.player.replace("{id}", &id),
                })
            })
    }
}

/// Lowercase extension of the last path segment, ignoring query and fragment.
fn url_extension(dest: &str) -> String {
    let path = dest.split(['?', '#']).next().unwrap_or("");
    let name = path.rsplit('/').next().unwrap_or("");
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

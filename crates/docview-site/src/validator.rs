//! `Etag` validators.
//!
//! A validator is a digest over a startup fingerprint and the resource's
//! effective modification time. In personalized mode an HMAC of the timestamp,
//! keyed by the user identity, is mixed in so that pages rendered for different
//! users never share a validator.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Digest over every rendering-affecting input, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest the given parts in order.
    #[must_use]
    pub fn digest<I, B>(parts: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        Self(hasher.finalize().into())
    }

    /// Lowercase hex form, for logging.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Produces and compares validators for one fingerprint.
#[derive(Debug, Clone)]
pub struct CacheValidator {
    fingerprint: Fingerprint,
}

impl CacheValidator {
    /// Create a generator for `fingerprint`.
    #[must_use]
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self { fingerprint }
    }

    /// Validator for a resource last modified at `time`, optionally
    /// personalized for `identity`.
    ///
    /// Returns a quoted strong entity tag.
    #[must_use]
    pub fn make(&self, time: DateTime<Utc>, identity: Option<&str>) -> String {
        let stamp = time.timestamp_micros().to_le_bytes();

        let mut hasher = Sha256::new();
        hasher.update(self.fingerprint.0);
        hasher.update(stamp);
        if let Some(identity) = identity {
            // HMAC accepts keys of any length
            let mut mac = HmacSha256::new_from_slice(identity.as_bytes())
                .expect("HMAC key of any length");
            mac.update(&stamp);
            hasher.update(mac.finalize().into_bytes());
        }

        let digest = hasher.finalize();
        format!("\"{}\"", hex::encode(&digest[..16]))
    }

    /// Check an `If-None-Match` header value against `validator`.
    ///
    /// The header may list several comma-separated tags; one match is enough.
    /// Weak tags compare by their opaque part and `*` matches anything.
    #[must_use]
    pub fn matches(if_none_match: &str, validator: &str) -> bool {
        if_none_match
            .split(',')
            .map(str::trim)
            .any(|tag| tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == validator)
    }
}

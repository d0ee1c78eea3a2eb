//! Caller API key, carried per request and never logged in the clear.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest in fingerprints
const FINGERPRINT_LEN: usize = 12;

/// A bearer API key.
///
/// `Debug` and `Display` print a fingerprint, never the key. Serialization
/// keeps the real value since outbound collaborators need it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Returns `None` for an empty or whitespace-only key.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    /// The raw key, for outbound calls only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short stable SHA-256 prefix, safe for logs and telemetry ids
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        hex
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.fingerprint())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key:{}", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert!(ApiKey::new("abc123").is_some());
    }

    #[test]
    fn test_debug_and_display_hide_key() {
        let key = ApiKey::new("sk-very-secret").unwrap();
        let debug = format!("{:?}", key);
        let display = format!("{}", key);
        assert!(!debug.contains("sk-very-secret"));
        assert!(!display.contains("sk-very-secret"));
        assert!(display.starts_with("key:"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = ApiKey::new("abc123").unwrap();
        let b = ApiKey::new("abc123").unwrap();
        let c = ApiKey::new("abc124").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_serializes_raw_value() {
        let key = ApiKey::new("abc123").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"abc123\"");
        assert_eq!(key.expose(), "abc123");
    }
}

//! Bearer API key extraction.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::domain::ApiKey;

/// Scheme prefix, matched case-sensitively
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the API key from an `Authorization: Bearer <token>` value.
///
/// Any other scheme, a non-ASCII header, or an empty token yields `None`.
pub fn parse_bearer(value: Option<&str>) -> Option<ApiKey> {
    value?.strip_prefix(BEARER_PREFIX).and_then(ApiKey::new)
}

pub fn bearer_api_key(headers: &HeaderMap) -> Option<ApiKey> {
    parse_bearer(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc123")).unwrap().expose(), "abc123");
        assert!(parse_bearer(None).is_none());
        assert!(parse_bearer(Some("")).is_none());
        assert!(parse_bearer(Some("Basic dXNlcjpwYXNz")).is_none());
        assert!(parse_bearer(Some("bearer abc123")).is_none());
        assert!(parse_bearer(Some("Bearer ")).is_none());
        assert!(parse_bearer(Some("Bearerabc123")).is_none());
    }

    #[test]
    fn test_only_leading_prefix_is_stripped() {
        let key = parse_bearer(Some("Bearer Bearer abc")).unwrap();
        assert_eq!(key.expose(), "Bearer abc");
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(bearer_api_key(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_api_key(&headers).unwrap().expose(), "abc123");
    }
}

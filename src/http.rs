//! Shared helpers for outbound HTTP collaborators.

use std::time::Duration;

/// Build a reqwest client with a request timeout, falling back to defaults
pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            log::warn!("Failed to configure HTTP client, using defaults: {}", err);
            reqwest::Client::new()
        }
    }
}

/// Best-effort human message from an error response body
pub(crate) fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("err"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).to_string())
}

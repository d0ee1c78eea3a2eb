//! Request Lookup - resolve a span id to the request record that produced it.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::PlatformConfig;
use crate::http::{build_client, error_message};

const SPAN_PATH: &str = "/api/request/span";

/// Span-to-request lookup.
///
/// `Ok(Value::Null)` means no request carries the span.
#[async_trait]
pub trait RequestLookup: Send + Sync {
    async fn get_request_via_span_id(&self, span_id: &str) -> Result<Value, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Request lookup unavailable: {0}")]
    Transport(String),

    #[error("Request lookup failed with status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Looks spans up through the platform service
#[derive(Clone)]
pub struct PlatformRequestLookup {
    base: String,
    client: reqwest::Client,
}

impl PlatformRequestLookup {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            base: config.url(SPAN_PATH),
            client: build_client(config.timeout()),
        }
    }
}

#[async_trait]
impl RequestLookup for PlatformRequestLookup {
    async fn get_request_via_span_id(&self, span_id: &str) -> Result<Value, LookupError> {
        let mut url =
            reqwest::Url::parse(&self.base).map_err(|e| LookupError::Transport(format!("invalid lookup url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Transport("lookup url cannot carry a path".to_string()))?
            .push(span_id);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Value::Null);
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::Transport(format!("failed reading response: {e}")))?;
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|e| LookupError::Transport(format!("invalid lookup response: {e}")))
    }
}

/// In-memory lookup keyed by span id
#[derive(Debug, Default, Clone)]
pub struct MockRequestLookup {
    records: HashMap<String, Value>,
    fail: bool,
}

impl MockRequestLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, span_id: impl Into<String>, record: Value) -> Self {
        self.records.insert(span_id.into(), record);
        self
    }

    /// Lookup that fails every call
    pub fn failing() -> Self {
        Self {
            records: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RequestLookup for MockRequestLookup {
    async fn get_request_via_span_id(&self, span_id: &str) -> Result<Value, LookupError> {
        if self.fail {
            return Err(LookupError::Transport("lookup backend offline".to_string()));
        }
        Ok(self.records.get(span_id).cloned().unwrap_or(Value::Null))
    }
}

//! PostHog capture API sink.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{TelemetryError, TelemetrySink};
use crate::config::TelemetryConfig;
use crate::domain::TelemetryEvent;
use crate::http::{build_client, error_message};

const CAPTURE_PATH: &str = "capture/";

#[derive(Debug, Serialize)]
struct CapturePayload<'a> {
    api_key: &'a str,
    event: &'static str,
    distinct_id: &'a str,
    properties: Map<String, Value>,
    timestamp: String,
}

/// Sends events to a PostHog-compatible `/capture/` endpoint
#[derive(Clone)]
pub struct PostHogSink {
    url: String,
    api_key: String,
    distinct_id: String,
    client: reqwest::Client,
}

impl PostHogSink {
    pub fn new(config: &TelemetryConfig, api_key: impl Into<String>) -> Self {
        Self {
            url: format!("{}/{}", config.host.trim_end_matches('/'), CAPTURE_PATH),
            api_key: api_key.into(),
            distinct_id: config.distinct_id.clone(),
            client: build_client(config.timeout()),
        }
    }

    fn payload(&self, event: TelemetryEvent) -> CapturePayload<'_> {
        let response_time = event.latency_ms();
        let mut properties = event.properties;
        properties.insert("responseTime".to_string(), Value::from(response_time));
        CapturePayload {
            api_key: &self.api_key,
            event: event.name.as_str(),
            distinct_id: &self.distinct_id,
            properties,
            timestamp: event.start_timestamp.to_rfc3339(),
        }
    }
}

#[async_trait]
impl TelemetrySink for PostHogSink {
    async fn fire_event(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(event))
            .send()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(TelemetryError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

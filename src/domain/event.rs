//! Telemetry event types emitted by the gateway.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one prompt fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "PROMPT_SDK_FETCH_SUCCESS")]
    FetchSuccess,
    #[serde(rename = "PROMPT_SDK_FETCH_FAILURE")]
    FetchFailure,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::FetchSuccess => "PROMPT_SDK_FETCH_SUCCESS",
            EventName::FetchFailure => "PROMPT_SDK_FETCH_FAILURE",
        }
    }

    pub fn for_outcome(failed: bool) -> Self {
        if failed { EventName::FetchFailure } else { EventName::FetchSuccess }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start of a request, captured before any parsing
#[derive(Debug, Clone, Copy)]
pub struct RequestClock {
    wall: DateTime<Utc>,
    mono: Instant,
}

impl RequestClock {
    pub fn start() -> Self {
        Self {
            wall: Utc::now(),
            mono: Instant::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.wall
    }

    pub fn elapsed(&self) -> Duration {
        self.mono.elapsed()
    }
}

/// One telemetry event, dispatched once per compile call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub name: EventName,
    pub properties: Map<String, Value>,
    pub start_timestamp: DateTime<Utc>,
    /// Elapsed time from request entry to event construction
    #[serde(with = "duration_ms")]
    pub latency: Duration,
}

impl TelemetryEvent {
    /// Build a fetch outcome event; latency is measured now
    pub fn fetch_outcome(failed: bool, download_source: Option<&str>, clock: &RequestClock) -> Self {
        let mut properties = Map::new();
        properties.insert(
            "downloadSource".to_string(),
            download_source.map_or(Value::Null, |s| Value::String(s.to_string())),
        );
        Self {
            name: EventName::for_outcome(failed),
            properties,
            start_timestamp: clock.started_at(),
            latency: clock.elapsed(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.name == EventName::FetchFailure
    }

    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_name_for_outcome() {
        assert_eq!(EventName::for_outcome(true), EventName::FetchFailure);
        assert_eq!(EventName::for_outcome(false), EventName::FetchSuccess);
    }

    #[test]
    fn test_event_name_serialization() {
        let json = serde_json::to_string(&EventName::FetchSuccess).unwrap();
        assert_eq!(json, "\"PROMPT_SDK_FETCH_SUCCESS\"");
        assert_eq!(EventName::FetchFailure.to_string(), "PROMPT_SDK_FETCH_FAILURE");
    }

    #[test]
    fn test_fetch_outcome_carries_source() {
        let clock = RequestClock::start();
        let event = TelemetryEvent::fetch_outcome(false, Some("python-sdk"), &clock);
        assert_eq!(event.name, EventName::FetchSuccess);
        assert_eq!(event.properties["downloadSource"], json!("python-sdk"));
        assert_eq!(event.start_timestamp, clock.started_at());
        assert!(!event.is_failure());
    }

    #[test]
    fn test_fetch_outcome_without_source() {
        let clock = RequestClock::start();
        let event = TelemetryEvent::fetch_outcome(true, None, &clock);
        assert!(event.is_failure());
        assert_eq!(event.properties["downloadSource"], Value::Null);
    }

    #[test]
    fn test_latency_is_non_decreasing() {
        let clock = RequestClock::start();
        let first = TelemetryEvent::fetch_outcome(false, None, &clock);
        std::thread::sleep(Duration::from_millis(2));
        let second = TelemetryEvent::fetch_outcome(false, None, &clock);
        assert!(second.latency >= first.latency);
    }

    #[test]
    fn test_event_wire_shape() {
        let clock = RequestClock::start();
        let mut event = TelemetryEvent::fetch_outcome(false, Some("rust-sdk"), &clock);
        event.latency = Duration::from_millis(42);
        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["name"], "PROMPT_SDK_FETCH_SUCCESS");
        assert_eq!(wire["latency"], 42);
        assert!(wire["startTimestamp"].is_string());
    }
}

//! Telemetry Sink - fire-and-forget outcome events
//!
//! The gateway awaits `fire_event` before responding but never lets its
//! error reach the caller; see [`dispatch`].

pub mod posthog;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::TelemetryEvent;

pub use posthog::PostHogSink;

/// Accepts telemetry events
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn fire_event(&self, event: TelemetryEvent) -> Result<(), TelemetryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Telemetry transport error: {0}")]
    Transport(String),

    #[error("Telemetry rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Send an event and swallow any sink failure after logging it
pub async fn dispatch(sink: &dyn TelemetrySink, event: TelemetryEvent) {
    let name = event.name;
    match sink.fire_event(event).await {
        Ok(()) => log::debug!("Telemetry event {} dispatched", name),
        Err(e) => log::warn!("Telemetry event {} dropped: {}", name, e),
    }
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl TelemetrySink for NoopSink {
    async fn fire_event(&self, _event: TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Sink that keeps events in memory, optionally failing after recording
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records events but reports every dispatch as failed
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn fire_event(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        self.events.lock().await.push(event);
        if self.fail {
            return Err(TelemetryError::Transport("sink unavailable".to_string()));
        }
        Ok(())
    }
}

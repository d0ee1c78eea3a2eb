//! Domain types shared by the gateway and its collaborators.

pub mod api_key;
pub mod compile;
pub mod event;

pub use api_key::ApiKey;
pub use compile::{CompilationRequest, CompilationResult, CompileBody, CompiledPrompt, is_truthy};
pub use event::{EventName, RequestClock, TelemetryEvent};

//! Template Compiler - resolve versioned prompt templates and substitute variables
//!
//! This module provides:
//! - TemplateCompiler trait, the gateway's seam to prompt resolution
//! - LocalTemplateCompiler backed by a YAML prompt catalog
//! - PlatformCompiler delegating to the platform service over HTTP
//! - MockTemplateCompiler for tests

pub mod platform;
pub mod render;
pub mod store;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::CompilationRequest;

pub use platform::PlatformCompiler;
pub use render::PromptRenderer;
pub use store::{LocalTemplateCompiler, PromptCatalog, PromptDefinition, PromptDownload, PromptVersion};

/// Resolves a prompt template and substitutes variables.
///
/// `Ok(None)` is a legitimate "no error, empty result" outcome.
#[async_trait]
pub trait TemplateCompiler: Send + Sync {
    async fn compile(&self, request: &CompilationRequest) -> Result<Option<Value>, CompileError>;
}

/// Errors surfaced by a template compiler
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Prompt id or name is required")]
    MissingIdentifier,

    #[error("No such prompt exists")]
    PromptNotFound,

    #[error("No such prompt version exists")]
    VersionNotFound { version: String },

    #[error("Failed to compile prompt: {0}")]
    Render(String),

    #[error("Prompt service error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Prompt service unavailable: {0}")]
    Transport(String),

    /// Structured error passed through verbatim from a remote compiler
    #[error("{0}")]
    Remote(Value),
}

impl CompileError {
    /// Value placed in the `err` field of the response envelope
    pub fn to_wire(&self) -> Value {
        match self {
            CompileError::Remote(value) => value.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Test double that returns a fixed outcome and records every request
pub struct MockTemplateCompiler {
    outcome: Result<Option<Value>, CompileError>,
    calls: Mutex<Vec<CompilationRequest>>,
}

impl MockTemplateCompiler {
    pub fn succeeding(res: Value) -> Self {
        Self::with_outcome(Ok(Some(res)))
    }

    pub fn failing(err: CompileError) -> Self {
        Self::with_outcome(Err(err))
    }

    pub fn empty() -> Self {
        Self::with_outcome(Ok(None))
    }

    pub fn with_outcome(outcome: Result<Option<Value>, CompileError>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<CompilationRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl TemplateCompiler for MockTemplateCompiler {
    async fn compile(&self, request: &CompilationRequest) -> Result<Option<Value>, CompileError> {
        self.calls.lock().await.push(request.clone());
        self.outcome.clone()
    }
}

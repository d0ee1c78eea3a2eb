//! Template compiler that delegates to the platform service over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{CompileError, TemplateCompiler};
use crate::config::PlatformConfig;
use crate::domain::{CompilationRequest, is_truthy};
use crate::http::{build_client, error_message};

const COMPILE_PATH: &str = "/api/prompt/compile";

/// `{ err, res }` reply of the platform compile endpoint
#[derive(Debug, Default, Deserialize)]
struct PlatformReply {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    res: Option<Value>,
}

/// HTTP client for the platform compile endpoint
#[derive(Clone)]
pub struct PlatformCompiler {
    url: String,
    client: reqwest::Client,
}

impl PlatformCompiler {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            url: config.url(COMPILE_PATH),
            client: build_client(config.timeout()),
        }
    }
}

#[async_trait]
impl TemplateCompiler for PlatformCompiler {
    async fn compile(&self, request: &CompilationRequest) -> Result<Option<Value>, CompileError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(request.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| CompileError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CompileError::Transport(format!("failed reading response: {e}")))?;

        if !status.is_success() {
            return Err(CompileError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let reply: PlatformReply = serde_json::from_slice(&body)
            .map_err(|e| CompileError::Transport(format!("invalid compile response: {e}")))?;

        match reply.err {
            Some(err) if is_truthy(&err) => Err(CompileError::Remote(err)),
            _ => Ok(reply.res),
        }
    }
}

//! Prompt Hub client - fetch compiled prompts from a running gateway
//!
//! Mirrors what the platform SDKs send: a bearer key, only the fields the
//! caller set, and a `source` tag identifying the SDK.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{ApiKey, CompilationResult};
use crate::http::{build_client, error_message};

pub const URL_ENV: &str = "OPENLIT_URL";
pub const API_KEY_ENV: &str = "OPENLIT_API_KEY";
pub const SDK_SOURCE: &str = "rust-sdk";

const GET_COMPILED_PATH: &str = "/api/prompt/get-compiled";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Missing {what}: provide it explicitly or set {env_var}")]
    MissingSetting { what: &'static str, env_var: &'static str },

    #[error("Prompt hub unreachable: {0}")]
    Transport(String),

    #[error("Prompt hub returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid prompt hub response: {0}")]
    InvalidResponse(String),
}

/// Which prompt to fetch and how
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_compile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_properties: Option<Value>,
}

impl PromptQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn by_id(prompt_id: impl Into<String>) -> Self {
        Self {
            prompt_id: Some(prompt_id.into()),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Ask the gateway to substitute variables
    pub fn compile(mut self) -> Self {
        self.should_compile = Some(true);
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn meta_properties(mut self, meta: Value) -> Self {
        self.meta_properties = Some(meta);
        self
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    query: &'a PromptQuery,
    source: &'static str,
}

/// Client for the gateway's `get-compiled` endpoint
pub struct PromptHubClient {
    endpoint: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl PromptHubClient {
    pub fn new(url: &str, api_key: &str) -> Result<Self, ClientError> {
        let api_key = ApiKey::new(api_key).ok_or(ClientError::MissingSetting {
            what: "API key",
            env_var: API_KEY_ENV,
        })?;
        if url.trim().is_empty() {
            return Err(ClientError::MissingSetting {
                what: "prompt hub URL",
                env_var: URL_ENV,
            });
        }
        Ok(Self {
            endpoint: format!("{}{}", url.trim_end_matches('/'), GET_COMPILED_PATH),
            api_key,
            client: build_client(DEFAULT_TIMEOUT),
        })
    }

    /// Build from explicit values, falling back to `OPENLIT_URL` / `OPENLIT_API_KEY`
    pub fn from_env(url: Option<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        let url = resolve_setting(url, std::env::var(URL_ENV).ok()).ok_or(ClientError::MissingSetting {
            what: "prompt hub URL",
            env_var: URL_ENV,
        })?;
        let api_key = resolve_setting(api_key, std::env::var(API_KEY_ENV).ok()).ok_or(ClientError::MissingSetting {
            what: "API key",
            env_var: API_KEY_ENV,
        })?;
        Self::new(&url, &api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch a prompt; the gateway's `{ err, res }` envelope is returned as-is
    pub async fn get_prompt(&self, query: &PromptQuery) -> Result<CompilationResult, ClientError> {
        log::debug!("Fetching prompt from {} with {}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&Payload {
                query,
                source: SDK_SOURCE,
            })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("failed reading response: {e}")))?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

/// Explicit value wins over the environment; blanks count as unset
fn resolve_setting(explicit: Option<String>, env_value: Option<String>) -> Option<String> {
    explicit
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::json;

    async fn spawn_echo_gateway(status: StatusCode) -> String {
        let app = Router::new().route(
            GET_COMPILED_PATH,
            post(move |headers: HeaderMap, axum::Json(body): axum::Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (status, axum::Json(json!({"err": null, "res": {"auth": auth, "body": body}})))
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_resolve_setting() {
        assert_eq!(resolve_setting(Some("a".into()), Some("b".into())), Some("a".into()));
        assert_eq!(resolve_setting(None, Some("b".into())), Some("b".into()));
        assert_eq!(resolve_setting(Some(" ".into()), Some("b".into())), Some("b".into()));
        assert_eq!(resolve_setting(None, None), None);
    }

    #[test]
    fn test_new_validates_inputs() {
        assert!(matches!(
            PromptHubClient::new("http://localhost:3000", ""),
            Err(ClientError::MissingSetting { env_var: API_KEY_ENV, .. })
        ));
        assert!(matches!(
            PromptHubClient::new("", "abc123"),
            Err(ClientError::MissingSetting { env_var: URL_ENV, .. })
        ));
        let client = PromptHubClient::new("http://localhost:3000/", "abc123").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/prompt/get-compiled");
    }

    #[test]
    fn test_payload_skips_unset_fields() {
        let query = PromptQuery::by_name("greeting").variable("user", "Ava");
        let wire = serde_json::to_value(Payload {
            query: &query,
            source: SDK_SOURCE,
        })
        .unwrap();
        assert_eq!(
            wire,
            json!({"name": "greeting", "variables": {"user": "Ava"}, "source": "rust-sdk"})
        );
    }

    #[tokio::test]
    async fn test_get_prompt_sends_bearer_and_query() {
        let url = spawn_echo_gateway(StatusCode::OK).await;
        let client = PromptHubClient::new(&url, "abc123").unwrap();

        let query = PromptQuery::by_id("p-1")
            .version("1.0.0")
            .compile()
            .meta_properties(json!({"env": "dev"}));
        let result = client.get_prompt(&query).await.unwrap();

        assert!(result.err.is_none());
        let res = result.res.unwrap();
        assert_eq!(res["auth"], "Bearer abc123");
        assert_eq!(res["body"]["promptId"], "p-1");
        assert_eq!(res["body"]["version"], "1.0.0");
        assert_eq!(res["body"]["shouldCompile"], true);
        assert_eq!(res["body"]["metaProperties"], json!({"env": "dev"}));
        assert_eq!(res["body"]["source"], "rust-sdk");
    }

    #[tokio::test]
    async fn test_get_prompt_maps_error_status() {
        let url = spawn_echo_gateway(StatusCode::SERVICE_UNAVAILABLE).await;
        let client = PromptHubClient::new(&url, "abc123").unwrap();
        let err = client.get_prompt(&PromptQuery::by_name("x")).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }
}

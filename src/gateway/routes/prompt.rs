//! `/prompt/get-compiled`: compile a prompt for an SDK caller.
//!
//! Every outcome except the pre-flight answers 200 with `{ err, res }`;
//! callers inspect `err`, not the status code.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::Value;

use crate::compiler::TemplateCompiler;
use crate::domain::{CompilationRequest, CompilationResult, CompileBody, RequestClock, TelemetryEvent};
use crate::gateway::auth::bearer_api_key;
use crate::gateway::state::GatewayState;
use crate::telemetry;

pub const COMPILE_PATH: &str = "/prompt/get-compiled";

pub const NO_API_KEY: &str = "missing API key";
pub const INVALID_BODY: &str = "invalid request body";

pub fn routes() -> Router<GatewayState> {
    Router::new().route(COMPILE_PATH, post(get_compiled).options(preflight))
}

/// Authenticate, compile, emit one telemetry event, answer `{ err, res }`
pub async fn get_compiled(State(state): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Json<CompilationResult> {
    let clock = RequestClock::start();

    let Some(api_key) = bearer_api_key(&headers) else {
        log::debug!("Rejected compile request without bearer API key");
        return Json(CompilationResult::failure(NO_API_KEY));
    };

    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(e) => {
            log::debug!("Rejected compile request from {}: {}", api_key, e);
            return Json(CompilationResult::failure(INVALID_BODY));
        }
    };

    let request = CompilationRequest::from_body(body, api_key);
    let result = compile_captured(state.compiler.as_ref(), &request).await;

    let event = TelemetryEvent::fetch_outcome(result.is_failure(), request.download_source.as_deref(), &clock);
    telemetry::dispatch(state.telemetry.as_ref(), event).await;

    log::info!(
        "Compile request from {} for {} finished in {:?} (failed: {})",
        request.api_key,
        request.id.as_deref().or(request.name.as_deref()).unwrap_or("<unnamed>"),
        clock.elapsed(),
        result.is_failure()
    );
    Json(result)
}

/// Bodies must be JSON objects; serde alone would also accept arrays
fn parse_body(raw: &[u8]) -> Result<CompileBody, serde_json::Error> {
    match serde_json::from_slice::<Value>(raw)? {
        value @ Value::Object(_) => serde_json::from_value(value),
        other => Err(serde::de::Error::custom(format!("expected a JSON object, got {other}"))),
    }
}

/// Run the compiler and fold its outcome into the response envelope
pub async fn compile_captured(compiler: &dyn TemplateCompiler, request: &CompilationRequest) -> CompilationResult {
    match compiler.compile(request).await {
        Ok(res) => CompilationResult::success(res),
        Err(e) => CompilationResult::failure(e.to_wire()),
    }
}

/// Cross-origin pre-flight: 200, no body
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
        ],
    )
}

//! `/metrics/request/span/{id}`: proxy a span id to the request lookup.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use serde_json::Value;

use crate::gateway::error::{NO_SPAN_ID, RouteError};
use crate::gateway::state::GatewayState;

pub fn routes() -> Router<GatewayState> {
    Router::new()
        .route("/metrics/request/span/:id", get(get_request_by_span))
        .route("/metrics/request/span/", get(missing_span_id))
        .route("/metrics/request/span", get(missing_span_id))
}

pub async fn get_request_by_span(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RouteError> {
    if id.trim().is_empty() {
        return Err(RouteError::MissingParameter(NO_SPAN_ID));
    }
    let record = state.lookup.get_request_via_span_id(&id).await?;
    Ok(Json(record))
}

async fn missing_span_id() -> RouteError {
    RouteError::MissingParameter(NO_SPAN_ID)
}

//! Route-level errors that map to HTTP status codes.
//!
//! Compilation failures never use these; they travel in-band in the
//! `{ err, res }` envelope with status 200.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::lookup::LookupError;

pub const NO_SPAN_ID: &str = "No span id provided";

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Required path parameter absent; body is the bare message string
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::MissingParameter(message) => (StatusCode::BAD_REQUEST, Json(message)).into_response(),
            RouteError::Lookup(err) => {
                log::error!("Span lookup failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "err": err.to_string() }))).into_response()
            }
            RouteError::NotFound(_) => (StatusCode::NOT_FOUND, Json(json!({ "err": self.to_string() }))).into_response(),
        }
    }
}

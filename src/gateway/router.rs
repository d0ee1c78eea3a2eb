//! Gateway router setup.

use axum::Router;
use axum::extract::OriginalUri;
use tower_http::trace::TraceLayer;

use crate::gateway::error::RouteError;
use crate::gateway::routes;
use crate::gateway::state::GatewayState;

/// Prefix the dashboard's API routes live under
pub const API_PREFIX: &str = "/api";

/// Creates the gateway router.
///
/// Routes are served both at the root and under `/api`, matching the
/// dashboard's public paths.
pub fn gateway_router(state: GatewayState) -> Router {
    let api = Router::new()
        .merge(routes::prompt::routes())
        .merge(routes::span::routes());

    Router::new()
        .merge(api.clone())
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: OriginalUri) -> RouteError {
    RouteError::NotFound(uri.0.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::MockTemplateCompiler;
    use crate::lookup::MockRequestLookup;
    use crate::telemetry::NoopSink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        gateway_router(GatewayState::new(
            Arc::new(MockTemplateCompiler::succeeding(json!({"prompt": "hi"}))),
            Arc::new(NoopSink),
            Arc::new(MockRequestLookup::new()),
        ))
    }

    #[tokio::test]
    async fn test_unknown_path_returns_not_found() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/this/path/does/not/exist")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_routes_mounted_under_api_prefix() {
        for uri in ["/prompt/get-compiled", "/api/prompt/get-compiled"] {
            let response = router()
                .oneshot(
                    Request::builder()
                        .method("OPTIONS")
                        .uri(uri)
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}

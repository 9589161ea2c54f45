//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Health check (unauthenticated for load balancers/k8s liveness checks)
        .route("/v1/health", get(handlers::health_check))
        // Edge compute hook
        .route("/v1/edge/origin-request", post(handlers::origin_request))
        // Origin mode
        .route("/media/{file}", get(handlers::get_media));

    // When enabled, this endpoint must be network-restricted.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

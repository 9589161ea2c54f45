//! Edge mode: answer origin-request events.

use crate::edge::{EdgeEvent, EdgeReply, EdgeRequest};
use crate::metrics;
use crate::response::Outcome;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

/// POST /v1/edge/origin-request - Resolve the event's request URI.
///
/// Replies with the request itself when the derivative exists, or with a
/// generated redirect response. A body that is not an event gets the error
/// fallback like any other unusable request.
pub async fn origin_request(
    State(state): State<AppState>,
    payload: Result<Json<EdgeEvent>, JsonRejection>,
) -> Json<EdgeReply> {
    let request = match payload {
        Ok(Json(event)) => event.into_request(),
        Err(rejection) => {
            tracing::error!(error = %rejection, "unreadable origin-request event");
            None
        }
    };

    let outcome = match request.as_ref().and_then(EdgeRequest::uri) {
        Some(uri) => state.engine.handle(uri).await,
        None => {
            tracing::error!("origin-request event carries no request uri");
            metrics::record_derive_error("invalid_event");
            metrics::OUTCOMES
                .with_label_values(&[Outcome::ErrorFallback.kind()])
                .inc();
            Outcome::ErrorFallback
        }
    };

    Json(state.emitter.edge(outcome, request.unwrap_or_default()))
}

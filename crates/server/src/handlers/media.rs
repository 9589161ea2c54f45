//! Origin mode: serve derivatives over plain HTTP.

use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;

/// GET /media/{file} - Resolve a derivative and answer with the image or a redirect.
pub async fn get_media(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let uri = format!("/media/{file}");
    let outcome = state.engine.handle(&uri).await;
    state.emitter.http(outcome, state.storage.as_ref()).await
}

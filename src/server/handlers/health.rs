use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "vector_backend": state.settings.vector_backend.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

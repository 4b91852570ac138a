use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::models::{SuggestionRequest, Top3Response, MAX_ITEMS_LIMIT};
use crate::state::AppState;

fn validate_suggestion(payload: &SuggestionRequest) -> Result<(), ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }
    if !(1..=MAX_ITEMS_LIMIT).contains(&payload.max_items) {
        return Err(ApiError::BadRequest(format!(
            "maxItems must be between 1 and {}",
            MAX_ITEMS_LIMIT
        )));
    }
    Ok(())
}

/// Return the user's top suggested actions.
pub async fn suggest_top3(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SuggestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    validate_suggestion(&payload)?;

    let top3 = state.rag.suggest_top3(&payload).await?;
    Ok(Json(Top3Response::new(top3)))
}

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::models::{DeleteItemRequest, SuccessResponse, UpsertItemRequest};
use crate::state::AppState;

fn validate_upsert(payload: &UpsertItemRequest) -> Result<(), ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }
    if payload.item.id.trim().is_empty() {
        return Err(ApiError::BadRequest("item.id must not be empty".to_string()));
    }
    if payload.item.title.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "item.title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_delete(payload: &DeleteItemRequest) -> Result<(), ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }
    if payload.item_id.trim().is_empty() {
        return Err(ApiError::BadRequest("itemId must not be empty".to_string()));
    }
    Ok(())
}

/// Upsert or update a user's item embedding.
pub async fn upsert_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    validate_upsert(&payload)?;

    state.store.upsert(&payload.user_id, &payload.item).await?;
    Ok(Json(SuccessResponse::default()))
}

/// Delete an item vector. Deleting an unknown id succeeds.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<DeleteItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    validate_delete(&payload)?;

    tracing::debug!("Delete requested by user {}", payload.user_id);
    state.store.delete(&payload.item_id).await?;
    Ok(Json(SuccessResponse::default()))
}

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, RefreshRequest, RemovalRequest};

/// POST /account/remove
pub async fn request_removal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RemovalRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state
        .shared
        .auth_service
        .request_account_removal(&payload.email)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Deletion link sent".to_string(),
    })))
}

/// POST /account/remove/confirm
pub async fn confirm_removal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let username = state
        .shared
        .auth_service
        .remove_account(&payload.access_token, &payload.refresh_token)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Account '{username}' removed"),
    })))
}

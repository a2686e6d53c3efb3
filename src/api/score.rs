use axum::{Json, extract::State};
use std::sync::Arc;

use super::auth::AuthIdentity;
use super::{AchievementsRequest, ApiError, ApiResponse, AppState};
use crate::services::{ScorePayload, ScoreSubmission};

/// GET /score
pub async fn get_scores(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<ApiResponse<ScorePayload>>, ApiError> {
    let payload = state.shared.score_service.get_scores(identity.id).await?;
    Ok(Json(ApiResponse::success(payload)))
}

/// POST /score
pub async fn submit_scores(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Json(submission): Json<ScoreSubmission>,
) -> Result<Json<ApiResponse<ScorePayload>>, ApiError> {
    let merged = state
        .shared
        .score_service
        .submit_scores(identity.id, submission)
        .await?;
    Ok(Json(ApiResponse::success(merged)))
}

/// POST /achievements
pub async fn submit_achievements(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Json(payload): Json<AchievementsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let merged = state
        .shared
        .score_service
        .merge_achievements(identity.id, payload.achievements)
        .await?;
    Ok(Json(ApiResponse::success(merged)))
}

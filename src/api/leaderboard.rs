use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::AuthIdentity;
use super::{ApiError, ApiResponse, AppState, LeaderboardQuery, LeaderboardSubmitRequest};
use crate::services::RankedEntry;

/// GET /leaderboard/{mode}
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<RankedEntry>>>, ApiError> {
    let ranked = state
        .shared
        .leaderboard_service
        .ranked(&mode, query.top_n)
        .await?;
    Ok(Json(ApiResponse::success(ranked)))
}

/// POST /leaderboard/{mode}
pub async fn submit_entry(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    AuthIdentity(identity): AuthIdentity,
    Json(payload): Json<LeaderboardSubmitRequest>,
) -> Result<Json<ApiResponse<RankedEntry>>, ApiError> {
    let entry = state
        .shared
        .leaderboard_service
        .submit(identity.id, &mode, payload.score)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

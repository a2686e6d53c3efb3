use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, request::Parts},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, LoginRequest, RefreshRequest, RegisterRequest,
    SessionResponse,
};
use crate::entities::identities;
use crate::services::{IdentityInfo, SessionResult};

// ============================================================================
// Extractor
// ============================================================================

/// Bearer-authenticated identity. A route taking this extractor rejects with
/// 401 unless the access token is valid, unexpired, and still backed by a
/// session row.
pub struct AuthIdentity(pub identities::Model);

impl FromRequestParts<Arc<AppState>> for AuthIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let identity = state.shared.auth_service.authenticate(&token).await?;
        tracing::Span::current().record("user_id", identity.username.as_str());

        Ok(Self(identity))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

async fn session_response(
    state: &AppState,
    session: SessionResult,
) -> Result<SessionResponse, ApiError> {
    let score = state
        .shared
        .score_service
        .get_scores(session.identity.id)
        .await?;
    Ok(SessionResponse::from_parts(session, score))
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let session = state
        .shared
        .auth_service
        .register(
            &payload.username,
            &payload.email,
            &payload.password,
            payload.is_web,
        )
        .await?;

    let response = session_response(&state, session).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    if payload.login.is_empty() {
        return Err(ApiError::validation("Login is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let session = state
        .shared
        .auth_service
        .login(&payload.login, &payload.password, payload.is_web)
        .await?;

    let response = session_response(&state, session).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let session = state
        .shared
        .auth_service
        .refresh(&payload.access_token, &payload.refresh_token)
        .await?;

    let response = session_response(&state, session).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// GET /auth/me
pub async fn get_current_user(
    AuthIdentity(identity): AuthIdentity,
) -> Json<ApiResponse<IdentityInfo>> {
    Json(ApiResponse::success(identity.into()))
}

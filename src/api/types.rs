use serde::{Deserialize, Serialize};

use crate::services::{IdentityInfo, ScorePayload, SessionResult};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_web: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub is_web: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session response: identity, token pair and current progress.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: IdentityInfo,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
    pub platform_achievement: bool,
    pub score: ScorePayload,
}

impl SessionResponse {
    pub fn from_parts(session: SessionResult, score: ScorePayload) -> Self {
        Self {
            user: session.identity,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            access_expires_at: session.access_expires_at,
            refresh_expires_at: session.refresh_expires_at,
            platform_achievement: session.platform_achievement,
            score,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AchievementsRequest {
    pub achievements: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub top_n: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardSubmitRequest {
    pub score: i32,
}

#[derive(Debug, Deserialize)]
pub struct RemovalRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

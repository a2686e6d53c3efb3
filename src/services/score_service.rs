//! Domain service for per-identity game progress.
//!
//! Scores and counters only ever move up: a submission below the stored
//! value is kept at the stored value, so late or replayed reports can never
//! regress progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::identities;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ScoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Progress counters as reported by the game client. All cumulative.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreSubmission {
    pub best_score_solo: i32,
    pub best_score_duo: i32,
    pub total_flaps: i32,
    pub total_gates_cleared: i32,
    pub total_games: i32,
}

/// Progress snapshot returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePayload {
    pub best_score_solo: i32,
    pub best_score_duo: i32,
    pub total_flaps: i32,
    pub total_gates_cleared: i32,
    pub total_games: i32,
    pub achievements: serde_json::Value,
}

impl ScorePayload {
    pub fn from_identity(identity: &identities::Model) -> Self {
        Self {
            best_score_solo: identity.best_score_solo,
            best_score_duo: identity.best_score_duo,
            total_flaps: identity.total_flaps,
            total_gates_cleared: identity.total_gates_cleared,
            total_games: identity.total_games,
            achievements: serde_json::from_str(&identity.achievements)
                .unwrap_or_else(|_| serde_json::json!({})),
        }
    }
}

#[async_trait::async_trait]
pub trait ScoreService: Send + Sync {
    /// Current progress snapshot for an identity.
    async fn get_scores(&self, identity_id: i32) -> Result<ScorePayload, ScoreError>;

    /// Monotonic merge of a submission into stored progress; returns the
    /// merged snapshot.
    async fn submit_scores(
        &self,
        identity_id: i32,
        submission: ScoreSubmission,
    ) -> Result<ScorePayload, ScoreError>;

    /// Merges achievement flags into the stored map. Existing keys are
    /// overwritten by the submitted value; nothing is ever removed.
    async fn merge_achievements(
        &self,
        identity_id: i32,
        achievements: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ScoreError>;
}

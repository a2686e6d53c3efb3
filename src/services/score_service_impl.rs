//! `SeaORM` implementation of the `ScoreService` trait.

use async_trait::async_trait;

use crate::db::{ProgressUpdate, Store};
use crate::services::score_service::{ScoreError, ScorePayload, ScoreService, ScoreSubmission};

pub struct SeaOrmScoreService {
    store: Store,
}

impl SeaOrmScoreService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ScoreService for SeaOrmScoreService {
    async fn get_scores(&self, identity_id: i32) -> Result<ScorePayload, ScoreError> {
        let identity = self
            .store
            .get_identity(identity_id)
            .await?
            .ok_or(ScoreError::IdentityNotFound)?;

        Ok(ScorePayload::from_identity(&identity))
    }

    async fn submit_scores(
        &self,
        identity_id: i32,
        submission: ScoreSubmission,
    ) -> Result<ScorePayload, ScoreError> {
        if submission.best_score_solo < 0
            || submission.best_score_duo < 0
            || submission.total_flaps < 0
            || submission.total_gates_cleared < 0
            || submission.total_games < 0
        {
            return Err(ScoreError::Validation(
                "Score values cannot be negative".to_string(),
            ));
        }

        let identity = self
            .store
            .get_identity(identity_id)
            .await?
            .ok_or(ScoreError::IdentityNotFound)?;

        // Keep whichever side is larger, field by field.
        let merged = ProgressUpdate {
            best_score_solo: identity.best_score_solo.max(submission.best_score_solo),
            best_score_duo: identity.best_score_duo.max(submission.best_score_duo),
            total_flaps: identity.total_flaps.max(submission.total_flaps),
            total_gates_cleared: identity
                .total_gates_cleared
                .max(submission.total_gates_cleared),
            total_games: identity.total_games.max(submission.total_games),
        };

        self.store
            .update_identity_progress(identity_id, merged)
            .await?;

        let identity = self
            .store
            .get_identity(identity_id)
            .await?
            .ok_or(ScoreError::IdentityNotFound)?;

        Ok(ScorePayload::from_identity(&identity))
    }

    async fn merge_achievements(
        &self,
        identity_id: i32,
        achievements: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ScoreError> {
        let identity = self
            .store
            .get_identity(identity_id)
            .await?
            .ok_or(ScoreError::IdentityNotFound)?;

        let mut merged: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&identity.achievements).unwrap_or_default();
        merged.extend(achievements);

        let json =
            serde_json::to_string(&merged).map_err(|e| ScoreError::Internal(e.to_string()))?;
        self.store
            .set_identity_achievements(identity_id, &json)
            .await?;

        Ok(serde_json::Value::Object(merged))
    }
}

//! Domain service for time-windowed leaderboards.
//!
//! A ranked view is the union of five top-N windows over the same entries:
//! all-time, past year, past month, past week, past day. Each window is
//! ordered and capped independently; the union deduplicates identical rows
//! but never re-sorts across windows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::entities::leaderboard_entries;

/// Game modes with a leaderboard.
pub const MODES: [&str; 2] = ["solo", "duo"];

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Unknown game mode: {0}")]
    UnknownMode(String),

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for LeaderboardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One row of a ranked view.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub score: i32,
    pub user_name: String,
    pub user_id: i32,
    pub timestamp: DateTime<Utc>,
}

impl From<leaderboard_entries::Model> for RankedEntry {
    fn from(model: leaderboard_entries::Model) -> Self {
        Self {
            score: model.score,
            user_name: model.user_name,
            user_id: model.user_id,
            timestamp: model.timestamp,
        }
    }
}

#[async_trait::async_trait]
pub trait LeaderboardService: Send + Sync {
    /// The five-window ranked view for a mode. `top_n` caps each window
    /// independently, not the union.
    async fn ranked(
        &self,
        mode: &str,
        top_n: Option<u64>,
    ) -> Result<Vec<RankedEntry>, LeaderboardError>;

    /// Appends an immutable entry stamped with the current instant and the
    /// submitting identity.
    async fn submit(
        &self,
        identity_id: i32,
        mode: &str,
        score: i32,
    ) -> Result<RankedEntry, LeaderboardError>;
}

pub(crate) fn validate_mode(mode: &str) -> Result<(), LeaderboardError> {
    if MODES.contains(&mode) {
        Ok(())
    } else {
        Err(LeaderboardError::UnknownMode(mode.to_string()))
    }
}

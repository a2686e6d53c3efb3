use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::leaderboard_entries;

pub struct LeaderboardRepository {
    conn: DatabaseConnection,
}

impl LeaderboardRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        mode: &str,
        score: i32,
        user_name: &str,
        user_id: i32,
        timestamp: DateTime<Utc>,
    ) -> Result<leaderboard_entries::Model> {
        let active = leaderboard_entries::ActiveModel {
            mode: Set(mode.to_string()),
            score: Set(score),
            user_name: Set(user_name.to_string()),
            user_id: Set(user_id),
            timestamp: Set(timestamp),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert leaderboard entry")
    }

    /// Top entries for one time window: score descending, then earliest
    /// timestamp first on ties. `cutoff: None` means all-time; a dated
    /// cutoff is exclusive (strictly after).
    pub async fn top_for_window(
        &self,
        mode: &str,
        cutoff: Option<DateTime<Utc>>,
        limit: u64,
    ) -> Result<Vec<leaderboard_entries::Model>> {
        let mut query = leaderboard_entries::Entity::find()
            .filter(leaderboard_entries::Column::Mode.eq(mode));

        if let Some(cutoff) = cutoff {
            query = query.filter(leaderboard_entries::Column::Timestamp.gt(cutoff));
        }

        query
            .order_by_desc(leaderboard_entries::Column::Score)
            .order_by_asc(leaderboard_entries::Column::Timestamp)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query leaderboard window")
    }

    pub async fn remove_for_user(&self, user_id: i32) -> Result<u64> {
        let result = leaderboard_entries::Entity::delete_many()
            .filter(leaderboard_entries::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete leaderboard entries for user")?;
        Ok(result.rows_affected)
    }
}

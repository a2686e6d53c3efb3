use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::entities::identities;

/// Field values for a brand-new identity row. Everything else (scores,
/// achievements, platform reach) starts at its zero state.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub origin: i32,
}

/// Cumulative progress counters written back after a game.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    pub best_score_solo: i32,
    pub best_score_duo: i32,
    pub total_flaps: i32,
    pub total_gates_cleared: i32,
    pub total_games: i32,
}

pub struct IdentityRepository {
    conn: DatabaseConnection,
}

impl IdentityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<identities::Model>> {
        identities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query identity by ID")
    }

    /// Username lookup is case-insensitive; the stored casing is whatever
    /// the identity registered with.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<identities::Model>> {
        identities::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(identities::Column::Username)))
                    .eq(username.to_lowercase()),
            )
            .one(&self.conn)
            .await
            .context("Failed to query identity by username")
    }

    /// Email lookup is case-insensitive so password-reset style flows match
    /// however the address was typed.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<identities::Model>> {
        identities::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(identities::Column::Email)))
                    .eq(email.to_lowercase()),
            )
            .one(&self.conn)
            .await
            .context("Failed to query identity by email")
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        let count = identities::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(identities::Column::Username)))
                    .eq(username.to_lowercase()),
            )
            .count(&self.conn)
            .await
            .context("Failed to count identities by username")?;
        Ok(count > 0)
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        let count = identities::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(identities::Column::Email)))
                    .eq(email.to_lowercase()),
            )
            .count(&self.conn)
            .await
            .context("Failed to count identities by email")?;
        Ok(count > 0)
    }

    pub async fn create(&self, new: NewIdentity) -> Result<identities::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = identities::ActiveModel {
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            salt: Set(new.salt),
            origin: Set(new.origin),
            platform_reach: Set(0),
            best_score_solo: Set(0),
            best_score_duo: Set(0),
            total_flaps: Set(0),
            total_gates_cleared: Set(0),
            total_games: Set(0),
            achievements: Set("{}".to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert identity")
    }

    pub async fn set_platform_reach(&self, id: i32, reach: i32) -> Result<()> {
        let identity = identities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query identity for platform update")?
            .ok_or_else(|| anyhow::anyhow!("Identity not found: {id}"))?;

        let mut active: identities::ActiveModel = identity.into();
        active.platform_reach = Set(reach);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn update_progress(&self, id: i32, progress: ProgressUpdate) -> Result<()> {
        let identity = identities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query identity for progress update")?
            .ok_or_else(|| anyhow::anyhow!("Identity not found: {id}"))?;

        let mut active: identities::ActiveModel = identity.into();
        active.best_score_solo = Set(progress.best_score_solo);
        active.best_score_duo = Set(progress.best_score_duo);
        active.total_flaps = Set(progress.total_flaps);
        active.total_gates_cleared = Set(progress.total_gates_cleared);
        active.total_games = Set(progress.total_games);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_achievements(&self, id: i32, achievements: &str) -> Result<()> {
        let identity = identities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query identity for achievements update")?
            .ok_or_else(|| anyhow::anyhow!("Identity not found: {id}"))?;

        let mut active: identities::ActiveModel = identity.into();
        active.achievements = Set(achievements.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = identities::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete identity")?;
        Ok(result.rows_affected > 0)
    }
}

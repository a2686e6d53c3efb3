use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::session_tokens;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert_pair(
        &self,
        identity_id: i32,
        access_token: &str,
        refresh_token: &str,
        access_expires_at: i64,
        refresh_expires_at: i64,
    ) -> Result<session_tokens::Model> {
        let active = session_tokens::ActiveModel {
            identity_id: Set(identity_id),
            access_token: Set(access_token.to_string()),
            refresh_token: Set(refresh_token.to_string()),
            access_expires_at: Set(access_expires_at),
            refresh_expires_at: Set(refresh_expires_at),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert session token pair")
    }

    pub async fn get_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<session_tokens::Model>> {
        session_tokens::Entity::find()
            .filter(session_tokens::Column::AccessToken.eq(access_token))
            .one(&self.conn)
            .await
            .context("Failed to query session by access token")
    }

    /// Refresh requires the exact pair on file, not just a valid refresh
    /// token. A rotated-away pair no longer matches any row.
    pub async fn get_by_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Option<session_tokens::Model>> {
        session_tokens::Entity::find()
            .filter(session_tokens::Column::AccessToken.eq(access_token))
            .filter(session_tokens::Column::RefreshToken.eq(refresh_token))
            .one(&self.conn)
            .await
            .context("Failed to query session by token pair")
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = session_tokens::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete session token pair")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn remove_for_identity(&self, identity_id: i32) -> Result<u64> {
        let result = session_tokens::Entity::delete_many()
            .filter(session_tokens::Column::IdentityId.eq(identity_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete sessions for identity")?;
        Ok(result.rows_affected)
    }

    /// Drops rows whose refresh window has closed; they can never be used
    /// again even if presented.
    pub async fn prune_expired(&self, now_unix: i64) -> Result<u64> {
        let result = session_tokens::Entity::delete_many()
            .filter(session_tokens::Column::RefreshExpiresAt.lt(now_unix))
            .exec(&self.conn)
            .await
            .context("Failed to prune expired sessions")?;
        Ok(result.rows_affected)
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{identities, leaderboard_entries, session_tokens};

pub mod migrator;
pub mod repositories;

pub use repositories::identity::{NewIdentity, ProgressUpdate};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") && !db_url.contains("mode=memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn identity_repo(&self) -> repositories::identity::IdentityRepository {
        repositories::identity::IdentityRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn leaderboard_repo(&self) -> repositories::leaderboard::LeaderboardRepository {
        repositories::leaderboard::LeaderboardRepository::new(self.conn.clone())
    }

    // ========== Identities ==========

    pub async fn get_identity(&self, id: i32) -> Result<Option<identities::Model>> {
        self.identity_repo().get_by_id(id).await
    }

    pub async fn get_identity_by_username(
        &self,
        username: &str,
    ) -> Result<Option<identities::Model>> {
        self.identity_repo().get_by_username(username).await
    }

    pub async fn get_identity_by_email(&self, email: &str) -> Result<Option<identities::Model>> {
        self.identity_repo().get_by_email(email).await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        self.identity_repo().username_taken(username).await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        self.identity_repo().email_taken(email).await
    }

    pub async fn create_identity(&self, new: NewIdentity) -> Result<identities::Model> {
        self.identity_repo().create(new).await
    }

    pub async fn set_platform_reach(&self, id: i32, reach: i32) -> Result<()> {
        self.identity_repo().set_platform_reach(id, reach).await
    }

    pub async fn update_identity_progress(&self, id: i32, progress: ProgressUpdate) -> Result<()> {
        self.identity_repo().update_progress(id, progress).await
    }

    pub async fn set_identity_achievements(&self, id: i32, achievements: &str) -> Result<()> {
        self.identity_repo().set_achievements(id, achievements).await
    }

    pub async fn remove_identity(&self, id: i32) -> Result<bool> {
        self.identity_repo().remove(id).await
    }

    // ========== Session tokens ==========

    pub async fn insert_session(
        &self,
        identity_id: i32,
        access_token: &str,
        refresh_token: &str,
        access_expires_at: i64,
        refresh_expires_at: i64,
    ) -> Result<session_tokens::Model> {
        self.token_repo()
            .insert_pair(
                identity_id,
                access_token,
                refresh_token,
                access_expires_at,
                refresh_expires_at,
            )
            .await
    }

    pub async fn get_session_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<session_tokens::Model>> {
        self.token_repo().get_by_access_token(access_token).await
    }

    pub async fn get_session_by_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Option<session_tokens::Model>> {
        self.token_repo()
            .get_by_pair(access_token, refresh_token)
            .await
    }

    pub async fn remove_session(&self, id: i32) -> Result<bool> {
        self.token_repo().remove(id).await
    }

    pub async fn remove_sessions_for_identity(&self, identity_id: i32) -> Result<u64> {
        self.token_repo().remove_for_identity(identity_id).await
    }

    pub async fn prune_expired_sessions(&self, now_unix: i64) -> Result<u64> {
        self.token_repo().prune_expired(now_unix).await
    }

    // ========== Leaderboard ==========

    pub async fn insert_leaderboard_entry(
        &self,
        mode: &str,
        score: i32,
        user_name: &str,
        user_id: i32,
        timestamp: DateTime<Utc>,
    ) -> Result<leaderboard_entries::Model> {
        self.leaderboard_repo()
            .insert(mode, score, user_name, user_id, timestamp)
            .await
    }

    pub async fn leaderboard_window(
        &self,
        mode: &str,
        cutoff: Option<DateTime<Utc>>,
        limit: u64,
    ) -> Result<Vec<leaderboard_entries::Model>> {
        self.leaderboard_repo()
            .top_for_window(mode, cutoff, limit)
            .await
    }

    pub async fn remove_leaderboard_entries_for_user(&self, user_id: i32) -> Result<u64> {
        self.leaderboard_repo().remove_for_user(user_id).await
    }
}

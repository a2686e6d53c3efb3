use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::clients::MailerClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::NotificationEvent;
use crate::services::{
    AuthService, LeaderboardService, ScoreService, SeaOrmAuthService, SeaOrmLeaderboardService,
    SeaOrmScoreService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub score_service: Arc<dyn ScoreService>,

    pub leaderboard_service: Arc<dyn LeaderboardService>,

    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::init_with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let mailer = MailerClient::new(config.email.clone())?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            &config.auth,
            &config.security,
            &config.server,
            mailer,
            event_bus.clone(),
        )) as Arc<dyn AuthService>;

        let score_service = Arc::new(SeaOrmScoreService::new(store.clone())) as Arc<dyn ScoreService>;

        let leaderboard_service = Arc::new(SeaOrmLeaderboardService::new(
            store.clone(),
            event_bus.clone(),
        )) as Arc<dyn LeaderboardService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            score_service,
            leaderboard_service,
            event_bus,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}

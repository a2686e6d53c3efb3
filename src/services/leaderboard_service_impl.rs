//! `SeaORM` implementation of the `LeaderboardService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;

use crate::constants::leaderboard::{DEFAULT_TOP_N, MAX_TOP_N, WINDOW_DAYS};
use crate::db::Store;
use crate::domain::NotificationEvent;
use crate::services::leaderboard_service::{
    LeaderboardError, LeaderboardService, RankedEntry, validate_mode,
};

pub struct SeaOrmLeaderboardService {
    store: Store,
    events: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmLeaderboardService {
    #[must_use]
    pub const fn new(store: Store, events: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, events }
    }
}

#[async_trait]
impl LeaderboardService for SeaOrmLeaderboardService {
    async fn ranked(
        &self,
        mode: &str,
        top_n: Option<u64>,
    ) -> Result<Vec<RankedEntry>, LeaderboardError> {
        validate_mode(mode)?;

        let top_n = top_n.unwrap_or(DEFAULT_TOP_N).clamp(1, MAX_TOP_N);
        let now = Utc::now();

        // Widest window first: all-time, then each dated cutoff. Rows keep
        // the order their window produced; the union only drops exact
        // duplicates of rows already emitted.
        let mut cutoffs = vec![None];
        cutoffs.extend(WINDOW_DAYS.iter().map(|days| Some(now - Duration::days(*days))));

        let mut merged = Vec::new();
        for cutoff in cutoffs {
            let window = self.store.leaderboard_window(mode, cutoff, top_n).await?;
            for row in window {
                if !merged.contains(&row) {
                    merged.push(row);
                }
            }
        }

        Ok(merged.into_iter().map(RankedEntry::from).collect())
    }

    async fn submit(
        &self,
        identity_id: i32,
        mode: &str,
        score: i32,
    ) -> Result<RankedEntry, LeaderboardError> {
        validate_mode(mode)?;

        if score < 0 {
            return Err(LeaderboardError::Validation(
                "Score cannot be negative".to_string(),
            ));
        }

        let identity = self
            .store
            .get_identity(identity_id)
            .await?
            .ok_or(LeaderboardError::IdentityNotFound)?;

        let entry = self
            .store
            .insert_leaderboard_entry(mode, score, &identity.username, identity.id, Utc::now())
            .await?;

        let _ = self.events.send(NotificationEvent::LeaderboardUpdated {
            mode: mode.to_string(),
            user_name: entry.user_name.clone(),
            score: entry.score,
        });

        Ok(entry.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewIdentity;
    use chrono::Duration;

    async fn memory_store() -> (Store, i32) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let identity = store
            .create_identity(NewIdentity {
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
                password_hash: "x".to_string(),
                salt: "y".to_string(),
                origin: 0,
            })
            .await
            .unwrap();
        (store, identity.id)
    }

    fn service(store: Store) -> SeaOrmLeaderboardService {
        let (events, _) = broadcast::channel(16);
        SeaOrmLeaderboardService::new(store, events)
    }

    #[tokio::test]
    async fn test_unknown_mode_is_rejected() {
        let (store, id) = memory_store().await;
        let service = service(store);

        assert!(matches!(
            service.ranked("trio", None).await,
            Err(LeaderboardError::UnknownMode(_))
        ));
        assert!(matches!(
            service.submit(id, "trio", 10).await,
            Err(LeaderboardError::UnknownMode(_))
        ));
    }

    #[tokio::test]
    async fn test_modes_are_isolated() {
        let (store, id) = memory_store().await;
        let service = service(store.clone());

        service.submit(id, "solo", 10).await.unwrap();
        service.submit(id, "duo", 99).await.unwrap();

        let solo = service.ranked("solo", None).await.unwrap();
        assert_eq!(solo.len(), 1);
        assert_eq!(solo[0].score, 10);
    }

    #[tokio::test]
    async fn test_windowed_union_dedups_but_keeps_window_order() {
        let (store, id) = memory_store().await;
        let now = Utc::now();

        // Four entries spread across the windows: today, this week, this
        // year, and older than a year.
        for (score, age_days) in [(50, 0), (80, 2), (70, 40), (90, 400)] {
            store
                .insert_leaderboard_entry("solo", score, "ana", id, now - Duration::days(age_days))
                .await
                .unwrap();
        }

        let service = service(store);
        let ranked = service.ranked("solo", Some(2)).await.unwrap();

        // All-time top-2: 90, 80. Year window adds 70 (its top-2 is 80, 70).
        // Month window adds 50 (80, 50). Week and day windows add nothing
        // new. No global re-sort afterwards.
        let scores: Vec<i32> = ranked.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 80, 70, 50]);
    }

    #[tokio::test]
    async fn test_ties_break_by_earlier_timestamp() {
        let (store, id) = memory_store().await;
        let now = Utc::now();

        store
            .insert_leaderboard_entry("solo", 10, "late", id, now)
            .await
            .unwrap();
        store
            .insert_leaderboard_entry("solo", 10, "early", id, now - Duration::hours(1))
            .await
            .unwrap();

        let service = service(store);
        let ranked = service.ranked("solo", Some(1)).await.unwrap();
        assert_eq!(ranked[0].user_name, "early");
    }

    #[tokio::test]
    async fn test_window_cutoff_is_exclusive() {
        let (store, id) = memory_store().await;
        let stamp = Utc::now() - Duration::days(7);

        store
            .insert_leaderboard_entry("solo", 10, "ana", id, stamp)
            .await
            .unwrap();

        // An entry exactly on the cutoff falls outside the window.
        let on_boundary = store
            .leaderboard_window("solo", Some(stamp), 10)
            .await
            .unwrap();
        assert!(on_boundary.is_empty());

        let inside = store
            .leaderboard_window("solo", Some(stamp - Duration::seconds(1)), 10)
            .await
            .unwrap();
        assert_eq!(inside.len(), 1);
    }

    #[tokio::test]
    async fn test_top_n_caps_each_window() {
        let (store, id) = memory_store().await;
        let now = Utc::now();

        for score in 1..=5 {
            store
                .insert_leaderboard_entry("solo", score, "ana", id, now)
                .await
                .unwrap();
        }

        let service = service(store);
        let ranked = service.ranked("solo", Some(2)).await.unwrap();

        // Every window sees the same two best rows, so the union stays at 2.
        let scores: Vec<i32> = ranked.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![5, 4]);
    }
}

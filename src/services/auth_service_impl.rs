//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task;
use tracing::{info, warn};

use crate::auth::{
    self, LoginSignal, ORIGIN_LOCAL, PlatformReach, TokenIssuer, TokenPair, TokenVerifier,
};
use crate::clients::MailerClient;
use crate::config::{AuthConfig, SecurityConfig, ServerConfig};
use crate::constants::tokens;
use crate::db::{NewIdentity, Store};
use crate::domain::NotificationEvent;
use crate::entities::identities;
use crate::services::auth_service::{AuthError, AuthService, SessionResult};

/// Achievement key granted when an identity has logged in from both web and
/// mobile.
pub const DUAL_PLATFORM_ACHIEVEMENT: &str = "dual_platform";

pub struct SeaOrmAuthService {
    store: Store,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    auth_config: AuthConfig,
    security: SecurityConfig,
    mailer: MailerClient,
    base_url: String,
    events: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        auth_config: &AuthConfig,
        security: &SecurityConfig,
        server: &ServerConfig,
        mailer: MailerClient,
        events: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            issuer: TokenIssuer::new(auth_config),
            verifier: TokenVerifier::new(auth_config),
            auth_config: auth_config.clone(),
            security: security.clone(),
            mailer,
            base_url: server.base_url.clone(),
            events,
        }
    }

    /// Issues a pair and records it as a session row in one step.
    async fn open_session(
        &self,
        identity_id: i32,
        username: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<TokenPair, AuthError> {
        let pair = self
            .issuer
            .issue(identity_id, username, access_ttl_secs, refresh_ttl_secs)?;

        self.store
            .insert_session(
                identity_id,
                &pair.access_token,
                &pair.refresh_token,
                pair.access_expires_at,
                pair.refresh_expires_at,
            )
            .await?;

        Ok(pair)
    }

    fn session_result(
        identity: identities::Model,
        pair: TokenPair,
        platform_achievement: bool,
    ) -> SessionResult {
        SessionResult {
            identity: identity.into(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
            platform_achievement,
        }
    }

    /// Applies the platform-reach transition for this login and persists it
    /// if anything changed. Returns true when the dual-platform achievement
    /// unlocked on this exact login.
    async fn track_platform(
        &self,
        identity: &identities::Model,
        is_web: bool,
    ) -> Result<bool, AuthError> {
        let current = PlatformReach::from_i32(identity.platform_reach);
        let (next, signal) = auth::record_login(current, is_web);

        match signal {
            LoginSignal::NoChange => Ok(false),
            LoginSignal::Updated => {
                self.store
                    .set_platform_reach(identity.id, next.as_i32())
                    .await?;
                Ok(false)
            }
            LoginSignal::AchievementUnlocked => {
                self.store
                    .set_platform_reach(identity.id, next.as_i32())
                    .await?;
                self.grant_achievement(identity, DUAL_PLATFORM_ACHIEVEMENT)
                    .await?;
                Ok(true)
            }
        }
    }

    async fn grant_achievement(
        &self,
        identity: &identities::Model,
        achievement: &str,
    ) -> Result<(), AuthError> {
        let mut achievements: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&identity.achievements).unwrap_or_default();
        achievements.insert(achievement.to_string(), serde_json::Value::Bool(true));

        let json = serde_json::to_string(&achievements)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.store
            .set_identity_achievements(identity.id, &json)
            .await?;

        info!(
            "Achievement '{achievement}' unlocked for {}",
            identity.username
        );
        let _ = self.events.send(NotificationEvent::AchievementUnlocked {
            user_name: identity.username.clone(),
            achievement: achievement.to_string(),
        });

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_web: bool,
    ) -> Result<SessionResult, AuthError> {
        if username.trim().is_empty() || email.trim().is_empty() {
            return Err(AuthError::Validation(
                "Username and email cannot be empty".to_string(),
            ));
        }
        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.store.username_taken(username).await? {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.email_taken(email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        // Argon2 hashing is CPU-intensive; keep it off the async runtime.
        let password = password.to_string();
        let security = self.security.clone();
        let (hash, salt) = task::spawn_blocking(move || auth::hash_password(&password, &security))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task panicked: {e}")))??;

        let identity = self
            .store
            .create_identity(NewIdentity {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash,
                salt,
                origin: ORIGIN_LOCAL,
            })
            .await?;

        self.track_platform(&identity, is_web).await?;

        let pair = self
            .open_session(
                identity.id,
                &identity.username,
                self.auth_config.access_ttl_secs,
                self.auth_config.refresh_ttl_secs,
            )
            .await?;

        info!("Registered identity '{}'", identity.username);

        // Re-read so the response reflects the platform update.
        let identity = self
            .store
            .get_identity(identity.id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        Ok(Self::session_result(identity, pair, false))
    }

    async fn login(
        &self,
        login: &str,
        password: &str,
        is_web: bool,
    ) -> Result<SessionResult, AuthError> {
        let identity = match self.store.get_identity_by_username(login).await? {
            Some(identity) => Some(identity),
            None => self.store.get_identity_by_email(login).await?,
        };

        let Some(identity) = identity else {
            return Err(AuthError::InvalidCredentials);
        };

        if identity.origin != ORIGIN_LOCAL {
            return Err(AuthError::CrossOriginVerification);
        }

        let password = password.to_string();
        let for_verify = identity.clone();
        let is_valid =
            task::spawn_blocking(move || auth::verify_password(&password, &for_verify))
                .await
                .map_err(|e| AuthError::Internal(format!("Verification task panicked: {e}")))??;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let platform_achievement = self.track_platform(&identity, is_web).await?;

        let pair = self
            .open_session(
                identity.id,
                &identity.username,
                self.auth_config.access_ttl_secs,
                self.auth_config.refresh_ttl_secs,
            )
            .await?;

        let identity = self
            .store
            .get_identity(identity.id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        Ok(Self::session_result(identity, pair, platform_achievement))
    }

    async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<SessionResult, AuthError> {
        // The access token may already be expired here; the refresh token
        // carries the identity through rotation.
        let claims = self.verifier.decode_refresh(refresh_token)?;

        let session = self
            .store
            .get_session_by_pair(access_token, refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let identity = self
            .store
            .get_identity_by_username(&claims.user_name)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.identity_id != identity.id {
            return Err(AuthError::InvalidToken);
        }

        // Retire the old pair before the replacement exists. If the insert
        // fails the caller simply logs in again.
        self.store.remove_session(session.id).await?;

        let pair = self
            .open_session(
                identity.id,
                &identity.username,
                self.auth_config.access_ttl_secs,
                self.auth_config.refresh_ttl_secs,
            )
            .await?;

        // Opportunistic cleanup of sessions past their refresh window.
        if let Err(err) = self
            .store
            .prune_expired_sessions(chrono::Utc::now().timestamp())
            .await
        {
            warn!("Failed to prune expired sessions: {err:#}");
        }

        Ok(Self::session_result(identity, pair, false))
    }

    async fn authenticate(&self, access_token: &str) -> Result<identities::Model, AuthError> {
        let claims = self.verifier.decode_access(access_token)?;

        // A signed, unexpired token is still dead if its session row was
        // rotated away or removed.
        let session = self
            .store
            .get_session_by_access_token(access_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let identity = self
            .store
            .get_identity(claims.id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.identity_id != identity.id {
            return Err(AuthError::InvalidToken);
        }

        Ok(identity)
    }

    async fn login_external(
        &self,
        username: &str,
        email: &str,
        origin: i32,
    ) -> Result<SessionResult, AuthError> {
        if origin <= ORIGIN_LOCAL {
            return Err(AuthError::Validation(
                "External origin must be a provider marker (>= 1)".to_string(),
            ));
        }

        let identity = match self.store.get_identity_by_email(email).await? {
            Some(existing) => {
                if existing.origin != origin {
                    return Err(AuthError::CrossOriginVerification);
                }
                existing
            }
            None => {
                // External identities carry no credential material.
                self.store
                    .create_identity(NewIdentity {
                        username: username.to_string(),
                        email: email.to_string(),
                        password_hash: String::new(),
                        salt: String::new(),
                        origin,
                    })
                    .await?
            }
        };

        let pair = self
            .open_session(
                identity.id,
                &identity.username,
                tokens::EXCHANGE_ACCESS_TTL_SECS,
                tokens::EXCHANGE_REFRESH_TTL_SECS,
            )
            .await?;

        Ok(Self::session_result(identity, pair, false))
    }

    async fn request_account_removal(&self, email: &str) -> Result<(), AuthError> {
        let identity = self
            .store
            .get_identity_by_email(email)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        let pair = self
            .open_session(
                identity.id,
                &identity.username,
                tokens::REMOVAL_ACCESS_TTL_SECS,
                tokens::REMOVAL_REFRESH_TTL_SECS,
            )
            .await?;

        let link = format!(
            "{}/account/remove/confirm?access_token={}&refresh_token={}",
            self.base_url, pair.access_token, pair.refresh_token
        );
        let body = format!(
            "Hello {},\n\nFollow this link to permanently delete your account:\n{link}\n\n\
             If you did not request this, ignore this message.",
            identity.username
        );

        self.mailer.send_detached(
            identity.email,
            "Confirm account deletion".to_string(),
            body,
        );

        Ok(())
    }

    async fn remove_account(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<String, AuthError> {
        let claims = self.verifier.decode_refresh(refresh_token)?;

        self.store
            .get_session_by_pair(access_token, refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let identity = self
            .store
            .get_identity_by_username(&claims.user_name)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let username = identity.username.clone();

        self.store.remove_sessions_for_identity(identity.id).await?;
        self.store
            .remove_leaderboard_entries_for_user(identity.id)
            .await?;
        self.store.remove_identity(identity.id).await?;

        info!("Removed identity '{username}'");
        let _ = self.events.send(NotificationEvent::AccountRemoved {
            user_name: username.clone(),
        });

        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, EmailConfig, SecurityConfig, ServerConfig};

    async fn memory_service() -> (SeaOrmAuthService, Store) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let auth_config = AuthConfig {
            signing_key: "test-signing-key".to_string(),
            ..AuthConfig::default()
        };
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let mailer = MailerClient::new(EmailConfig::default()).unwrap();
        let (events, _) = broadcast::channel(16);

        let service = SeaOrmAuthService::new(
            store.clone(),
            &auth_config,
            &security,
            &ServerConfig::default(),
            mailer,
            events,
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_login_external_finds_or_creates() {
        let (service, store) = memory_service().await;

        let first = service
            .login_external("ana", "ana@example.com", 2)
            .await
            .unwrap();
        let second = service
            .login_external("someone-else", "ana@example.com", 2)
            .await
            .unwrap();

        // Same email and origin resolve to the one identity already on file.
        assert_eq!(first.identity.id, second.identity.id);
        assert_eq!(second.identity.username, "ana");

        let identity = store.get_identity(first.identity.id).await.unwrap().unwrap();
        assert!(identity.password_hash.is_empty());
        assert!(identity.salt.is_empty());
        assert_eq!(identity.origin, 2);

        // Exchange pairs live on the short clocks, not the session defaults.
        assert_eq!(
            first.refresh_expires_at - first.access_expires_at,
            tokens::EXCHANGE_REFRESH_TTL_SECS - tokens::EXCHANGE_ACCESS_TTL_SECS
        );
    }

    #[tokio::test]
    async fn test_login_external_rejects_bad_origins() {
        let (service, _store) = memory_service().await;

        // The local marker is not a provider.
        assert!(matches!(
            service.login_external("ana", "ana@example.com", 0).await,
            Err(AuthError::Validation(_))
        ));

        service
            .login_external("ana", "ana@example.com", 2)
            .await
            .unwrap();

        // A different provider cannot claim the same email.
        assert!(matches!(
            service.login_external("ana", "ana@example.com", 3).await,
            Err(AuthError::CrossOriginVerification)
        ));
    }

    #[tokio::test]
    async fn test_external_identity_never_passes_password_login() {
        let (service, _store) = memory_service().await;

        service
            .login_external("ana", "ana@example.com", 2)
            .await
            .unwrap();

        assert!(matches!(
            service.login("ana", "whatever", true).await,
            Err(AuthError::CrossOriginVerification)
        ));
    }

    #[tokio::test]
    async fn test_remove_account_deletes_identity_sessions_and_board() {
        let (service, store) = memory_service().await;

        let session = service
            .register("ana", "ana@example.com", "a-strong-password", true)
            .await
            .unwrap();
        let id = session.identity.id;

        store
            .insert_leaderboard_entry("solo", 12, "ana", id, chrono::Utc::now())
            .await
            .unwrap();

        let removed = service
            .remove_account(&session.access_token, &session.refresh_token)
            .await
            .unwrap();
        assert_eq!(removed, "ana");

        assert!(store.get_identity(id).await.unwrap().is_none());
        assert!(
            store
                .get_session_by_pair(&session.access_token, &session.refresh_token)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .leaderboard_window("solo", None, 10)
                .await
                .unwrap()
                .is_empty()
        );

        // The consumed pair authenticates nothing afterwards.
        assert!(matches!(
            service.authenticate(&session.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_remove_account_requires_the_pair_on_file() {
        let (service, _store) = memory_service().await;

        let session = service
            .register("ana", "ana@example.com", "a-strong-password", true)
            .await
            .unwrap();
        let other = service
            .login("ana", "a-strong-password", true)
            .await
            .unwrap();

        // Mixing tokens from two live sessions is not a pair on file.
        assert!(matches!(
            service
                .remove_account(&session.access_token, &other.refresh_token)
                .await,
            Err(AuthError::InvalidToken)
        ));
    }
}

//! Domain service for identity, credentials and session tokens.
//!
//! Handles registration, login (local and external-origin), token refresh,
//! bearer authentication and account removal.

use serde::Serialize;
use thiserror::Error;

use crate::auth::{CredentialError, TokenError};
use crate::entities::identities;

/// Errors specific to identity and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Uniform failure for every token problem — expiry, bad signature,
    /// claim mismatch, unknown session. Callers never learn which.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    /// The identity exists but belongs to a different origin, so password
    /// verification can never succeed for it.
    #[error("Account was created through a different sign-in method")]
    CrossOriginVerification,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Stored credential material for a local identity is missing or
    /// corrupt. Persistence problem, not a caller mistake.
    #[error("Credential integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        Self::InvalidToken
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Integrity(msg) => Self::Integrity(msg),
            CredentialError::Hashing(msg) => Self::Internal(msg),
        }
    }
}

/// Identity DTO for responses (no credential material).
#[derive(Debug, Clone, Serialize)]
pub struct IdentityInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub platform_reach: i32,
    pub created_at: String,
}

impl From<identities::Model> for IdentityInfo {
    fn from(model: identities::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            platform_reach: model.platform_reach,
            created_at: model.created_at,
        }
    }
}

/// A freshly established session: identity plus the issued token pair.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub identity: IdentityInfo,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
    /// True exactly once per identity: the login that completes platform
    /// reach (web + mobile).
    pub platform_achievement: bool,
}

/// Domain service trait for identity and sessions.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a local-origin identity and opens its first session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] / [`AuthError::DuplicateEmail`]
    /// when the name or address is already registered.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_web: bool,
    ) -> Result<SessionResult, AuthError>;

    /// Verifies credentials and opens a session. `login` may be a username
    /// or an email address.
    async fn login(
        &self,
        login: &str,
        password: &str,
        is_web: bool,
    ) -> Result<SessionResult, AuthError>;

    /// Rotates a token pair. The presented pair must be the one on file;
    /// afterwards it no longer authenticates anything.
    async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<SessionResult, AuthError>;

    /// Resolves a bearer access token to its identity, requiring both a
    /// valid signature and a matching session row.
    async fn authenticate(&self, access_token: &str) -> Result<identities::Model, AuthError>;

    /// Finds or creates an external-origin identity (origin >= 1) and issues
    /// a short-lived exchange pair.
    async fn login_external(
        &self,
        username: &str,
        email: &str,
        origin: i32,
    ) -> Result<SessionResult, AuthError>;

    /// Emails a deletion link carrying a short-lived token pair.
    async fn request_account_removal(&self, email: &str) -> Result<(), AuthError>;

    /// Consumes a removal token pair and deletes the identity along with all
    /// of its sessions. Returns the removed username.
    async fn remove_account(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<String, AuthError>;
}

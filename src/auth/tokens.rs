//! Token issuance and verification.
//!
//! Sessions are a pair of HS256-signed JWTs minted at the same instant with
//! disjoint expiry clocks: a short-lived access token carrying the numeric
//! identity id, and a long-lived refresh token carrying the username. One
//! flow resolves identities by id, the other by name, so the asymmetry in
//! the embedded claim is load-bearing.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Claims carried by an access token.
///
/// `jti` is a fresh UUID per token: `iat`/`exp` only have second resolution,
/// so without it two pairs minted within the same second would be
/// byte-identical and rotation could hand back the pair it just retired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: i32,
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user_name: String,
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// An access/refresh pair issued at one instant, each independently expiring.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
}

/// Mints signed token pairs with the process-wide signing configuration.
#[derive(Clone)]
pub struct TokenIssuer {
    header: Header,
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    subject: String,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            subject: config.subject.clone(),
        }
    }

    /// Issues a token pair for an identity. Both tokens share `iat` but
    /// expire on their own clocks; ttls are caller-supplied because the
    /// refresh flow, the external-provider exchange, and account recovery
    /// all use different lifetimes.
    pub fn issue(
        &self,
        identity_id: i32,
        username: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access_expires_at = now + access_ttl_secs;
        let refresh_expires_at = now + refresh_ttl_secs;

        let access_claims = AccessClaims {
            id: identity_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: self.subject.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: access_expires_at,
        };

        let refresh_claims = RefreshClaims {
            user_name: username.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: self.subject.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: refresh_expires_at,
        };

        let access_token = encode(&self.header, &access_claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        let refresh_token = encode(&self.header, &refresh_claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }
}

/// Validates token signature, expiry and iss/aud/sub claims. Never partially
/// trusts a token: any mismatch is a failure.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.sub = Some(config.subject.clone());
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
        }
    }

    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        Ok(decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        Ok(decode::<RefreshClaims>(token, &self.decoding_key, &self.validation)?.claims)
    }
}

//! Credential store: salted Argon2id password hashing and verification.
//!
//! Each local identity carries its own random salt (hex-encoded) alongside
//! the PHC-format hash of `password || salt`. Identities created by an
//! external provider have no credential material and never pass `verify`.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::constants::credentials::SALT_LEN_BYTES;
use crate::entities::identities;

/// Origin marker for identities registered with a password.
pub const ORIGIN_LOCAL: i32 = 0;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// A local-origin identity with missing or unparseable credential
    /// material. This is a persistence integrity violation, not a wrong
    /// password.
    #[error("Credential integrity violation: {0}")]
    Integrity(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

fn argon2_for(config: &SecurityConfig) -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 params: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` with a fresh random salt and returns `(hash, salt)`.
///
/// The salt is hex-encoded for storage and appended to the password before
/// hashing; Argon2 adds its own internal salt on top, so the stored hash is
/// a self-contained PHC string.
pub fn hash_password(
    password: &str,
    config: &SecurityConfig,
) -> Result<(String, String), CredentialError> {
    let mut salt_bytes = [0u8; SALT_LEN_BYTES];
    use rand::RngCore;
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);

    let phc_salt = SaltString::generate(&mut OsRng);
    let argon2 = argon2_for(config)?;

    let hash = argon2
        .hash_password(format!("{password}{salt}").as_bytes(), &phc_salt)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?
        .to_string();

    Ok((hash, salt))
}

/// Verifies `password` against the identity's stored credential material.
///
/// Returns `Ok(false)` immediately, without hashing, when the identity did
/// not originate from a local password registration — credential checks
/// against external-provider identities must never succeed. A wrong password
/// is also `Ok(false)`; only corrupt stored material is an error.
pub fn verify_password(
    password: &str,
    identity: &identities::Model,
) -> Result<bool, CredentialError> {
    if identity.origin != ORIGIN_LOCAL {
        return Ok(false);
    }

    if identity.salt.is_empty() || identity.password_hash.is_empty() {
        return Err(CredentialError::Integrity(format!(
            "local identity {} has empty credential material",
            identity.id
        )));
    }

    let parsed_hash = PasswordHash::new(&identity.password_hash).map_err(|e| {
        CredentialError::Integrity(format!(
            "stored hash for identity {} is not a valid PHC string: {e}",
            identity.id
        ))
    })?;

    // Argon2's verifier compares digests in constant time.
    let salted = format!("{password}{}", identity.salt);
    Ok(Argon2::default()
        .verify_password(salted.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_with(hash: String, salt: String, origin: i32) -> identities::Model {
        identities::Model {
            id: 1,
            username: "ana".to_string(),
            email: "a@x.com".to_string(),
            password_hash: hash,
            salt,
            origin,
            platform_reach: 0,
            best_score_solo: 0,
            best_score_duo: 0,
            total_flaps: 0,
            total_gates_cleared: 0,
            total_games: 0,
            achievements: "{}".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_hash_then_verify_round_trip() {
        let (hash, salt) = hash_password("hunter2", &fast_params()).unwrap();
        assert_eq!(salt.len(), SALT_LEN_BYTES * 2);

        let identity = identity_with(hash, salt, ORIGIN_LOCAL);
        assert!(verify_password("hunter2", &identity).unwrap());
        assert!(!verify_password("hunter3", &identity).unwrap());
        assert!(!verify_password("", &identity).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_hash() {
        let (hash_a, salt_a) = hash_password("pw", &fast_params()).unwrap();
        let (hash_b, salt_b) = hash_password("pw", &fast_params()).unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_external_origin_never_verifies() {
        let (hash, salt) = hash_password("pw", &fast_params()).unwrap();
        let identity = identity_with(hash, salt, 1);
        assert!(!verify_password("pw", &identity).unwrap());
    }

    #[test]
    fn test_missing_salt_is_integrity_error() {
        let (hash, _) = hash_password("pw", &fast_params()).unwrap();
        let identity = identity_with(hash, String::new(), ORIGIN_LOCAL);
        assert!(matches!(
            verify_password("pw", &identity),
            Err(CredentialError::Integrity(_))
        ));
    }

    #[test]
    fn test_corrupt_hash_is_integrity_error() {
        let identity = identity_with("not-a-phc-string".to_string(), "aabbccdd00112233".to_string(), ORIGIN_LOCAL);
        assert!(matches!(
            verify_password("pw", &identity),
            Err(CredentialError::Integrity(_))
        ));
    }
}

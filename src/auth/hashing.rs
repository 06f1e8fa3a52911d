//! One-way hashing of passwords and refresh tokens.
//!
//! Argon2id in PHC string format with a fresh random salt per hash. Both
//! operations are CPU-heavy and run on the blocking thread pool so request
//! workers stay responsive.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::HashingConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
    decoy: String,
}

impl SecretHasher {
    pub fn new(config: &HashingConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::Config(format!("invalid argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let decoy = argon2
            .hash_password(b"decoy", &salt)
            .map_err(|e| AppError::Config(format!("argon2 self-test failed: {}", e)))?
            .to_string();

        Ok(Self { argon2, decoy })
    }

    /// A hash with the configured cost that no account owns. Verifying against
    /// it keeps lookups of unknown users as slow as a wrong password.
    pub fn decoy_hash(&self) -> &str {
        &self.decoy
    }

    pub async fn hash(&self, secret: &str) -> Result<String, AppError> {
        let argon2 = self.argon2.clone();
        let secret = secret.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(secret.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| AppError::Internal(format!("hashing failed: {}", e)))
        })
        .await?
    }

    /// A malformed stored hash verifies as `false` rather than erroring.
    pub async fn verify(&self, secret: &str, hash: &str) -> Result<bool, AppError> {
        let argon2 = self.argon2.clone();
        let secret = secret.to_owned();
        let hash = hash.to_owned();

        let matches = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&hash)
                .map(|parsed| argon2.verify_password(secret.as_bytes(), &parsed).is_ok())
                .unwrap_or(false)
        })
        .await?;

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> SecretHasher {
        SecretHasher::new(&HashingConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("Passw0rd!").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Passw0rd!", &hash).await.unwrap());
        assert!(!hasher.verify("passw0rd!", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let hasher = hasher();
        let a = hasher.hash("same").await.unwrap();
        let b = hasher.hash("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_long_inputs_are_fully_covered() {
        // Two JWT-sized strings sharing a long prefix must not collide.
        let hasher = hasher();
        let prefix = "x".repeat(200);
        let hash = hasher.hash(&format!("{}a", prefix)).await.unwrap();
        assert!(!hasher.verify(&format!("{}b", prefix), &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_hash_does_not_verify() {
        assert!(!hasher().verify("anything", "not-a-phc-string").await.unwrap());
    }

    #[tokio::test]
    async fn test_decoy_hash_uses_configured_cost() {
        let hasher = hasher();
        let decoy = PasswordHash::new(hasher.decoy_hash()).unwrap();
        assert_eq!(decoy.algorithm.as_str(), "argon2id");
        let params = Params::try_from(&decoy).unwrap();
        assert_eq!(params.m_cost(), 64);
        assert_eq!(params.t_cost(), 1);
        assert_eq!(params.p_cost(), 1);
        assert!(!hasher.verify("Passw0rd!", hasher.decoy_hash()).await.unwrap());
    }

    #[test]
    fn test_rejects_bad_params() {
        let result = SecretHasher::new(&HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

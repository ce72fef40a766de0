use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use anyhow::Context;
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::config::PasswordConfig;

/// Salted Argon2id hashing with tunable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes on the blocking pool so the runtime workers stay free.
    pub async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let hasher = self.clone();
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&plain))
            .await
            .context("password hashing task")?
    }

    /// Never errors: a hash that does not parse is a mismatch, and so is a
    /// verification task that fails to complete.
    pub async fn verify(&self, hash: &str, plain: &str) -> bool {
        let hasher = self.clone();
        let (hash, plain) = (hash.to_owned(), plain.to_owned());
        match tokio::task::spawn_blocking(move || hasher.verify_blocking(&hash, &plain)).await {
            Ok(matched) => matched,
            Err(e) => {
                error!(error = %e, "password verify task failed");
                false
            }
        }
    }

    fn hash_blocking(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify_blocking(&self, hash: &str, plain: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("params")
    }

    #[tokio::test]
    async fn hash_and_verify_roundtrip() {
        let hasher = hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).await.expect("hashing should succeed");
        assert!(hasher.verify(&hash, password).await);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let hasher = hasher();
        let hash = hasher
            .hash("correct-horse-battery-staple")
            .await
            .expect("hashing should succeed");
        assert!(!hasher.verify(&hash, "wrong-password").await);
    }

    #[tokio::test]
    async fn verify_treats_malformed_hash_as_mismatch() {
        assert!(!hasher().verify("not-a-valid-hash", "anything").await);
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = hasher();
        let a = hasher.hash("pw").await.unwrap();
        let b = hasher.hash("pw").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn rejects_impossible_params() {
        let cfg = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(PasswordHasher::new(&cfg).is_err());
    }
}

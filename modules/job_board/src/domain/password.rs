use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use tracing::warn;

use crate::config::PasswordConfig;
use crate::domain::error::DomainError;

/// One-way password hashing port.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Salted hash in PHC string format.
    async fn hash(&self, plaintext: &str) -> Result<String, DomainError>;

    /// Mismatches and unparseable hashes both yield `false`.
    async fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hasher. Work runs on the blocking pool.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| DomainError::password_hash(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::password_hash(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash).map_err(|e| e.to_string())?;
            Ok::<bool, String>(argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok())
        })
        .await;

        match outcome {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                warn!("Stored password hash could not be parsed: {}", e);
                false
            }
            Err(e) => {
                warn!("Password verification task failed: {}", e);
                false
            }
        }
    }
}

// src/services/credentials.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};

use crate::common::error::AppError;

/// Hash e verificação de senhas. Injetado nos serviços para poder ser trocado nos testes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Hash lento e com sal: a mesma senha gera hashes diferentes.
    async fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    /// A comparação é feita em tempo constante pelo próprio bcrypt.
    async fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptCredentials {
    cost: u32,
}

impl BcryptCredentials {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptCredentials {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl CredentialStore for BcryptCredentials {
    async fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let password_clone = plaintext.to_owned();
        let cost = self.cost;

        // bcrypt é CPU-bound: roda fora do runtime assíncrono
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        Ok(hashed)
    }

    async fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, AppError> {
        let password_clone = plaintext.to_owned();
        let password_hash_clone = stored_hash.to_owned();

        let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        Ok(is_valid)
    }
}

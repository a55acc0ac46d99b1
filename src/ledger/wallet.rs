//! Wallet key loading.
//!
//! # Security
//! - The secret is read ONLY from an environment variable
//! - Keys are never logged or serialized

use std::sync::Arc;

use solana_keypair::Keypair;
use solana_signer::Signer;
use thiserror::Error;

use crate::ledger::types::{Pubkey, Signature};

/// Default environment variable holding the secret key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// Length of the `secret || public` export format.
const KEYPAIR_LEN: usize = 64;

/// Errors raised while loading a key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Environment variable {0} not set")]
    MissingEnv(String),

    #[error("Invalid private key format: {0}")]
    InvalidFormat(String),

    #[error("Private key and embedded public key do not match")]
    KeyMismatch,
}

/// The signing wallet. Clones share one keypair.
#[derive(Clone)]
pub struct Wallet {
    keypair: Arc<Keypair>,
}

impl Wallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Build from a raw 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(Keypair::new_from_array(seed))
    }

    /// Parse a secret in one of the common wallet export formats:
    /// - base58 of the 64-byte `secret || public` pair
    /// - a JSON array of those 64 bytes (CLI keypair files)
    pub fn from_secret_str(secret: &str) -> Result<Self, WalletError> {
        let secret = secret.trim();
        let bytes = if secret.starts_with('[') {
            serde_json::from_str::<Vec<u8>>(secret)
                .map_err(|e| WalletError::InvalidFormat(format!("JSON byte array: {}", e)))?
        } else {
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| WalletError::InvalidFormat(format!("base58: {}", e)))?
        };

        if bytes.len() != KEYPAIR_LEN {
            return Err(WalletError::InvalidFormat(format!(
                "expected {} bytes, got {}",
                KEYPAIR_LEN,
                bytes.len()
            )));
        }
        let keypair = Keypair::try_from(bytes.as_slice()).map_err(|_| WalletError::KeyMismatch)?;

        let wallet = Self::new(keypair);
        tracing::info!(pubkey = %wallet.pubkey(), "Wallet initialized");
        Ok(wallet)
    }

    /// Load from the named environment variable.
    pub fn from_env(var: &str) -> Result<Self, WalletError> {
        let secret = std::env::var(var).map_err(|_| WalletError::MissingEnv(var.to_string()))?;
        Self::from_secret_str(&secret)
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.keypair.sign_message(message)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

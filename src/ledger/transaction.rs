//! Transaction wire format: decoding, signing and the immutable signed form.
//!
//! Provider transactions arrive as base64 of a bincode-serialized
//! `VersionedTransaction` whose signature slots are still zeroed. Only the
//! wallet's slot is filled in; everything else is sent exactly as received.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use solana_message::VersionedMessage;
use solana_transaction::versioned::VersionedTransaction;
use thiserror::Error;

use crate::ledger::types::{Hash, Pubkey, Signature};
use crate::ledger::wallet::Wallet;

/// Errors raised while decoding or signing transaction bytes.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid base64 transaction: {0}")]
    Base64(String),

    #[error("failed to decode transaction: {source}")]
    Decode { source: Box<bincode::ErrorKind> },

    #[error("failed to encode transaction: {source}")]
    Encode { source: Box<bincode::ErrorKind> },

    #[error("signature table has {table} entries but message requires {required}")]
    SignatureCountMismatch { table: usize, required: usize },

    #[error("message has {keys} static account keys for {required} required signers")]
    MissingAccountKeys { keys: usize, required: usize },

    #[error("signer {0} is not a required signer of this transaction")]
    SignerNotFound(Pubkey),

    #[error("transaction has no fee-payer signature")]
    Unsigned,
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, WireError> {
    BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| WireError::Base64(e.to_string()))
}

/// Deserialize and check that the signature table matches the header.
fn decode(bytes: &[u8]) -> Result<VersionedTransaction, WireError> {
    let tx: VersionedTransaction =
        bincode::deserialize(bytes).map_err(|source| WireError::Decode { source })?;

    let required = usize::from(tx.message.header().num_required_signatures);
    if tx.signatures.len() != required {
        return Err(WireError::SignatureCountMismatch {
            table: tx.signatures.len(),
            required,
        });
    }

    let keys = tx.message.static_account_keys().len();
    if keys == 0 || keys < required {
        return Err(WireError::MissingAccountKeys { keys, required });
    }
    Ok(tx)
}

/// A decoded transaction whose signature slots may still be empty.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    tx: VersionedTransaction,
}

impl UnsignedTransaction {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(Self { tx: decode(bytes)? })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, WireError> {
        Self::from_bytes(&decode_base64(encoded)?)
    }

    pub fn recent_blockhash(&self) -> Hash {
        *self.tx.message.recent_blockhash()
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.tx.message.static_account_keys()[0]
    }

    /// Keys that must sign, in signature-table order.
    pub fn required_signers(&self) -> &[Pubkey] {
        &self.tx.message.static_account_keys()[..self.tx.signatures.len()]
    }

    /// `None` for legacy messages.
    pub fn version(&self) -> Option<u8> {
        match &self.tx.message {
            VersionedMessage::Legacy(_) => None,
            VersionedMessage::V0(_) => Some(0),
        }
    }

    /// The exact bytes covered by the signatures.
    pub fn message_bytes(&self) -> Vec<u8> {
        self.tx.message.serialize()
    }

    /// Sign the message with the wallet and freeze the result.
    ///
    /// The signature goes into the slot matching the wallet's position
    /// among the required signers.
    pub fn sign(mut self, wallet: &Wallet) -> Result<SignedTransaction, WireError> {
        let pubkey = wallet.pubkey();
        let index = self
            .required_signers()
            .iter()
            .position(|k| *k == pubkey)
            .ok_or(WireError::SignerNotFound(pubkey))?;

        let signature = wallet.sign_message(&self.message_bytes());
        self.tx.signatures[index] = signature;

        tracing::debug!(
            signer = %pubkey,
            slot = index,
            signature = %signature,
            "Transaction signed"
        );

        SignedTransaction::from_transaction(&self.tx)
    }
}

/// An already-serialized, already-signed transaction.
///
/// The bytes are immutable; clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Arc<[u8]>,
    signature: Signature,
    recent_blockhash: Hash,
    fee_payer: Pubkey,
}

impl SignedTransaction {
    /// Wrap serialized bytes. The fee-payer signature must be present.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WireError> {
        let tx = decode(&bytes)?;
        Self::from_parts(&tx, bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, WireError> {
        Self::from_bytes(decode_base64(encoded)?)
    }

    pub fn from_transaction(tx: &VersionedTransaction) -> Result<Self, WireError> {
        let bytes = bincode::serialize(tx).map_err(|source| WireError::Encode { source })?;
        Self::from_parts(tx, bytes)
    }

    fn from_parts(tx: &VersionedTransaction, bytes: Vec<u8>) -> Result<Self, WireError> {
        let signature = match tx.signatures.first() {
            Some(signature) if *signature != Signature::default() => *signature,
            _ => return Err(WireError::Unsigned),
        };
        Ok(Self {
            signature,
            recent_blockhash: *tx.message.recent_blockhash(),
            fee_payer: tx.message.static_account_keys()[0],
            bytes: bytes.into(),
        })
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the serialized bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// First signature; the ledger identifies the transaction by it.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn recent_blockhash(&self) -> Hash {
        self.recent_blockhash
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.fee_payer
    }
}

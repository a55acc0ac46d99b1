//! Ledger data model and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

pub use solana_hash::Hash;
pub use solana_pubkey::Pubkey;
pub use solana_signature::Signature;

/// Errors that can occur while talking to a ledger node.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport-level failure (connect, TLS, HTTP status).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Write a key, hash or signature as its base58 string.
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Ledger commitment levels, ordered by durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validity window of a transaction.
///
/// The blockhash and height must come from the same ledger snapshot,
/// otherwise expiry detection is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashExpiry {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

impl BlockhashExpiry {
    pub fn new(blockhash: Hash, last_valid_block_height: u64) -> Self {
        Self {
            blockhash,
            last_valid_block_height,
        }
    }

    /// True once the ledger can no longer accept the transaction.
    pub fn is_expired_at(&self, block_height: u64) -> bool {
        block_height > self.last_valid_block_height
    }
}

/// Per-signature status object returned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the block is rooted.
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Effective commitment level of this status.
    ///
    /// Older nodes omit `confirmationStatus`; a missing confirmation count
    /// then means the slot is rooted.
    pub fn commitment(&self) -> Commitment {
        match (self.confirmation_status, self.confirmations) {
            (Some(level), _) => level,
            (None, None) => Commitment::Finalized,
            (None, Some(_)) => Commitment::Processed,
        }
    }

    pub fn has_reached(&self, level: Commitment) -> bool {
        self.commitment() >= level
    }
}

/// Options for `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    /// Node-side rebroadcast attempts. `None` leaves the node default.
    pub max_retries: Option<u32>,
    pub preflight_commitment: Option<Commitment>,
}

impl SendOptions {
    /// Options used for every resend: no preflight and no node-side retries,
    /// the waiter is the retry mechanism.
    pub fn resend() -> Self {
        Self {
            skip_preflight: true,
            max_retries: Some(0),
            preflight_commitment: None,
        }
    }
}

impl Default for SendOptions {
    fn default() -> Self {
        Self::resend()
    }
}

/// Options for `simulateTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateOptions {
    pub replace_recent_blockhash: bool,
    pub commitment: Commitment,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            replace_recent_blockhash: true,
            commitment: Commitment::Confirmed,
        }
    }
}

/// Outcome of a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub units_consumed: Option<u64>,
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

/// Executed transaction metadata as returned by `getTransaction`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDetails {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: Option<Value>,
    pub logs: Option<Vec<String>>,
    pub fee: Option<u64>,
}

/// A transaction observed as landed.
///
/// `err` carries the on-chain execution error; a landed transaction whose
/// program failed is still confirmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedTransaction {
    #[serde(serialize_with = "serialize_display")]
    pub signature: Signature,
    pub slot: u64,
    pub confirmation_status: Commitment,
    pub err: Option<Value>,
    pub logs: Option<Vec<String>>,
    pub fee: Option<u64>,
}

impl ConfirmedTransaction {
    pub fn from_status(signature: Signature, status: &SignatureStatus) -> Self {
        Self {
            signature,
            slot: status.slot,
            confirmation_status: status.commitment(),
            err: status.err.clone(),
            logs: None,
            fee: None,
        }
    }

    /// Merge in full metadata fetched after the status was observed.
    pub fn with_details(mut self, details: TransactionDetails) -> Self {
        self.slot = details.slot;
        if details.err.is_some() {
            self.err = details.err;
        }
        self.logs = details.logs;
        self.fee = details.fee;
        self
    }

    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

/// Caller-facing interpretation of ledger state for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionStatus {
    /// The ledger has no record of the signature.
    Unknown,
    /// Seen, but below the requested commitment.
    Pending,
    Confirmed(ConfirmedTransaction),
    /// Never seen and the validity window has passed.
    Expired,
}

impl TransactionStatus {
    /// Classify a single status lookup.
    ///
    /// `expired` says whether the transaction's validity window is known to
    /// have passed; it only matters when the ledger has no record.
    pub fn classify(
        signature: Signature,
        status: Option<&SignatureStatus>,
        level: Commitment,
        expired: bool,
    ) -> Self {
        match status {
            Some(s) if s.has_reached(level) => {
                TransactionStatus::Confirmed(ConfirmedTransaction::from_status(signature, s))
            }
            Some(_) => TransactionStatus::Pending,
            None if expired => TransactionStatus::Expired,
            None => TransactionStatus::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commitment_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn test_status_deserialize_and_commitment() {
        let status: SignatureStatus = serde_json::from_value(json!({
            "slot": 72,
            "confirmations": 10,
            "err": null,
            "status": { "Ok": null },
            "confirmationStatus": "confirmed"
        }))
        .unwrap();
        assert_eq!(status.slot, 72);
        assert!(status.err.is_none());
        assert!(status.has_reached(Commitment::Processed));
        assert!(status.has_reached(Commitment::Confirmed));
        assert!(!status.has_reached(Commitment::Finalized));

        let rooted: SignatureStatus =
            serde_json::from_value(json!({ "slot": 5, "confirmations": null, "err": null }))
                .unwrap();
        assert_eq!(rooted.commitment(), Commitment::Finalized);
    }

    #[test]
    fn test_expiry_boundary() {
        let expiry = BlockhashExpiry::new(Hash::new_from_array([1u8; 32]), 100);
        assert!(!expiry.is_expired_at(99));
        assert!(!expiry.is_expired_at(100));
        assert!(expiry.is_expired_at(101));
    }

    #[test]
    fn test_classify() {
        let sig = Signature::from([1u8; 64]);
        let status = SignatureStatus {
            slot: 9,
            confirmations: Some(0),
            err: Some(json!({ "InstructionError": [0, { "Custom": 6001 }] })),
            confirmation_status: Some(Commitment::Processed),
        };

        assert_eq!(
            TransactionStatus::classify(sig, None, Commitment::Confirmed, false),
            TransactionStatus::Unknown
        );
        assert_eq!(
            TransactionStatus::classify(sig, None, Commitment::Confirmed, true),
            TransactionStatus::Expired
        );
        assert_eq!(
            TransactionStatus::classify(sig, Some(&status), Commitment::Confirmed, false),
            TransactionStatus::Pending
        );

        match TransactionStatus::classify(sig, Some(&status), Commitment::Processed, true) {
            TransactionStatus::Confirmed(tx) => {
                assert!(!tx.is_success());
                assert_eq!(tx.slot, 9);
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_status_serializes_base58_signature() {
        let sig = Signature::from([1u8; 64]);
        let status = SignatureStatus {
            slot: 9,
            confirmations: None,
            err: None,
            confirmation_status: Some(Commitment::Finalized),
        };

        let value = serde_json::to_value(TransactionStatus::classify(
            sig,
            Some(&status),
            Commitment::Confirmed,
            false,
        ))
        .unwrap();
        assert_eq!(value["state"], json!("confirmed"));
        assert_eq!(value["signature"], json!(sig.to_string()));
        assert_eq!(value["confirmation_status"], json!("finalized"));

        let value = serde_json::to_value(TransactionStatus::Expired).unwrap();
        assert_eq!(value, json!({ "state": "expired" }));
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = LedgerError::JsonRpc {
            code: -32002,
            message: "Transaction simulation failed".to_string(),
        };
        assert!(err.to_string().contains("-32002"));
    }
}

//! Ledger client interface consumed by the waiter and the swap executor.

use async_trait::async_trait;

use crate::ledger::types::{
    LedgerResult, SendOptions, Signature, SignatureStatus, SimulateOptions, SimulationResult,
    TransactionDetails,
};

/// Operations the sender needs from a ledger node.
///
/// Implementations must be safe for concurrent use: the resend loop and the
/// confirmation poll call into the same client at the same time.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit serialized, signed transaction bytes. Returns the signature
    /// the node computed.
    async fn send_raw_transaction(
        &self,
        bytes: &[u8],
        options: &SendOptions,
    ) -> LedgerResult<Signature>;

    /// Look up statuses; one entry per input signature, `None` when unknown.
    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>>;

    /// Current block height at the client's configured commitment.
    async fn get_block_height(&self) -> LedgerResult<u64>;

    async fn simulate_transaction(
        &self,
        bytes: &[u8],
        options: &SimulateOptions,
    ) -> LedgerResult<SimulationResult>;

    /// Full metadata of a landed transaction, `None` if not yet available.
    async fn get_transaction(&self, signature: &Signature)
        -> LedgerResult<Option<TransactionDetails>>;
}

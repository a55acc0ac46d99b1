//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (secret key)
//!     → wallet.rs (solana keypair loading)
//! Provider base64 transaction
//!     → transaction.rs (bincode VersionedTransaction: decode, sign, freeze bytes)
//! Signed bytes
//!     → client.rs (LedgerClient trait)
//!     → rpc.rs (JSON-RPC with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::LedgerClient;
pub use rpc::RpcLedgerClient;
pub use transaction::{SignedTransaction, UnsignedTransaction, WireError};
pub use types::{
    BlockhashExpiry, Commitment, ConfirmedTransaction, Hash, LedgerError, LedgerResult, Pubkey,
    SendOptions, Signature, SignatureStatus, SimulateOptions, SimulationResult,
    TransactionDetails, TransactionStatus,
};
pub use wallet::{Wallet, WalletError};

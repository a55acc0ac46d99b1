//! Swap transaction sender library

pub mod config;
pub mod confirm;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod quoting;
pub mod resilience;
pub mod swap;

pub use config::schema::SenderConfig;
pub use confirm::{TransactionWaiter, WaitOutcome, WaitReport};
pub use swap::{Submitter, SwapError, SwapExecutor};

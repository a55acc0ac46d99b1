//! Swap orchestration.
//!
//! # Data Flow
//! ```text
//! QuoteRequest + FeeParams
//!     → QuoteProvider::get_quote
//!     → QuoteProvider::get_swap_transaction (unsigned tx + lastValidBlockHeight)
//!     → UnsignedTransaction::sign (wallet)
//!     → LedgerClient::simulate_transaction (optional, aborts on err)
//!     → TransactionWaiter::send_and_confirm
//!     → WaitReport
//! ```

pub mod executor;

pub use executor::{Submitter, SwapError, SwapExecutor, SwapResult};

//! Quote/swap provider module.

pub mod client;
pub mod types;

pub use client::{JupiterClient, QuoteProvider};
pub use types::{FeeParams, QuoteError, QuoteRequest, QuoteResponse, QuoteResult, SwapTransaction};

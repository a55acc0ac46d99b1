//! Quote/swap provider types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised by a quote/swap provider.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered with a body we could not decode.
    #[error("Invalid provider response: {0}")]
    Decode(String),

    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

impl QuoteError {
    /// Transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuoteError::Http(_) => true,
            QuoteError::Status { status, .. } => *status == 429 || *status >= 500,
            QuoteError::Decode(_) | QuoteError::Config(_) => false,
        }
    }
}

/// Result type for provider operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Trade parameters for a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Amount of the input asset in base units.
    pub amount: u64,
    pub slippage_bps: u16,
    /// Venues the route may use. Empty means no restriction.
    #[serde(default)]
    pub allowed_venues: Vec<String>,
}

/// A quote as returned by the provider.
///
/// Unknown fields are kept in `extra` so the quote can be echoed back to
/// the swap endpoint unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub in_amount: String,
    pub output_mint: String,
    pub out_amount: String,
    pub other_amount_threshold: String,
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: Option<String>,
    #[serde(default)]
    pub route_plan: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuoteResponse {
    /// Venue labels along the route, for logging.
    pub fn venues(&self) -> Vec<String> {
        self.route_plan
            .iter()
            .filter_map(|step| step.pointer("/swapInfo/label"))
            .filter_map(|label| label.as_str().map(str::to_string))
            .collect()
    }
}

/// Fee parameters passed through to the provider untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    /// `None` lets the provider pick ("auto").
    pub compute_unit_price_micro_lamports: Option<u64>,
    /// When set, sent as a Jito tip instead of a compute unit price.
    pub jito_tip_lamports: Option<u64>,
}

/// Unsigned swap transaction built by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    /// Base64 wire transaction, signature slots empty.
    pub swap_transaction: String,
    /// Last block height at which the embedded blockhash is valid.
    #[serde(default)]
    pub last_valid_block_height: Option<u64>,
    #[serde(default)]
    pub prioritization_fee_lamports: Option<u64>,
}

//! Quote/swap provider interface and its HTTP implementation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{QuotingConfig, RetryConfig};
use crate::ledger::types::Pubkey;
use crate::quoting::types::{
    FeeParams, QuoteError, QuoteRequest, QuoteResponse, QuoteResult, SwapTransaction,
};
use crate::resilience::{retry_with_backoff, BackoffPolicy};

/// Error codes meaning "no route", as opposed to a broken request.
const NO_ROUTE_CODES: &[&str] = &[
    "COULD_NOT_FIND_ANY_ROUTE",
    "NO_ROUTES_FOUND",
    "TOKEN_NOT_TRADABLE",
];

/// Source of quotes and prebuilt swap transactions.
///
/// `Ok(None)` means the provider answered but has nothing to offer.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quote(&self, request: &QuoteRequest) -> QuoteResult<Option<QuoteResponse>>;

    async fn get_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user: &Pubkey,
        fees: &FeeParams,
    ) -> QuoteResult<Option<SwapTransaction>>;
}

/// HTTP client for a Jupiter v6 style quote/swap API.
#[derive(Debug, Clone)]
pub struct JupiterClient {
    http: reqwest::Client,
    base_url: String,
    config: QuotingConfig,
    retry: BackoffPolicy,
}

impl JupiterClient {
    pub fn new(config: QuotingConfig, retries: &RetryConfig) -> QuoteResult<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| QuoteError::Config(format!("base_url '{}': {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| QuoteError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
            retry: BackoffPolicy::from(retries),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Query parameters for `/quote`. `dexes` is only sent when restricted.
    fn quote_query(request: &QuoteRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("inputMint", request.input_mint.clone()),
            ("outputMint", request.output_mint.clone()),
            ("amount", request.amount.to_string()),
            ("slippageBps", request.slippage_bps.to_string()),
        ];
        if !request.allowed_venues.is_empty() {
            params.push(("dexes", request.allowed_venues.join(",")));
        }
        params
    }

    /// Body for `/swap`. A Jito tip replaces the compute unit price.
    fn swap_body(&self, quote: &QuoteResponse, user: &Pubkey, fees: &FeeParams) -> Value {
        let mut body = json!({
            "quoteResponse": quote,
            "userPublicKey": user.to_string(),
            "wrapAndUnwrapSol": self.config.wrap_and_unwrap_sol,
        });
        match (fees.jito_tip_lamports, fees.compute_unit_price_micro_lamports) {
            (Some(tip), _) => {
                body["prioritizationFeeLamports"] = json!({ "jitoTipLamports": tip });
            }
            (None, Some(price)) => body["computeUnitPriceMicroLamports"] = json!(price),
            (None, None) => body["computeUnitPriceMicroLamports"] = json!("auto"),
        }
        body
    }

    /// Send a request built by `build`, retrying transient failures.
    /// Returns the status and parsed JSON body.
    async fn send_json<F>(&self, operation: &str, build: F) -> QuoteResult<(u16, Value)>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let build = &build;
        retry_with_backoff(&self.retry, operation, QuoteError::is_retryable, move || async move {
            let response = build()
                .send()
                .await
                .map_err(|e| QuoteError::Http(e.to_string()))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| QuoteError::Http(e.to_string()))?;

            if status == 429 || status >= 500 {
                return Err(QuoteError::Status { status, body: text });
            }

            let body = serde_json::from_str(&text).map_err(|e| {
                if (200..300).contains(&status) {
                    QuoteError::Decode(e.to_string())
                } else {
                    QuoteError::Status {
                        status,
                        body: text.clone(),
                    }
                }
            })?;
            Ok((status, body))
        })
        .await
    }
}

fn is_no_route(body: &Value) -> bool {
    body.get("errorCode")
        .and_then(Value::as_str)
        .is_some_and(|code| NO_ROUTE_CODES.contains(&code))
}

#[async_trait]
impl QuoteProvider for JupiterClient {
    async fn get_quote(&self, request: &QuoteRequest) -> QuoteResult<Option<QuoteResponse>> {
        let url = self.endpoint("quote");
        let query = Self::quote_query(request);

        let (status, body) = self
            .send_json("quote", || self.http.get(&url).query(&query))
            .await?;

        if is_no_route(&body) {
            tracing::warn!(
                input_mint = %request.input_mint,
                output_mint = %request.output_mint,
                error = %body["error"],
                "Provider found no route"
            );
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(QuoteError::Status {
                status,
                body: body.to_string(),
            });
        }

        let quote: QuoteResponse =
            serde_json::from_value(body).map_err(|e| QuoteError::Decode(e.to_string()))?;

        tracing::info!(
            in_amount = %quote.in_amount,
            out_amount = %quote.out_amount,
            price_impact_pct = quote.price_impact_pct.as_deref().unwrap_or("?"),
            venues = ?quote.venues(),
            "Quote received"
        );
        Ok(Some(quote))
    }

    async fn get_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user: &Pubkey,
        fees: &FeeParams,
    ) -> QuoteResult<Option<SwapTransaction>> {
        let url = self.endpoint("swap");
        let body = self.swap_body(quote, user, fees);

        let (status, response) = self
            .send_json("swap", || self.http.post(&url).json(&body))
            .await?;

        if !(200..300).contains(&status) {
            return Err(QuoteError::Status {
                status,
                body: response.to_string(),
            });
        }

        let has_tx = response
            .get("swapTransaction")
            .and_then(Value::as_str)
            .is_some_and(|tx| !tx.is_empty());
        if !has_tx {
            tracing::warn!(response = %response, "Provider returned no swap transaction");
            return Ok(None);
        }

        let swap: SwapTransaction =
            serde_json::from_value(response).map_err(|e| QuoteError::Decode(e.to_string()))?;
        tracing::debug!(
            last_valid_block_height = ?swap.last_valid_block_height,
            prioritization_fee_lamports = ?swap.prioritization_fee_lamports,
            "Swap transaction received"
        );
        Ok(Some(swap))
    }
}

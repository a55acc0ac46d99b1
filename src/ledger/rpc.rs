//! JSON-RPC ledger client with timeout, failover and error mapping.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 to one primary and any number of failover nodes
//! - Bound every call with the configured timeout
//! - Fail over on transport errors; surface JSON-RPC error objects as-is

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::LedgerConfig;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{
    Commitment, LedgerError, LedgerResult, SendOptions, Signature, SignatureStatus,
    SimulateOptions, SimulationResult, TransactionDetails,
};

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{ context, value }` wrapper used by most ledger methods.
#[derive(Debug, Deserialize)]
struct Contextual<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    fee: Option<u64>,
    #[serde(default)]
    log_messages: Option<Vec<String>>,
}

impl From<RawTransaction> for TransactionDetails {
    fn from(raw: RawTransaction) -> Self {
        let meta = raw.meta.unwrap_or(RawMeta {
            err: None,
            fee: None,
            log_messages: None,
        });
        Self {
            slot: raw.slot,
            block_time: raw.block_time,
            err: meta.err,
            logs: meta.log_messages,
            fee: meta.fee,
        }
    }
}

/// Ledger JSON-RPC client with failover support.
#[derive(Clone)]
pub struct RpcLedgerClient {
    http: reqwest::Client,
    /// Primary first, then failovers.
    endpoints: Vec<Url>,
    config: LedgerConfig,
    timeout_duration: Duration,
    next_id: Arc<AtomicU64>,
}

impl RpcLedgerClient {
    /// Create a new client. The primary URL must parse; invalid failover
    /// URLs are skipped with a warning.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let primary: Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let mut endpoints = vec![primary];

        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Rpc(format!("HTTP client init failed: {}", e)))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            commitment = %config.commitment,
            "Ledger client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            config,
            timeout_duration,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Issue one JSON-RPC call, trying each endpoint in order.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> LedgerResult<T> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let mut last_error = None;
        for (i, url) in self.endpoints.iter().enumerate() {
            match self.call_endpoint(url, &payload).await {
                Ok(result) => {
                    return serde_json::from_value(result).map_err(|e| {
                        LedgerError::InvalidResponse(format!("{} result: {}", method, e))
                    });
                }
                Err(e @ LedgerError::JsonRpc { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LedgerError::Rpc("All RPC providers failed".to_string())))
    }

    async fn call_endpoint(&self, url: &Url, payload: &Value) -> LedgerResult<Value> {
        let request = async {
            let response = self
                .http
                .post(url.clone())
                .json(payload)
                .send()
                .await
                .map_err(|e| LedgerError::Rpc(e.to_string()))?
                .error_for_status()
                .map_err(|e| LedgerError::Rpc(e.to_string()))?;

            response
                .json::<RpcResponse>()
                .await
                .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
        };

        let envelope = timeout(self.timeout_duration, request)
            .await
            .map_err(|_| LedgerError::Timeout(self.config.rpc_timeout_secs))??;

        match envelope.error {
            Some(err) => Err(LedgerError::JsonRpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(envelope.result),
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn send_raw_transaction(
        &self,
        bytes: &[u8],
        options: &SendOptions,
    ) -> LedgerResult<Signature> {
        let mut config = json!({
            "encoding": "base64",
            "skipPreflight": options.skip_preflight,
        });
        if let Some(max_retries) = options.max_retries {
            config["maxRetries"] = json!(max_retries);
        }
        if let Some(commitment) = options.preflight_commitment {
            config["preflightCommitment"] = json!(commitment.as_str());
        }

        let signature: String = self
            .call("sendTransaction", json!([BASE64_STANDARD.encode(bytes), config]))
            .await?;
        signature
            .parse()
            .map_err(|e| LedgerError::InvalidResponse(format!("signature '{}': {}", signature, e)))
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>> {
        let encoded: Vec<String> = signatures.iter().map(|s| s.to_string()).collect();
        let response: Contextual<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([encoded, { "searchTransactionHistory": false }]),
            )
            .await?;

        if response.value.len() != signatures.len() {
            return Err(LedgerError::InvalidResponse(format!(
                "asked for {} statuses, got {}",
                signatures.len(),
                response.value.len()
            )));
        }
        Ok(response.value)
    }

    async fn get_block_height(&self) -> LedgerResult<u64> {
        self.call(
            "getBlockHeight",
            json!([{ "commitment": self.config.commitment.as_str() }]),
        )
        .await
    }

    async fn simulate_transaction(
        &self,
        bytes: &[u8],
        options: &SimulateOptions,
    ) -> LedgerResult<SimulationResult> {
        let response: Contextual<SimulationResult> = self
            .call(
                "simulateTransaction",
                json!([
                    BASE64_STANDARD.encode(bytes),
                    {
                        "encoding": "base64",
                        "sigVerify": false,
                        "replaceRecentBlockhash": options.replace_recent_blockhash,
                        "commitment": options.commitment.as_str(),
                    }
                ]),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> LedgerResult<Option<TransactionDetails>> {
        // getTransaction does not serve processed data.
        let commitment = self.config.commitment.max(Commitment::Confirmed);
        let raw: Option<RawTransaction> = self
            .call(
                "getTransaction",
                json!([
                    signature.to_string(),
                    {
                        "encoding": "json",
                        "commitment": commitment.as_str(),
                        "maxSupportedTransactionVersion": 0,
                    }
                ]),
            )
            .await?;
        Ok(raw.map(TransactionDetails::from))
    }
}

impl std::fmt::Debug for RpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedgerClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("endpoints", &self.endpoints.len())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

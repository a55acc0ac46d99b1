//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sender.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ledger::types::Commitment;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SenderConfig {
    /// Ledger node connection.
    pub ledger: LedgerConfig,

    /// Swap-routing service.
    pub quoting: QuotingConfig,

    /// Send-and-confirm waiter pacing.
    pub waiter: WaiterConfig,

    /// Retry policy for HTTP glue calls.
    pub retries: RetryConfig,

    /// Key loading.
    pub wallet: WalletConfig,

    /// Swap orchestration switches.
    pub swap: SwapConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger JSON-RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Commitment used for block height and simulation queries.
    pub commitment: Commitment,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            commitment: Commitment::Confirmed,
        }
    }
}

/// Swap-routing service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotingConfig {
    /// Base URL of the quote/swap API (without trailing slash).
    pub base_url: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Ask the provider to wrap/unwrap the native token.
    pub wrap_and_unwrap_sol: bool,
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quote-api.jup.ag/v6".to_string(),
            request_timeout_secs: 10,
            wrap_and_unwrap_sol: true,
        }
    }
}

/// Send-and-confirm waiter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WaiterConfig {
    /// Interval between resends of the same bytes.
    pub resend_interval_ms: u64,

    /// Interval between confirmation polls.
    pub poll_interval_ms: u64,

    /// Delay before the first poll, so polls interleave with resends.
    pub poll_offset_ms: u64,

    /// Hard wall-clock ceiling for one invocation.
    pub timeout_secs: u64,

    /// Minimum status level treated as landed.
    pub commitment: Commitment,

    /// Fetch logs and fee once landed.
    pub fetch_details: bool,
}

impl WaiterConfig {
    pub fn resend_interval(&self) -> Duration {
        Duration::from_millis(self.resend_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_offset(&self) -> Duration {
        Duration::from_millis(self.poll_offset_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            resend_interval_ms: 2000,
            poll_interval_ms: 2000,
            poll_offset_ms: 1000,
            timeout_secs: 60,
            commitment: Commitment::Processed,
            fetch_details: true,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding the secret key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: crate::ledger::wallet::PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Swap orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Simulate before submitting; a failing simulation aborts the swap.
    pub simulate: bool,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self { simulate: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SenderConfig::default();
        assert_eq!(config.waiter.resend_interval(), Duration::from_secs(2));
        assert_eq!(config.waiter.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.waiter.timeout(), Duration::from_secs(60));
        assert_eq!(config.waiter.commitment, Commitment::Processed);
        assert_eq!(config.ledger.commitment, Commitment::Confirmed);
        assert_eq!(config.wallet.private_key_env, "PRIVATE_KEY");
        assert!(config.swap.simulate);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SenderConfig = toml::from_str(
            r#"
            [ledger]
            rpc_url = "http://localhost:8899"

            [waiter]
            timeout_secs = 30
            commitment = "confirmed"
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.rpc_url, "http://localhost:8899");
        assert_eq!(config.ledger.rpc_timeout_secs, 10);
        assert_eq!(config.waiter.timeout_secs, 30);
        assert_eq!(config.waiter.commitment, Commitment::Confirmed);
        assert_eq!(config.waiter.resend_interval_ms, 2000);
        assert_eq!(config.quoting.base_url, "https://quote-api.jup.ag/v6");
    }
}

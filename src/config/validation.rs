//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (intervals > 0, intervals within timeout)
//!
//! Returns all validation errors, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::SenderConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SenderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "ledger.rpc_url", &config.ledger.rpc_url);
    for url in &config.ledger.failover_urls {
        check_url(&mut errors, "ledger.failover_urls", url);
    }
    if config.ledger.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.rpc_timeout_secs", "must be > 0"));
    }

    check_url(&mut errors, "quoting.base_url", &config.quoting.base_url);
    if config.quoting.request_timeout_secs == 0 {
        errors.push(ValidationError::new("quoting.request_timeout_secs", "must be > 0"));
    }

    let waiter = &config.waiter;
    if waiter.timeout_secs == 0 {
        errors.push(ValidationError::new("waiter.timeout_secs", "must be > 0"));
    }
    if waiter.resend_interval_ms == 0 {
        errors.push(ValidationError::new("waiter.resend_interval_ms", "must be > 0"));
    }
    if waiter.poll_interval_ms == 0 {
        errors.push(ValidationError::new("waiter.poll_interval_ms", "must be > 0"));
    }
    if waiter.timeout_secs > 0 {
        let timeout_ms = waiter.timeout_secs.saturating_mul(1000);
        if waiter.resend_interval_ms > timeout_ms {
            errors.push(ValidationError::new(
                "waiter.resend_interval_ms",
                "must not exceed waiter.timeout_secs",
            ));
        }
        if waiter.poll_interval_ms.saturating_add(waiter.poll_offset_ms) > timeout_ms {
            errors.push(ValidationError::new(
                "waiter.poll_interval_ms",
                "poll interval plus offset must not exceed waiter.timeout_secs",
            ));
        }
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected pretty or json", obs.log_format),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

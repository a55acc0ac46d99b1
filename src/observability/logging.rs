//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - JSON format for machine parsing, pretty format for terminals
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(log_level: &str) -> String {
    format!("{level},swap_sender={level},hyper=warn,reqwest=warn", level = log_level)
}

/// Install the global subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(&config.log_level)))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let directive = default_filter("debug");
        assert!(directive.starts_with("debug,swap_sender=debug"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SenderConfig (validated, immutable)
//!     → passed by value into each collaborator's constructor
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the binary runs without a config file
//! - Validation separates syntactic (serde) from semantic checks
//! - No process-wide config: collaborators receive their own section

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    LedgerConfig, ObservabilityConfig, QuotingConfig, RetryConfig, SenderConfig, SwapConfig,
    WaiterConfig, WalletConfig,
};
pub use validation::{validate_config, ValidationError};

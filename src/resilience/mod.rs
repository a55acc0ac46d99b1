//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Glue call (quote, swap tx, metadata lookup):
//!     → per-request timeout (set on the HTTP client)
//!     → On failure: retries.rs (check if retryable, retry with backoff.rs)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Only transient failures are retried (connect errors, 429, 5xx)
//! - Jittered backoff prevents thundering herd

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, BackoffPolicy};
pub use retries::retry_with_backoff;

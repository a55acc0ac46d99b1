//! Send-and-confirm subsystem.
//!
//! # Data Flow
//! ```text
//! SignedTransaction + BlockhashExpiry
//!     → waiter.rs
//!         resend task:  send → sleep(resend_interval) → send → ...
//!         poll:         sleep(poll_offset) → status → block height → sleep(poll_interval) → ...
//!         timeout:      sleep(timeout)
//!     → first terminal result → StopSignal → WaitReport
//! ```

pub mod waiter;

pub use waiter::{SubmissionAttempt, TransactionWaiter, WaitOutcome, WaitReport};

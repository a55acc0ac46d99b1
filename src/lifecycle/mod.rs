//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Waiter invocation:
//!     StopSignal::new() → resend task, poll loop subscribe
//!     first terminal result → trigger() → every loop exits at its next await
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → caller drops the wait → StopSignal dropped
//!     → resend task sees the closed channel and exits
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: in-flight calls finish, results discarded
//! - The signal is level-triggered so late subscribers still observe it

pub mod shutdown;
pub mod signals;

pub use shutdown::{StopListener, StopSignal};
pub use signals::shutdown_signal;

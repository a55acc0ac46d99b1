//! Send-and-confirm waiter.
//!
//! # Responsibilities
//! - Resend the same signed bytes on a fixed interval
//! - Poll the signature status, offset from the sends
//! - Detect blockhash expiry from the ledger's block height
//! - Bound the whole wait with an overall timeout
//!
//! # Design Decisions
//! - The resend loop is a spawned task; the poll and the timeout race on
//!   the caller's task. The first terminal result triggers one shared
//!   `StopSignal` and the resend loop exits at its next await.
//! - Network errors never end the wait. They are logged and the next
//!   tick tries again.
//! - Outcomes are values, not errors: expiry and timeout are ordinary
//!   results of sending a transaction.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{RetryConfig, WaiterConfig};
use crate::ledger::client::LedgerClient;
use crate::ledger::transaction::SignedTransaction;
use crate::ledger::types::{
    serialize_display, BlockhashExpiry, ConfirmedTransaction, LedgerError, LedgerResult,
    SendOptions, Signature, TransactionDetails, TransactionStatus,
};
use crate::lifecycle::{StopListener, StopSignal};
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, BackoffPolicy};

/// How a wait ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// The ledger reports the signature at or above the configured
    /// commitment. The transaction may still have failed on-chain.
    Confirmed(ConfirmedTransaction),
    /// The block height passed `last_valid_block_height` without the
    /// signature landing.
    Expired { block_height: u64 },
    /// The overall timeout fired first.
    TimedOut,
}

impl WaitOutcome {
    /// The confirmed transaction, or `None` for any non-confirmation.
    pub fn confirmed(&self) -> Option<ConfirmedTransaction> {
        match self {
            WaitOutcome::Confirmed(tx) => Some(tx.clone()),
            _ => None,
        }
    }

    /// Landed and executed without error.
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Confirmed(tx) if tx.is_success())
    }

    /// Metric and log label.
    pub fn label(&self) -> &'static str {
        match self {
            WaitOutcome::Confirmed(tx) if tx.is_success() => "confirmed",
            WaitOutcome::Confirmed(_) => "failed",
            WaitOutcome::Expired { .. } => "expired",
            WaitOutcome::TimedOut => "timed_out",
        }
    }
}

/// Result of one `send_and_confirm` invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitReport {
    #[serde(serialize_with = "serialize_display")]
    pub signature: Signature,
    pub outcome: WaitOutcome,
    /// Number of send attempts issued, successful or not.
    pub sends: u32,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// One send of the signed bytes.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionAttempt {
    /// 1-based.
    pub number: u32,
    pub sent_at: Instant,
}

/// Submits a signed transaction repeatedly until it lands, expires or
/// the deadline passes.
pub struct TransactionWaiter<L> {
    ledger: Arc<L>,
    config: WaiterConfig,
    details_retry: BackoffPolicy,
}

impl<L: LedgerClient + 'static> TransactionWaiter<L> {
    pub fn new(ledger: Arc<L>, config: WaiterConfig) -> Self {
        Self {
            ledger,
            config,
            details_retry: BackoffPolicy::from(&RetryConfig::default()),
        }
    }

    /// Backoff used when fetching transaction metadata after confirmation.
    pub fn with_retry_policy(mut self, policy: BackoffPolicy) -> Self {
        self.details_retry = policy;
        self
    }

    /// Send `tx` until it is confirmed, its blockhash expires, or the
    /// configured timeout passes. Exactly one outcome is returned.
    pub async fn send_and_confirm(
        &self,
        tx: &SignedTransaction,
        expiry: &BlockhashExpiry,
    ) -> WaitReport {
        let started = Instant::now();
        let signature = tx.signature();
        let stop = StopSignal::new();
        let sends = Arc::new(AtomicU32::new(0));

        tracing::info!(
            signature = %signature,
            last_valid_block_height = expiry.last_valid_block_height,
            timeout_secs = self.config.timeout_secs,
            "Sending transaction"
        );

        tokio::spawn(resend_loop(
            Arc::clone(&self.ledger),
            tx.shared_bytes(),
            signature,
            self.config.resend_interval(),
            stop.subscribe(),
            Arc::clone(&sends),
        ));

        let outcome = tokio::select! {
            outcome = self.poll_until_terminal(signature, expiry) => outcome,
            _ = time::sleep(self.config.timeout()) => WaitOutcome::TimedOut,
        };
        stop.trigger();

        let outcome = match outcome {
            WaitOutcome::Confirmed(confirmed) if self.config.fetch_details => {
                WaitOutcome::Confirmed(self.attach_details(confirmed).await)
            }
            other => other,
        };

        let report = WaitReport {
            signature,
            sends: sends.load(Ordering::SeqCst),
            elapsed: started.elapsed(),
            outcome,
        };
        metrics::record_outcome(report.outcome.label(), report.elapsed);

        match &report.outcome {
            WaitOutcome::Confirmed(confirmed) => tracing::info!(
                signature = %signature,
                slot = confirmed.slot,
                confirmation_status = %confirmed.confirmation_status,
                success = confirmed.is_success(),
                sends = report.sends,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Transaction confirmed"
            ),
            WaitOutcome::Expired { block_height } => tracing::info!(
                signature = %signature,
                block_height,
                last_valid_block_height = expiry.last_valid_block_height,
                sends = report.sends,
                "Blockhash expired before confirmation"
            ),
            WaitOutcome::TimedOut => tracing::info!(
                signature = %signature,
                sends = report.sends,
                timeout_secs = self.config.timeout_secs,
                "Timed out waiting for confirmation"
            ),
        }

        report
    }

    async fn poll_until_terminal(
        &self,
        signature: Signature,
        expiry: &BlockhashExpiry,
    ) -> WaitOutcome {
        let mut ticker = time::interval_at(
            Instant::now() + self.config.poll_offset(),
            self.config.poll_interval(),
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll = 0u32;

        loop {
            ticker.tick().await;
            poll += 1;

            // A failed status lookup must not hide expiry; the height is
            // checked either way.
            match self.check_status(signature, false).await {
                Ok(TransactionStatus::Confirmed(confirmed)) => {
                    return WaitOutcome::Confirmed(confirmed)
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(signature = %signature, poll, error = %e, "Status poll failed");
                }
            }

            let block_height = match self.ledger.get_block_height().await {
                Ok(height) => height,
                Err(e) => {
                    tracing::warn!(signature = %signature, poll, error = %e, "Block height poll failed");
                    continue;
                }
            };

            if expiry.is_expired_at(block_height) {
                // A landing between the status check and the height check
                // still wins. The re-check is best effort.
                match self.check_status(signature, true).await {
                    Ok(TransactionStatus::Confirmed(confirmed)) => {
                        return WaitOutcome::Confirmed(confirmed)
                    }
                    Ok(status) => {
                        tracing::debug!(signature = %signature, ?status, "Final status check")
                    }
                    Err(e) => {
                        tracing::warn!(signature = %signature, error = %e, "Final status check failed")
                    }
                }
                return WaitOutcome::Expired { block_height };
            }

            tracing::debug!(
                signature = %signature,
                poll,
                block_height,
                blocks_left = expiry.last_valid_block_height - block_height,
                "Not confirmed yet"
            );
        }
    }

    /// One status lookup, classified against the configured commitment.
    /// `expired` says whether the validity window is known to have passed.
    async fn check_status(
        &self,
        signature: Signature,
        expired: bool,
    ) -> LedgerResult<TransactionStatus> {
        let statuses = match self.ledger.get_signature_statuses(&[signature]).await {
            Ok(statuses) => {
                metrics::record_poll(true);
                statuses
            }
            Err(e) => {
                metrics::record_poll(false);
                return Err(e);
            }
        };

        let status = statuses.into_iter().next().flatten();
        let classified =
            TransactionStatus::classify(signature, status.as_ref(), self.config.commitment, expired);
        if classified == TransactionStatus::Pending {
            tracing::debug!(
                signature = %signature,
                required = %self.config.commitment,
                "Seen below required commitment"
            );
        }
        Ok(classified)
    }

    /// Merge full metadata into a confirmation. Failure keeps the
    /// status-derived data.
    async fn attach_details(&self, confirmed: ConfirmedTransaction) -> ConfirmedTransaction {
        let signature = confirmed.signature;
        let fetched = retry_with_backoff(
            &self.details_retry,
            "get_transaction",
            |_: &LedgerError| true,
            || self.fetch_details(signature),
        )
        .await;

        match fetched {
            Ok(details) => confirmed.with_details(details),
            Err(e) => {
                tracing::warn!(signature = %signature, error = %e, "Could not fetch transaction details");
                confirmed
            }
        }
    }

    async fn fetch_details(&self, signature: Signature) -> LedgerResult<TransactionDetails> {
        self.ledger.get_transaction(&signature).await?.ok_or_else(|| {
            LedgerError::InvalidResponse("transaction not yet available".to_string())
        })
    }
}

async fn resend_loop<L: LedgerClient>(
    ledger: Arc<L>,
    bytes: Arc<[u8]>,
    signature: Signature,
    interval: Duration,
    mut stop: StopListener,
    sends: Arc<AtomicU32>,
) {
    let options = SendOptions::resend();
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first_sent: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;
            _ = stop.stopped() => break,
            _ = ticker.tick() => {}
        }

        let attempt = SubmissionAttempt {
            number: sends.fetch_add(1, Ordering::SeqCst) + 1,
            sent_at: Instant::now(),
        };
        let since_first = attempt
            .sent_at
            .duration_since(*first_sent.get_or_insert(attempt.sent_at));

        match ledger.send_raw_transaction(&bytes, &options).await {
            Ok(returned) => {
                metrics::record_send(true);
                if returned != signature {
                    tracing::warn!(
                        signature = %signature,
                        returned = %returned,
                        "Node returned a different signature"
                    );
                }
                tracing::debug!(
                    signature = %signature,
                    attempt = attempt.number,
                    since_first_ms = since_first.as_millis() as u64,
                    "Transaction sent"
                );
            }
            Err(e) => {
                metrics::record_send(false);
                tracing::warn!(
                    signature = %signature,
                    attempt = attempt.number,
                    error = %e,
                    "Send failed"
                );
            }
        }
    }

    tracing::debug!(signature = %signature, sends = sends.load(Ordering::SeqCst), "Resend loop stopped");
}

//! Quote → sign → simulate → send-and-confirm.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::SenderConfig;
use crate::confirm::{TransactionWaiter, WaitReport};
use crate::ledger::client::LedgerClient;
use crate::ledger::transaction::{SignedTransaction, UnsignedTransaction, WireError};
use crate::ledger::types::{BlockhashExpiry, Commitment, LedgerError, SimulateOptions};
use crate::ledger::wallet::{Wallet, WalletError};
use crate::observability::metrics;
use crate::quoting::client::QuoteProvider;
use crate::quoting::types::{FeeParams, QuoteError, QuoteRequest};
use crate::resilience::BackoffPolicy;

/// Errors that stop a swap before or instead of the waiter.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Quote provider error: {0}")]
    Quote(#[from] QuoteError),

    #[error("No route found for {input_mint} -> {output_mint}")]
    NoQuote {
        input_mint: String,
        output_mint: String,
    },

    #[error("Provider returned no swap transaction")]
    NoSwapTransaction,

    #[error("Provider did not return lastValidBlockHeight")]
    MissingExpiry,

    #[error("Malformed transaction: {0}")]
    Wire(#[from] WireError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Simulation predicted an execution failure; nothing was sent.
    #[error("Simulation failed: {err}")]
    Simulation { err: Value, logs: Vec<String> },
}

/// Result type for swap operations.
pub type SwapResult<T> = Result<T, SwapError>;

/// Simulates (optionally) and sends an already signed transaction.
///
/// Needs no wallet, so it also serves raw `send` requests.
pub struct Submitter<L> {
    ledger: Arc<L>,
    waiter: TransactionWaiter<L>,
    simulate: bool,
    simulation_commitment: Commitment,
}

impl<L: LedgerClient + 'static> Submitter<L> {
    pub fn new(ledger: Arc<L>, config: &SenderConfig) -> Self {
        let waiter = TransactionWaiter::new(Arc::clone(&ledger), config.waiter.clone())
            .with_retry_policy(BackoffPolicy::from(&config.retries));
        Self {
            ledger,
            waiter,
            simulate: config.swap.simulate,
            simulation_commitment: config.ledger.commitment,
        }
    }

    /// Turn simulation on or off (CLI `--no-simulate`).
    pub fn with_simulation(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    /// Simulate (if enabled), then send and confirm `tx`.
    pub async fn submit_signed(
        &self,
        tx: &SignedTransaction,
        expiry: &BlockhashExpiry,
    ) -> SwapResult<WaitReport> {
        let span = tracing::info_span!("send", run_id = %Uuid::new_v4(), signature = %tx.signature());
        self.simulate_and_wait(tx, expiry).instrument(span).await
    }

    async fn simulate_and_wait(
        &self,
        tx: &SignedTransaction,
        expiry: &BlockhashExpiry,
    ) -> SwapResult<WaitReport> {
        if self.simulate {
            self.check_simulation(tx).await?;
        }
        Ok(self.waiter.send_and_confirm(tx, expiry).await)
    }

    async fn check_simulation(&self, tx: &SignedTransaction) -> SwapResult<()> {
        let options = SimulateOptions {
            replace_recent_blockhash: true,
            commitment: self.simulation_commitment,
        };
        let result = self.ledger.simulate_transaction(tx.bytes(), &options).await?;
        metrics::record_simulation(result.is_success());

        match result.err {
            None => {
                tracing::debug!(
                    signature = %tx.signature(),
                    units_consumed = ?result.units_consumed,
                    "Simulation succeeded"
                );
                Ok(())
            }
            Some(err) => {
                let logs = result.logs.unwrap_or_default();
                tracing::warn!(
                    signature = %tx.signature(),
                    error = %err,
                    log_lines = logs.len(),
                    "Simulation failed, not sending"
                );
                Err(SwapError::Simulation { err, logs })
            }
        }
    }
}

/// Drives one swap from quote to confirmation.
pub struct SwapExecutor<P, L> {
    provider: Arc<P>,
    wallet: Wallet,
    submitter: Submitter<L>,
}

impl<P, L> SwapExecutor<P, L>
where
    P: QuoteProvider,
    L: LedgerClient + 'static,
{
    pub fn new(provider: Arc<P>, ledger: Arc<L>, wallet: Wallet, config: &SenderConfig) -> Self {
        Self {
            provider,
            wallet,
            submitter: Submitter::new(ledger, config),
        }
    }

    pub fn with_simulation(mut self, simulate: bool) -> Self {
        self.submitter = self.submitter.with_simulation(simulate);
        self
    }

    /// Quote, build, sign, optionally simulate, then send and confirm.
    pub async fn execute(
        &self,
        request: &QuoteRequest,
        fees: &FeeParams,
    ) -> SwapResult<WaitReport> {
        let span = tracing::info_span!(
            "swap",
            run_id = %Uuid::new_v4(),
            input_mint = %request.input_mint,
            output_mint = %request.output_mint,
            amount = request.amount,
        );
        self.run_swap(request, fees).instrument(span).await
    }

    async fn run_swap(&self, request: &QuoteRequest, fees: &FeeParams) -> SwapResult<WaitReport> {
        let quote = self
            .provider
            .get_quote(request)
            .await?
            .ok_or_else(|| SwapError::NoQuote {
                input_mint: request.input_mint.clone(),
                output_mint: request.output_mint.clone(),
            })?;

        let swap = self
            .provider
            .get_swap_transaction(&quote, &self.wallet.pubkey(), fees)
            .await?
            .ok_or(SwapError::NoSwapTransaction)?;

        let last_valid_block_height = swap
            .last_valid_block_height
            .ok_or(SwapError::MissingExpiry)?;

        let unsigned = UnsignedTransaction::from_base64(&swap.swap_transaction)?;
        let expiry = BlockhashExpiry::new(unsigned.recent_blockhash(), last_valid_block_height);
        let signed = unsigned.sign(&self.wallet)?;

        tracing::info!(
            signature = %signed.signature(),
            blockhash = %expiry.blockhash,
            last_valid_block_height,
            prioritization_fee_lamports = ?swap.prioritization_fee_lamports,
            "Swap transaction signed"
        );

        self.submitter.simulate_and_wait(&signed, &expiry).await
    }
}

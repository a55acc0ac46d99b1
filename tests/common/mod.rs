//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde_json::{json, Value};
use tokio::time::Instant;

use solana_message::{v0, MessageHeader, VersionedMessage};
use solana_transaction::versioned::VersionedTransaction;

use swap_sender::config::WaiterConfig;
use swap_sender::ledger::{
    Commitment, Hash, LedgerClient, LedgerError, LedgerResult, Pubkey, SendOptions, Signature,
    SignatureStatus, SignedTransaction, SimulateOptions, SimulationResult, TransactionDetails,
    UnsignedTransaction, Wallet,
};
use swap_sender::quoting::{
    FeeParams, QuoteProvider, QuoteRequest, QuoteResponse, QuoteResult, SwapTransaction,
};

pub fn blockhash() -> Hash {
    Hash::new_from_array([5u8; 32])
}

/// A sequence of canned answers. Each call takes the next one; the last
/// answer repeats once the script runs out.
pub struct Script<T> {
    steps: Mutex<Vec<T>>,
}

impl<T: Clone> Script<T> {
    pub fn new(steps: Vec<T>) -> Self {
        Self {
            steps: Mutex::new(steps),
        }
    }

    fn next(&self) -> Option<T> {
        let mut steps = self.steps.lock().unwrap();
        match steps.len() {
            0 => None,
            1 => Some(steps[0].clone()),
            _ => Some(steps.remove(0)),
        }
    }
}

/// Scripted ledger. `Err(msg)` steps become transport errors.
pub struct FakeLedger {
    pub statuses: Script<Result<Option<SignatureStatus>, String>>,
    pub heights: Script<Result<u64, String>>,
    pub send_results: Script<Result<(), LedgerErrorKind>>,
    pub simulation: Mutex<SimulationResult>,
    pub details: Mutex<Option<TransactionDetails>>,
    send_times: Mutex<Vec<Instant>>,
    status_calls: AtomicU32,
    simulate_calls: AtomicU32,
}

/// Cloneable stand-in for the send errors a node returns.
#[derive(Debug, Clone)]
pub enum LedgerErrorKind {
    AlreadyProcessed,
    Transport,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            statuses: Script::new(vec![Ok(None)]),
            heights: Script::new(vec![Ok(0)]),
            send_results: Script::new(vec![Ok(())]),
            simulation: Mutex::new(SimulationResult::default()),
            details: Mutex::new(None),
            send_times: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
            simulate_calls: AtomicU32::new(0),
        }
    }

    pub fn with_statuses(mut self, steps: Vec<Result<Option<SignatureStatus>, String>>) -> Self {
        self.statuses = Script::new(steps);
        self
    }

    pub fn with_heights(mut self, heights: Vec<u64>) -> Self {
        self.heights = Script::new(heights.into_iter().map(Ok).collect());
        self
    }

    pub fn with_height_steps(mut self, steps: Vec<Result<u64, String>>) -> Self {
        self.heights = Script::new(steps);
        self
    }

    pub fn with_send_results(mut self, steps: Vec<Result<(), LedgerErrorKind>>) -> Self {
        self.send_results = Script::new(steps);
        self
    }

    pub fn with_simulation(self, result: SimulationResult) -> Self {
        *self.simulation.lock().unwrap() = result;
        self
    }

    pub fn with_details(self, details: TransactionDetails) -> Self {
        *self.details.lock().unwrap() = Some(details);
        self
    }

    pub fn sends(&self) -> u32 {
        self.send_times.lock().unwrap().len() as u32
    }

    pub fn send_times(&self) -> Vec<Instant> {
        self.send_times.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn simulate_calls(&self) -> u32 {
        self.simulate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn send_raw_transaction(
        &self,
        bytes: &[u8],
        _options: &SendOptions,
    ) -> LedgerResult<Signature> {
        self.send_times.lock().unwrap().push(Instant::now());
        match self.send_results.next().unwrap_or(Ok(())) {
            Ok(()) => Ok(signature_of(bytes)),
            Err(LedgerErrorKind::AlreadyProcessed) => Err(LedgerError::JsonRpc {
                code: -32002,
                message: "Transaction simulation failed: This transaction has already been processed"
                    .to_string(),
            }),
            Err(LedgerErrorKind::Transport) => {
                Err(LedgerError::Rpc("connection reset by peer".to_string()))
            }
        }
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.next().unwrap_or(Ok(None)) {
            Ok(status) => Ok(signatures.iter().map(|_| status.clone()).collect()),
            Err(msg) => Err(LedgerError::Rpc(msg)),
        }
    }

    async fn get_block_height(&self) -> LedgerResult<u64> {
        match self.heights.next().unwrap_or(Ok(0)) {
            Ok(height) => Ok(height),
            Err(msg) => Err(LedgerError::Rpc(msg)),
        }
    }

    async fn simulate_transaction(
        &self,
        _bytes: &[u8],
        _options: &SimulateOptions,
    ) -> LedgerResult<SimulationResult> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.simulation.lock().unwrap().clone())
    }

    async fn get_transaction(
        &self,
        _signature: &Signature,
    ) -> LedgerResult<Option<TransactionDetails>> {
        Ok(self.details.lock().unwrap().clone())
    }
}

/// First signature of a serialized transaction.
fn signature_of(bytes: &[u8]) -> Signature {
    let tx: VersionedTransaction = bincode::deserialize(bytes).unwrap();
    tx.signatures[0]
}

pub fn status(level: Commitment, err: Option<Value>) -> SignatureStatus {
    SignatureStatus {
        slot: 250_000_000,
        confirmations: Some(0),
        err,
        confirmation_status: Some(level),
    }
}

/// Waiter pacing used by the scenario tests: sends at 0, 2, 4 s ...,
/// polls at 1, 3, 5 s ..., 60 s deadline.
pub fn waiter_config() -> WaiterConfig {
    WaiterConfig {
        fetch_details: false,
        ..WaiterConfig::default()
    }
}

pub fn wallet() -> Wallet {
    Wallet::from_seed([9u8; 32])
}

/// A v0 transaction with the given signers, one program key, no
/// instructions and an empty signature table.
pub fn unsigned_tx_bytes(signers: &[Pubkey], blockhash: Hash) -> Vec<u8> {
    let mut account_keys = signers.to_vec();
    account_keys.push(Pubkey::new_from_array([3u8; 32]));
    let message = v0::Message {
        header: MessageHeader {
            num_required_signatures: signers.len() as u8,
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 1,
        },
        account_keys,
        recent_blockhash: blockhash,
        instructions: vec![],
        address_table_lookups: vec![],
    };
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); signers.len()],
        message: VersionedMessage::V0(message),
    };
    bincode::serialize(&tx).unwrap()
}

pub fn unsigned_tx_base64(signer: Pubkey) -> String {
    BASE64_STANDARD.encode(unsigned_tx_bytes(&[signer], blockhash()))
}

pub fn signed_tx() -> SignedTransaction {
    let wallet = wallet();
    UnsignedTransaction::from_bytes(&unsigned_tx_bytes(&[wallet.pubkey()], blockhash()))
        .unwrap()
        .sign(&wallet)
        .unwrap()
}

pub fn quote() -> QuoteResponse {
    serde_json::from_value(json!({
        "inputMint": "So11111111111111111111111111111111111111112",
        "inAmount": "1000000",
        "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "outAmount": "152000",
        "otherAmountThreshold": "144400",
        "swapMode": "ExactIn",
        "slippageBps": 500,
        "priceImpactPct": "0",
        "routePlan": [{ "swapInfo": { "label": "Whirlpool" }, "percent": 100 }]
    }))
    .unwrap()
}

pub fn quote_request() -> QuoteRequest {
    QuoteRequest {
        input_mint: "So11111111111111111111111111111111111111112".to_string(),
        output_mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
        amount: 1_000_000,
        slippage_bps: 500,
        allowed_venues: Vec::new(),
    }
}

/// Provider with fixed answers.
pub struct FakeProvider {
    pub quote: Option<QuoteResponse>,
    pub swap: Option<SwapTransaction>,
    pub swap_calls: AtomicU32,
}

impl FakeProvider {
    /// A provider that quotes and returns a transaction for `signer`
    /// valid up to `last_valid_block_height`.
    pub fn new(signer: Pubkey, last_valid_block_height: Option<u64>) -> Self {
        Self {
            quote: Some(quote()),
            swap: Some(SwapTransaction {
                swap_transaction: unsigned_tx_base64(signer),
                last_valid_block_height,
                prioritization_fee_lamports: Some(5000),
            }),
            swap_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl QuoteProvider for FakeProvider {
    async fn get_quote(&self, _request: &QuoteRequest) -> QuoteResult<Option<QuoteResponse>> {
        Ok(self.quote.clone())
    }

    async fn get_swap_transaction(
        &self,
        _quote: &QuoteResponse,
        _user: &Pubkey,
        _fees: &FeeParams,
    ) -> QuoteResult<Option<SwapTransaction>> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.swap.clone())
    }
}

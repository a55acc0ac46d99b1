//! End-to-end swap orchestration against fake collaborators.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;
use swap_sender::config::SenderConfig;
use swap_sender::ledger::{BlockhashExpiry, Commitment, SimulationResult};
use swap_sender::quoting::FeeParams;
use swap_sender::swap::{Submitter, SwapError, SwapExecutor};

mod common;
use common::{status, FakeLedger, FakeProvider};

fn config() -> SenderConfig {
    let mut config = SenderConfig::default();
    config.waiter = common::waiter_config();
    config
}

#[tokio::test(start_paused = true)]
async fn test_swap_happy_path() {
    let wallet = common::wallet();
    let provider = Arc::new(FakeProvider::new(wallet.pubkey(), Some(100)));
    let ledger = Arc::new(
        FakeLedger::new()
            .with_heights(vec![90])
            .with_statuses(vec![Ok(None), Ok(Some(status(Commitment::Confirmed, None)))]),
    );
    let executor = SwapExecutor::new(provider, Arc::clone(&ledger), wallet, &config());

    let report = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap();

    assert!(report.outcome.is_success());
    assert_eq!(report.signature, common::signed_tx().signature());
    assert_eq!(ledger.simulate_calls(), 1);
    assert_eq!(report.sends, ledger.sends());
}

#[tokio::test(start_paused = true)]
async fn test_simulation_error_sends_nothing() {
    let wallet = common::wallet();
    let provider = Arc::new(FakeProvider::new(wallet.pubkey(), Some(100)));
    let ledger = Arc::new(FakeLedger::new().with_simulation(SimulationResult {
        err: Some(json!({ "InstructionError": [3, { "Custom": 6001 }] })),
        logs: Some(vec!["Program log: slippage tolerance exceeded".to_string()]),
        units_consumed: Some(42_000),
    }));
    let executor = SwapExecutor::new(provider, Arc::clone(&ledger), wallet, &config());

    let err = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap_err();

    match err {
        SwapError::Simulation { err, logs } => {
            assert_eq!(err["InstructionError"][1]["Custom"], json!(6001));
            assert_eq!(logs.len(), 1);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_simulate_skips_simulation() {
    let wallet = common::wallet();
    let provider = Arc::new(FakeProvider::new(wallet.pubkey(), Some(100)));
    let ledger = Arc::new(
        FakeLedger::new()
            .with_heights(vec![90])
            .with_statuses(vec![Ok(Some(status(Commitment::Processed, None)))])
            .with_simulation(SimulationResult {
                err: Some(json!("AccountNotFound")),
                ..SimulationResult::default()
            }),
    );
    let executor = SwapExecutor::new(provider, Arc::clone(&ledger), wallet, &config())
        .with_simulation(false);

    let report = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap();

    assert!(report.outcome.confirmed().is_some());
    assert_eq!(ledger.simulate_calls(), 0);
}

#[tokio::test]
async fn test_missing_expiry_aborts_before_sending() {
    let wallet = common::wallet();
    let provider = Arc::new(FakeProvider::new(wallet.pubkey(), None));
    let ledger = Arc::new(FakeLedger::new());
    let executor = SwapExecutor::new(provider, Arc::clone(&ledger), wallet, &config());

    let err = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::MissingExpiry));
    assert_eq!(ledger.simulate_calls(), 0);
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test]
async fn test_no_quote_and_no_transaction() {
    let wallet = common::wallet();
    let mut provider = FakeProvider::new(wallet.pubkey(), Some(100));
    provider.quote = None;
    let provider = Arc::new(provider);
    let ledger = Arc::new(FakeLedger::new());
    let executor = SwapExecutor::new(
        Arc::clone(&provider),
        Arc::clone(&ledger),
        wallet.clone(),
        &config(),
    );

    let err = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::NoQuote { .. }));
    assert_eq!(provider.swap_calls.load(Ordering::SeqCst), 0);

    let mut provider = FakeProvider::new(wallet.pubkey(), Some(100));
    provider.swap = None;
    let executor = SwapExecutor::new(Arc::new(provider), Arc::clone(&ledger), wallet, &config());
    let err = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::NoSwapTransaction));
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test]
async fn test_wallet_not_a_signer() {
    let wallet = common::wallet();
    let stranger = swap_sender::ledger::Wallet::from_seed([1u8; 32]);
    let provider = Arc::new(FakeProvider::new(stranger.pubkey(), Some(100)));
    let ledger = Arc::new(FakeLedger::new());
    let executor = SwapExecutor::new(provider, Arc::clone(&ledger), wallet, &config());

    let err = executor
        .execute(&common::quote_request(), &FeeParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SwapError::Wire(_)));
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submit_signed_expires() {
    let ledger = Arc::new(FakeLedger::new().with_heights(vec![98, 99, 101]));
    let submitter = Submitter::new(Arc::clone(&ledger), &config());
    let tx = common::signed_tx();
    let expiry = BlockhashExpiry::new(tx.recent_blockhash(), 100);

    let report = submitter.submit_signed(&tx, &expiry).await.unwrap();

    assert!(report.outcome.confirmed().is_none());
    assert_eq!(report.outcome.label(), "expired");
    assert_eq!(ledger.simulate_calls(), 1);
}

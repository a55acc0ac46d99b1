//! Swap transaction sender
//!
//! Quotes a swap, signs the provider-built transaction, and keeps
//! resubmitting it until it is confirmed, its blockhash expires, or the
//! wait times out.
//!
//! # Architecture Overview
//!
//! ```text
//!   swap ──▶ quoting (JupiterClient) ──▶ ledger::transaction (decode + sign)
//!                                              │
//!   send ─────────────────────────────────────▶│
//!                                              ▼
//!                                   swap::Submitter (simulate)
//!                                              │
//!                                              ▼
//!                                  confirm::TransactionWaiter
//!                          ┌──────────── resend task ───────────┐
//!                          │  status poll ─ block height check  │──▶ ledger::rpc
//!                          └──────────── overall timeout ───────┘
//! ```
//!
//! # Exit codes
//! - 0: confirmed and executed successfully
//! - 1: setup, provider, simulation or ledger error
//! - 2: expired, timed out, or landed with an execution error

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use swap_sender::config::{load_or_default, validate_config, ConfigError, SenderConfig};
use swap_sender::confirm::WaitReport;
use swap_sender::ledger::{
    BlockhashExpiry, LedgerClient, RpcLedgerClient, Signature, SignedTransaction,
    TransactionStatus, Wallet,
};
use swap_sender::lifecycle::shutdown_signal;
use swap_sender::observability::{logging, metrics};
use swap_sender::quoting::{FeeParams, JupiterClient, QuoteRequest};
use swap_sender::swap::{Submitter, SwapError, SwapExecutor, SwapResult};

#[derive(Parser)]
#[command(name = "swap-sender")]
#[command(about = "Quote, sign and reliably land swap transactions", long_about = None)]
struct Cli {
    /// TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `ledger.rpc_url`.
    #[arg(long)]
    rpc_url: Option<String>,

    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote, sign and send a swap
    Swap {
        #[arg(long)]
        input_mint: String,
        #[arg(long)]
        output_mint: String,
        /// Input amount in base units
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        slippage_bps: u16,
        /// Restrict the route to these venues
        #[arg(long, value_delimiter = ',')]
        dexes: Vec<String>,
        /// Priority fee in micro-lamports per compute unit (default: provider "auto")
        #[arg(long)]
        compute_unit_price: Option<u64>,
        /// Jito tip in lamports; replaces the compute unit price
        #[arg(long)]
        jito_tip: Option<u64>,
        /// Skip the pre-send simulation
        #[arg(long)]
        no_simulate: bool,
    },
    /// Send an already signed base64 transaction and wait for it
    Send {
        #[arg(long)]
        tx: String,
        #[arg(long)]
        last_valid_block_height: u64,
        #[arg(long)]
        no_simulate: bool,
    },
    /// Look up a signature's current status
    Status {
        #[arg(long)]
        signature: Signature,
        /// Report an unknown signature as expired once the ledger is past this height
        #[arg(long)]
        last_valid_block_height: Option<u64>,
    },
}

fn build_config(cli: &Cli) -> Result<SenderConfig, ConfigError> {
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.rpc_url {
        config.ledger.rpc_url = url.clone();
    }
    match cli.log_format {
        Some(LogFormat::Json) => config.observability.log_format = "json".to_string(),
        Some(LogFormat::Pretty) => config.observability.log_format = "pretty".to_string(),
        None => {}
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc_url = %config.ledger.rpc_url,
        quote_api = %config.quoting.base_url,
        "swap-sender starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let ledger = Arc::new(RpcLedgerClient::new(config.ledger.clone())?);

    tokio::select! {
        result = run(cli.command, &config, ledger) => result,
        _ = shutdown_signal() => {
            tracing::warn!("Shutdown signal received, abandoning wait; the transaction may still land");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(
    command: Commands,
    config: &SenderConfig,
    ledger: Arc<RpcLedgerClient>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Swap {
            input_mint,
            output_mint,
            amount,
            slippage_bps,
            dexes,
            compute_unit_price,
            jito_tip,
            no_simulate,
        } => {
            let wallet = Wallet::from_env(&config.wallet.private_key_env)?;
            let provider = Arc::new(JupiterClient::new(config.quoting.clone(), &config.retries)?);
            let executor = SwapExecutor::new(provider, ledger, wallet, config)
                .with_simulation(config.swap.simulate && !no_simulate);

            let request = QuoteRequest {
                input_mint,
                output_mint,
                amount,
                slippage_bps,
                allowed_venues: dexes,
            };
            let fees = FeeParams {
                compute_unit_price_micro_lamports: compute_unit_price,
                jito_tip_lamports: jito_tip,
            };
            report_exit_code(executor.execute(&request, &fees).await)
        }
        Commands::Send {
            tx,
            last_valid_block_height,
            no_simulate,
        } => {
            let tx = SignedTransaction::from_base64(&tx)?;
            let expiry = BlockhashExpiry::new(tx.recent_blockhash(), last_valid_block_height);
            let submitter = Submitter::new(ledger, config)
                .with_simulation(config.swap.simulate && !no_simulate);
            report_exit_code(submitter.submit_signed(&tx, &expiry).await)
        }
        Commands::Status {
            signature,
            last_valid_block_height,
        } => {
            let statuses = ledger.get_signature_statuses(&[signature]).await?;
            let status = statuses.into_iter().next().flatten();

            let expired = match last_valid_block_height {
                Some(last_valid) => ledger.get_block_height().await? > last_valid,
                None => false,
            };
            let classified = TransactionStatus::classify(
                signature,
                status.as_ref(),
                config.waiter.commitment,
                expired,
            );
            println!("{}", serde_json::to_string_pretty(&classified)?);

            Ok(match classified {
                TransactionStatus::Confirmed(tx) if tx.is_success() => ExitCode::SUCCESS,
                _ => ExitCode::from(2),
            })
        }
    }
}

/// Print the report and map it to an exit code.
fn report_exit_code(result: SwapResult<WaitReport>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let report = match result {
        Ok(report) => report,
        Err(SwapError::Simulation { err, logs }) => {
            eprintln!("Simulation failed: {}", err);
            for line in &logs {
                eprintln!("  {}", line);
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

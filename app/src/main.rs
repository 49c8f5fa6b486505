// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MockBank
//!
//! Entry point for the `mockbank` binary. Parses CLI arguments, initializes
//! logging, opens the on-disk ledger, and either runs one command against it
//! or serves it over HTTP.
//!
//! - `balance`, `history`, `summary`, `receipt`: read the ledger
//! - `transfer`, `top-up`: submit through the simulator, then print a receipt
//! - `banks`: fetch the bank directory (or fall back to the built-in list)
//! - `serve`: HTTP API plus `/metrics`
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;

use mockbank_ledger::directory::{fallback_banks, DirectoryConfig};
use mockbank_ledger::transaction::{TopUpInput, TransferInput};
use mockbank_ledger::views::Receipt;
use mockbank_ledger::{
    load_banks, BankSource, HttpBankSource, Session, SimulatorConfig, SimulatorError,
    SimulatorEvent, SledStore, StaticBankSource, Transaction, TransactionSimulator,
    TransactionType,
};

use cli::{Commands, GlobalArgs, MockbankCli};
use logging::LogProfile;
use metrics::AppMetrics;

/// Name of the sled database inside the data directory.
const DB_DIR_NAME: &str = "ledger";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MockbankCli::parse();
    let profile = LogProfile::for_command(&cli.command);

    match cli.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Banks => {
            logging::init_logging(profile, cli.global.log_format)?;
            list_banks(&cli.global).await
        }
        command => {
            logging::init_logging(profile, cli.global.log_format)?;
            let simulator = open_ledger(&cli.global)?;
            run_command(command, &cli.global, simulator).await
        }
    }
}

/// Opens the sled store under the data directory and builds the one
/// session and simulator for this process.
fn open_ledger(global: &GlobalArgs) -> Result<TransactionSimulator> {
    let data_dir = &global.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let db_path = data_dir.join(DB_DIR_NAME);
    let store = SledStore::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "ledger store opened");

    let session = Arc::new(Session::open(Arc::new(store)));
    let config = if global.fast {
        SimulatorConfig::instant()
    } else {
        SimulatorConfig::default()
    };
    Ok(TransactionSimulator::new(session, config))
}

async fn run_command(
    command: Commands,
    global: &GlobalArgs,
    simulator: TransactionSimulator,
) -> Result<()> {
    let session = Arc::clone(simulator.session());

    match command {
        Commands::Balance => {
            println!("Hi, {}", session.user_name());
            println!("  Balance : {}", session.balance().display_with_symbol());
            Ok(())
        }
        Commands::Transfer(args) => {
            let input = TransferInput::from(args);
            let tx = submit(&simulator, |sim| async move { sim.submit_transfer(input).await })
                .await?;
            print_completed(&tx, &session);
            Ok(())
        }
        Commands::TopUp(args) => {
            let input = TopUpInput::from(args);
            let tx =
                submit(&simulator, |sim| async move { sim.submit_top_up(input).await }).await?;
            print_completed(&tx, &session);
            Ok(())
        }
        Commands::History(args) => {
            let entries = session.history(Local::now().naive_local());
            if entries.is_empty() {
                println!("No transactions yet.");
                return Ok(());
            }
            let limit = args.limit.unwrap_or(entries.len());
            for entry in entries.iter().take(limit) {
                let tx = &entry.transaction;
                let (sign, counterparty) = match tx.kind {
                    TransactionType::Transfer => ("-", tx.account_name.as_str()),
                    TransactionType::Credit => ("+", tx.bank_name.as_str()),
                };
                println!(
                    "{:<18} {:<8} {:>14}  {:<24} {}",
                    entry.relative_date,
                    tx.kind.to_string(),
                    format!("{}{}", sign, tx.amount.display_with_symbol()),
                    counterparty,
                    tx.reference_number
                );
            }
            Ok(())
        }
        Commands::Summary => {
            let summary = session.current_month_summary();
            let month = NaiveDate::from_ymd_opt(summary.year, summary.month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_default();
            println!("{}", month);
            println!("  Money in  : {}", summary.money_in.display_with_symbol());
            println!("  Money out : {}", summary.money_out.display_with_symbol());
            Ok(())
        }
        Commands::Receipt => {
            match session.current_receipt() {
                Some(tx) => println!("{}", Receipt(&tx)),
                None => println!("No completed transaction to show."),
            }
            Ok(())
        }
        Commands::Serve(args) => serve(args, global, simulator).await,
        Commands::Banks | Commands::Version => Ok(()),
    }
}

/// Runs one submission while echoing its processing message, then reports
/// validation failures field by field.
async fn submit<F, Fut>(simulator: &TransactionSimulator, send: F) -> Result<Transaction>
where
    F: FnOnce(TransactionSimulator) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<Transaction, SimulatorError>>,
{
    let events = simulator.subscribe();
    let result = with_progress(events, send(simulator.clone()), |line| println!("{}", line)).await;

    match result {
        Ok(tx) => Ok(tx),
        Err(SimulatorError::Invalid(errors)) => {
            for error in errors.iter() {
                eprintln!("  {}: {}", error.field(), error);
            }
            bail!("submission rejected")
        }
        Err(e) => Err(e.into()),
    }
}

/// Drives `send` to completion, passing each processing message to `echo`
/// as it arrives. Events still queued when `send` finishes are drained
/// before returning, so no message is lost to a fast submission.
async fn with_progress<Fut>(
    mut events: broadcast::Receiver<SimulatorEvent>,
    send: Fut,
    mut echo: impl FnMut(&'static str),
) -> Fut::Output
where
    Fut: std::future::Future,
{
    tokio::pin!(send);
    let result = loop {
        tokio::select! {
            biased;
            Ok(event) = events.recv() => {
                if let SimulatorEvent::Processing { message, .. } = event {
                    echo(message);
                }
            }
            result = &mut send => break result,
        }
    };

    while let Ok(event) = events.try_recv() {
        if let SimulatorEvent::Processing { message, .. } = event {
            echo(message);
        }
    }
    result
}

fn print_completed(tx: &Transaction, session: &Session) {
    println!();
    println!("{}", Receipt(tx));
    println!();
    println!("New balance: {}", session.balance().display_with_symbol());
}

/// Builds the directory source for `--banks-url`, or the default endpoint.
fn bank_source(global: &GlobalArgs) -> Box<dyn BankSource> {
    let mut config = DirectoryConfig::default();
    if let Some(url) = &global.banks_url {
        config.url = url.clone();
    }

    match HttpBankSource::new(config) {
        Ok(source) => Box::new(source),
        Err(e) => {
            tracing::warn!(error = %e, "could not build HTTP client for bank directory");
            Box::new(StaticBankSource::default())
        }
    }
}

/// Fetches and prints the bank directory.
async fn list_banks(global: &GlobalArgs) -> Result<()> {
    let list = load_banks(bank_source(global).as_ref()).await;
    if list.from_fallback {
        eprintln!("Bank directory unavailable, showing built-in list.");
    }
    for bank in &list.banks {
        println!("{:<8} {}", bank.code, bank.name);
    }
    Ok(())
}

/// Serves the HTTP API until SIGINT or SIGTERM.
///
/// `/api/banks` serves the built-in directory unless `--banks-url` points
/// at an upstream one, which is then fetched once at startup.
async fn serve(
    args: cli::ServeArgs,
    global: &GlobalArgs,
    simulator: TransactionSimulator,
) -> Result<()> {
    let metrics = Arc::new(AppMetrics::new().context("failed to create metrics registry")?);
    let session = Arc::clone(simulator.session());
    metrics.set_balance(session.balance());

    let banks = match &global.banks_url {
        Some(_) => {
            let list = load_banks(bank_source(global).as_ref()).await;
            if list.from_fallback {
                metrics.directory_fallbacks_total.inc();
            }
            list.banks
        }
        None => fallback_banks(),
    };

    let state = api::AppState {
        session,
        simulator,
        metrics,
        banks: Arc::new(banks),
    };
    let router = api::create_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", addr))?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("mockbank stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("mockbank {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}

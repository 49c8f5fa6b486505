//! # CLI Interface
//!
//! Defines the command-line argument structure for `mockbank` using
//! `clap` derive. Every subcommand opens the same on-disk ledger, so a
//! transfer made by one invocation is visible to the next.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mockbank_ledger::format::{format_phone_number, strip_separators};
use mockbank_ledger::transaction::{TopUpInput, TransferInput};

use crate::logging::LogFormat;

/// Mock mobile-banking ledger.
///
/// Keeps one user's naira balance and transaction history on disk and
/// simulates transfers and top-ups with a short processing delay. No real
/// money moves anywhere.
#[derive(Parser, Debug)]
#[command(
    name = "mockbank",
    about = "Mock banking ledger and transaction simulator",
    version,
    propagate_version = true
)]
pub struct MockbankCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding the ledger database. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "MOCKBANK_DATA_DIR",
        default_value = ".mockbank"
    )]
    pub data_dir: PathBuf,

    /// Endpoint serving the bank directory as a JSON array of `{name, code}`.
    #[arg(long, global = true, env = "MOCKBANK_BANKS_URL")]
    pub banks_url: Option<String>,

    /// Log output format: `pretty` or `json`.
    #[arg(
        long,
        global = true,
        env = "MOCKBANK_LOG_FORMAT",
        default_value = "pretty",
        value_enum,
        ignore_case = true
    )]
    pub log_format: LogFormat,

    /// Skip the simulated processing delays.
    #[arg(long, global = true)]
    pub fast: bool,
}

/// Top-level subcommands for the `mockbank` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the display name and current balance.
    Balance,
    /// Send money to a bank account.
    Transfer(TransferArgs),
    /// Add money to the wallet.
    TopUp(TopUpArgs),
    /// List past transactions, newest first.
    History(HistoryArgs),
    /// Money in and money out for the current month.
    Summary,
    /// List the banks a transfer can be sent to.
    Banks,
    /// Re-display the receipt of the last completed transaction.
    Receipt,
    /// Serve the ledger over HTTP.
    Serve(ServeArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `transfer` subcommand.
///
/// Fields are taken as typed; validation happens on submission, and every
/// problem is reported at once.
#[derive(Args, Debug, Clone)]
pub struct TransferArgs {
    /// Recipient's account name.
    #[arg(long, default_value = "")]
    pub account_name: String,

    /// Recipient's bank, as listed by `mockbank banks`.
    #[arg(long, default_value = "")]
    pub bank: String,

    /// Recipient's 10-digit account number. Spaces and dashes are ignored.
    #[arg(long, default_value = "")]
    pub account_number: String,

    /// Recipient's phone number. Optional.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Amount in naira, e.g. `1.00` or `1,250.50`.
    #[arg(long, default_value = "")]
    pub amount: String,

    /// Free-text note. Optional.
    #[arg(long, default_value = "")]
    pub narration: String,

    /// Transaction date as `YYYY-MM-DDTHH:MM`. Defaults to now.
    #[arg(long, default_value = "")]
    pub date: String,
}

/// Arguments for the `top-up` subcommand.
#[derive(Args, Debug, Clone)]
pub struct TopUpArgs {
    /// Amount in naira.
    #[arg(long)]
    pub amount: String,

    /// New display name for the account holder.
    #[arg(long)]
    pub name: Option<String>,

    /// Free-text note.
    #[arg(long)]
    pub narration: Option<String>,
}

impl From<TransferArgs> for TransferInput {
    fn from(args: TransferArgs) -> Self {
        Self {
            account_name: args.account_name,
            bank_name: args.bank,
            account_number: strip_separators(&args.account_number),
            phone_number: format_phone_number(&args.phone),
            amount: args.amount,
            narration: args.narration,
            transaction_date: args.date,
        }
    }
}

impl From<TopUpArgs> for TopUpInput {
    fn from(args: TopUpArgs) -> Self {
        Self {
            amount: args.amount,
            display_name: args.name,
            narration: args.narration,
        }
    }
}

/// Arguments for the `history` subcommand.
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Show at most this many entries.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "MOCKBANK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP API.
    #[arg(long, short = 'p', env = "MOCKBANK_PORT", default_value_t = 8080)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use clap::CommandFactory;
    use mockbank_ledger::transaction::{validate_transfer, ValidationError};
    use mockbank_ledger::Amount;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        MockbankCli::command().debug_assert();
    }

    #[test]
    fn parses_transfer_flags() {
        let cli = MockbankCli::try_parse_from([
            "mockbank",
            "--fast",
            "transfer",
            "--account-name",
            "John Doe",
            "--bank",
            "Access Bank",
            "--account-number",
            "1234567890",
            "--amount",
            "1.00",
        ])
        .unwrap();
        assert!(cli.global.fast);
        match cli.command {
            Commands::Transfer(args) => {
                assert_eq!(args.account_name, "John Doe");
                assert_eq!(args.amount, "1.00");
                assert_eq!(args.phone, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn transfer_with_account_number(account_number: &str) -> TransferInput {
        let cli = MockbankCli::try_parse_from([
            "mockbank",
            "transfer",
            "--account-name",
            "John Doe",
            "--bank",
            "Access Bank",
            "--account-number",
            account_number,
            "--amount",
            "1.00",
        ])
        .unwrap();
        match cli.command {
            Commands::Transfer(args) => args.into(),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn long_account_number_reaches_validation_untruncated() {
        let input = transfer_with_account_number("123456789012");
        assert_eq!(input.account_number, "123456789012");

        let errs = validate_transfer(&input, Amount::from_kobo(320), Local::now().naive_local())
            .unwrap_err();
        assert!(errs.any(|e| *e == ValidationError::InvalidAccountNumber));
    }

    #[test]
    fn separated_account_number_is_accepted() {
        let input = transfer_with_account_number("0123 456-789");
        assert_eq!(input.account_number, "0123456789");
        assert!(
            validate_transfer(&input, Amount::from_kobo(320), Local::now().naive_local()).is_ok()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = MockbankCli::try_parse_from([
            "mockbank",
            "balance",
            "--data-dir",
            "/tmp/mb",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.global.data_dir, PathBuf::from("/tmp/mb"));
        assert_eq!(cli.global.log_format, LogFormat::Json);
    }
}

// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MockBank Ledger
//!
//! Client-side ledger and transaction simulator for a mock mobile banking
//! app. One user, one naira balance, a newest-first list of transactions,
//! and a pretend payment backend that "processes" each submission for a
//! few seconds before it lands.
//!
//! Nothing here talks to a real bank. Money only moves inside the ledger.
//!
//! ## Architecture
//!
//! - **config**: defaults, storage keys, delays, and display constants.
//! - **transaction**: the record type, amounts in kobo, form validation.
//! - **state**: the [`Ledger`] and how it is loaded from and saved to a store.
//! - **storage**: the key/value store seam, in memory or on disk (sled).
//! - **session**: the one shared ledger context a binary builds at startup.
//! - **simulator**: validates, delays, applies, persists, and reports.
//! - **views**: monthly summary, history listing, receipt text.
//! - **directory**: the recipient bank list, fetched with a fixed fallback.
//! - **format**: as-you-type cleanup for account and phone numbers.
//!
//! ## Ground Rules
//!
//! 1. The balance is never negative. An overdraft is rejected before any
//!    delay starts.
//! 2. Every applied transaction is persisted, and the balance always equals
//!    the sum of credits minus the sum of transfers applied on top of the
//!    starting balance.
//! 3. Amounts are integer kobo. Floating point only appears at the JSON edge.

pub mod config;
pub mod directory;
pub mod format;
pub mod session;
pub mod simulator;
pub mod state;
pub mod storage;
pub mod transaction;
pub mod views;

pub use directory::{load_banks, Bank, BankList, BankSource, HttpBankSource, StaticBankSource};
pub use session::Session;
pub use simulator::{Command, SimulatorConfig, SimulatorError, SimulatorEvent, TransactionSimulator};
pub use state::{Ledger, LedgerError};
pub use storage::{KeyValueStore, MemoryStore, SledStore};
pub use transaction::{Amount, Transaction, TransactionStatus, TransactionType};

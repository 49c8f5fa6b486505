//! # Ledger State
//!
//! The single authoritative in-memory copy of one user's balance, display
//! name, and transaction history, plus its mapping onto local storage.
//!
//! ## Storage Layout
//!
//! | Key                  | Value                                   |
//! |----------------------|-----------------------------------------|
//! | `balance`            | decimal string, two places (`"3.20"`)   |
//! | `userName`           | display string                          |
//! | `transactions`       | JSON array of records, newest first     |
//! | `currentTransaction` | JSON of the last completed record       |
//!
//! ## Invariants
//!
//! - `transactions` is prepend-only. Nothing in this crate edits or removes
//!   a record once it has been applied.
//! - Each applied record moves the balance by exactly its amount: down for
//!   a transfer, up for a credit.
//! - The balance never goes below zero. [`Ledger::apply`] refuses a debit
//!   the balance cannot cover.
//!
//! Loading never fails. Absent keys and unreadable values fall back to the
//! defaults in [`crate::config`]; the problem is logged and otherwise
//! swallowed.

use serde::Serialize;
use thiserror::Error;

use crate::config::{
    DEFAULT_BALANCE_KOBO, DEFAULT_USER_NAME, KEY_BALANCE, KEY_CURRENT_TRANSACTION,
    KEY_TRANSACTIONS, KEY_USER_NAME,
};
use crate::storage::{KeyValueStore, StorageResult};
use crate::transaction::{Amount, Transaction, TransactionType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised when a record cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A transfer larger than the balance reached the ledger.
    #[error("debit of {amount} exceeds balance {balance}")]
    Overdraft { balance: Amount, amount: Amount },

    /// A credit would overflow the balance counter.
    #[error("credit of {amount} overflows balance {balance}")]
    Overflow { balance: Amount, amount: Amount },
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Balance, display name, and history for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    balance: Amount,
    user_name: String,
    transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            balance: Amount::from_kobo(DEFAULT_BALANCE_KOBO),
            user_name: DEFAULT_USER_NAME.to_string(),
            transactions: Vec::new(),
        }
    }
}

impl Ledger {
    /// Builds a ledger with an explicit opening state.
    pub fn new(balance: Amount, user_name: impl Into<String>) -> Self {
        Self {
            balance,
            user_name: user_name.into(),
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// History, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The most recently applied record.
    pub fn latest(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Returns `true` if any record already carries `reference`.
    pub fn has_reference(&self, reference: &str) -> bool {
        self.transactions
            .iter()
            .any(|tx| tx.reference_number == reference)
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.user_name = name.into();
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Moves the balance by the record's amount and prepends the record.
    ///
    /// This only touches memory; call [`Ledger::save`] to persist. On error
    /// the ledger is left exactly as it was.
    pub fn apply(&mut self, record: Transaction) -> Result<Amount, LedgerError> {
        let amount = record.amount;
        let balance = self.balance;
        let updated = match record.kind {
            TransactionType::Transfer => balance
                .checked_sub(amount)
                .ok_or(LedgerError::Overdraft { balance, amount })?,
            TransactionType::Credit => balance
                .checked_add(amount)
                .ok_or(LedgerError::Overflow { balance, amount })?,
        };

        self.balance = updated;
        self.transactions.insert(0, record);
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Rehydrates a ledger from `store`, substituting defaults for anything
    /// absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let balance = match read_key(store, KEY_BALANCE) {
            Some(raw) => Amount::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "stored balance is malformed, using default");
                defaults.balance
            }),
            None => defaults.balance,
        };

        let user_name = read_key(store, KEY_USER_NAME)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.user_name);

        let transactions = match read_key(store, KEY_TRANSACTIONS) {
            Some(raw) => serde_json::from_str::<Vec<Transaction>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored transactions are malformed, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        tracing::debug!(
            balance = %balance,
            user = %user_name,
            transactions = transactions.len(),
            "ledger loaded"
        );

        Self {
            balance,
            user_name,
            transactions,
        }
    }

    /// Writes balance, display name, and history to `store`.
    ///
    /// The three keys are written one after another; there is a single
    /// writer per store, so nobody can observe the gap.
    pub fn save(&self, store: &dyn KeyValueStore) -> StorageResult<()> {
        let transactions = serde_json::to_string(&self.transactions)?;
        store.set(KEY_BALANCE, &self.balance.to_string())?;
        store.set(KEY_USER_NAME, &self.user_name)?;
        store.set(KEY_TRANSACTIONS, &transactions)?;
        Ok(())
    }

    /// Persists `record` as the receipt to re-display.
    pub fn save_current_transaction(
        store: &dyn KeyValueStore,
        record: &Transaction,
    ) -> StorageResult<()> {
        let json = serde_json::to_string(record)?;
        store.set(KEY_CURRENT_TRANSACTION, &json)
    }

    /// Reads back the last receipt, if one is stored and readable.
    pub fn load_current_transaction(store: &dyn KeyValueStore) -> Option<Transaction> {
        let raw = read_key(store, KEY_CURRENT_TRANSACTION)?;
        serde_json::from_str(&raw)
            .map_err(|e| tracing::warn!(error = %e, "stored receipt is malformed"))
            .ok()
    }
}

/// Reads a key, treating backend errors like an absent key.
fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read from storage");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::transaction::{generate_id, generate_reference_number, TransactionStatus};
    use chrono::{TimeZone, Utc};

    fn record(kind: TransactionType, kobo: u64) -> Transaction {
        Transaction {
            id: generate_id(),
            account_name: "John Doe".into(),
            bank_name: "Access Bank".into(),
            account_number: "1234567890".into(),
            phone_number: String::new(),
            amount: Amount::from_kobo(kobo),
            narration: String::new(),
            transaction_date: "2026-10-19T09:30".into(),
            reference_number: generate_reference_number(Utc::now()),
            status: TransactionStatus::Successful,
            kind,
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn defaults_when_store_is_empty() {
        let ledger = Ledger::load(&MemoryStore::new());
        assert_eq!(ledger.balance(), Amount::from_kobo(320));
        assert_eq!(ledger.user_name(), "BABATUNDE");
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let store = MemoryStore::with_entries([
            (KEY_BALANCE, "lots"),
            (KEY_USER_NAME, ""),
            (KEY_TRANSACTIONS, "[{not json"),
        ]);
        assert_eq!(Ledger::load(&store), Ledger::default());
    }

    #[test]
    fn negative_balance_is_treated_as_malformed() {
        let store = MemoryStore::with_entries([(KEY_BALANCE, "-4.00")]);
        assert_eq!(Ledger::load(&store).balance(), Amount::from_kobo(320));
    }

    #[test]
    fn zero_balance_is_kept() {
        let store = MemoryStore::with_entries([(KEY_BALANCE, "0")]);
        assert!(Ledger::load(&store).balance().is_zero());
    }

    #[test]
    fn legacy_float_balance_is_read() {
        let store = MemoryStore::with_entries([(KEY_BALANCE, "2.2")]);
        assert_eq!(Ledger::load(&store).balance(), Amount::from_kobo(220));
    }

    #[test]
    fn apply_transfer_debits_and_prepends() {
        let mut ledger = Ledger::default();
        let first = record(TransactionType::Credit, 1_000);
        let second = record(TransactionType::Transfer, 120);
        let second_id = second.id.clone();

        assert_eq!(ledger.apply(first).unwrap(), Amount::from_kobo(1_320));
        assert_eq!(ledger.apply(second).unwrap(), Amount::from_kobo(1_200));
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.latest().unwrap().id, second_id);
    }

    #[test]
    fn apply_refuses_overdraft_and_leaves_state() {
        let mut ledger = Ledger::new(Amount::from_kobo(1_000), "ADA");
        let before = ledger.clone();
        let err = ledger
            .apply(record(TransactionType::Transfer, 1_500))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Overdraft { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn save_then_load_is_identity() {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new(Amount::from_kobo(5_000), "ADA");
        ledger.apply(record(TransactionType::Transfer, 250)).unwrap();
        ledger.apply(record(TransactionType::Credit, 75)).unwrap();
        ledger.save(&store).unwrap();

        assert_eq!(store.get(KEY_BALANCE).unwrap().as_deref(), Some("48.25"));
        assert_eq!(Ledger::load(&store), ledger);
    }

    #[test]
    fn current_transaction_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(Ledger::load_current_transaction(&store), None);

        let tx = record(TransactionType::Transfer, 100);
        Ledger::save_current_transaction(&store, &tx).unwrap();
        let loaded = Ledger::load_current_transaction(&store).unwrap();
        assert_eq!(loaded.id, tx.id);
        assert_eq!(loaded.reference_number, tx.reference_number);
    }

    #[test]
    fn reference_lookup() {
        let mut ledger = Ledger::default();
        let tx = record(TransactionType::Credit, 100);
        let reference = tx.reference_number.clone();
        ledger.apply(tx).unwrap();
        assert!(ledger.has_reference(&reference));
        assert!(!ledger.has_reference("TXN00000000ZZZZ"));
    }
}

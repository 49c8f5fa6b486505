//! # Session
//!
//! The application's top-level context: one [`Ledger`] and the store it is
//! persisted to. A binary builds exactly one `Session` at startup and
//! shares it (by reference or `Arc`) with whatever needs ledger state.
//! There is no global instance.
//!
//! Reads take a short-lived read lock and return owned snapshots, so no
//! caller ever holds the lock across an await point.

use chrono::{Local, NaiveDate, NaiveDateTime};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::state::{Ledger, LedgerError};
use crate::storage::KeyValueStore;
use crate::transaction::{check_amount, Amount, Transaction, ValidationError};
use crate::views::{self, HistoryEntry, MonthlySummary};

pub struct Session {
    store: Arc<dyn KeyValueStore>,
    ledger: RwLock<Ledger>,
    /// Serializes commits so snapshots reach the store in apply order.
    persist: Mutex<()>,
}

impl Session {
    /// Loads the ledger persisted in `store`, or a fresh default one.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let ledger = Ledger::load(store.as_ref());
        Self {
            store,
            ledger: RwLock::new(ledger),
            persist: Mutex::new(()),
        }
    }

    /// A copy of the whole ledger as it stands.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.read().clone()
    }

    pub fn balance(&self) -> Amount {
        self.ledger.read().balance()
    }

    pub fn user_name(&self) -> String {
        self.ledger.read().user_name().to_string()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.ledger.read().transactions().to_vec()
    }

    pub fn has_reference(&self, reference: &str) -> bool {
        self.ledger.read().has_reference(reference)
    }

    /// The per-keystroke funds check against the current balance.
    pub fn check_amount(&self, raw: &str) -> Result<(), ValidationError> {
        check_amount(raw, self.balance())
    }

    /// Money in / money out for the month containing `today`.
    pub fn monthly_summary(&self, today: NaiveDate) -> MonthlySummary {
        views::monthly_summary(self.ledger.read().transactions(), today)
    }

    /// Money in / money out for the current local month.
    pub fn current_month_summary(&self) -> MonthlySummary {
        self.monthly_summary(Local::now().date_naive())
    }

    /// The history listing with dates relative to `now`.
    pub fn history(&self, now: NaiveDateTime) -> Vec<HistoryEntry> {
        views::history(self.ledger.read().transactions(), now)
    }

    /// The last completed transaction, for receipt re-display.
    pub fn current_receipt(&self) -> Option<Transaction> {
        Ledger::load_current_transaction(self.store.as_ref())
    }

    /// Applies `record`, optionally renames the user, then persists the
    /// ledger and the receipt.
    ///
    /// The in-memory ledger is authoritative: a failed write is logged and
    /// the mutation stands. The store is written from a snapshot after the
    /// write lock is released, so readers never wait on a disk flush.
    pub(crate) fn commit(
        &self,
        record: &Transaction,
        user_name: Option<&str>,
    ) -> Result<Amount, LedgerError> {
        let _persist = self.persist.lock();
        let (snapshot, balance) = {
            let mut ledger = self.ledger.write();
            let balance = ledger.apply(record.clone())?;
            if let Some(name) = user_name {
                ledger.set_user_name(name);
            }
            (ledger.clone(), balance)
        };

        if let Err(e) = snapshot.save(self.store.as_ref()) {
            tracing::error!(error = %e, reference = %record.reference_number, "failed to persist ledger");
        }
        if let Err(e) = Ledger::save_current_transaction(self.store.as_ref(), record) {
            tracing::error!(error = %e, reference = %record.reference_number, "failed to persist receipt");
        }

        Ok(balance)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ledger", &*self.ledger.read())
            .finish_non_exhaustive()
    }
}

//! # Transaction Simulator
//!
//! Stands in for a payment backend. A submission is validated against the
//! session's ledger, then "processes" for a fixed delay, then is applied,
//! persisted, and reported.
//!
//! ## Protocol
//!
//! ```text
//! submit ──► single-flight guard ──► validate ──► Processing event
//!                │ busy                  │ invalid
//!                ▼                       ▼
//!         SimulatorError::Busy   SimulatorError::Invalid
//!
//!   sleep(delay) ──► build record ──► apply + persist ──► Completed event
//!                                                          │ top-up only
//!                                                          ▼
//!                                    sleep(return delay) ──► ReturnToSummary
//! ```
//!
//! ## Non-properties
//!
//! - There is no failure path after validation. A transfer that passes
//!   validation always succeeds; this is a simulation shortcut, not a
//!   guarantee about money.
//! - Once validation passes, the rest runs on its own task. Dropping the
//!   future returned by `submit_*` does not cancel the transaction.
//! - Only one submission may be in flight per simulator. A second one is
//!   rejected immediately rather than queued.

use chrono::{Local, SubsecRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};

use crate::config::{
    TOP_UP_BANK_NAME, TOP_UP_DELAY, TOP_UP_PROCESSING_MESSAGE, TOP_UP_RETURN_DELAY,
    TRANSACTION_DATE_FORMAT, TRANSFER_DELAY, TRANSFER_PROCESSING_MESSAGE,
};
use crate::session::Session;
use crate::state::LedgerError;
use crate::transaction::{
    generate_id, generate_reference_number, validate_top_up, validate_transfer, TopUpInput,
    TopUpRequest, Transaction, TransactionStatus, TransactionType, TransferInput,
    TransferRequest, ValidationErrors,
};

/// Capacity of the event channel. Events are small and consumers are
/// expected to keep up; a lagging receiver simply misses old events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Simulated processing delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub transfer_delay: Duration,
    pub top_up_delay: Duration,
    /// Pause between a completed top-up and the return-to-summary signal.
    pub top_up_return_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            transfer_delay: TRANSFER_DELAY,
            top_up_delay: TOP_UP_DELAY,
            top_up_return_delay: TOP_UP_RETURN_DELAY,
        }
    }
}

impl SimulatorConfig {
    /// No delays at all. For scripting and tests.
    pub fn instant() -> Self {
        Self {
            transfer_delay: Duration::ZERO,
            top_up_delay: Duration::ZERO,
            top_up_return_delay: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands, Events, Errors
// ---------------------------------------------------------------------------

/// A user action for the simulator to enact.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Transfer(TransferInput),
    TopUp(TopUpInput),
}

/// Progress notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorEvent {
    /// Validation passed; show a blocking loading indicator.
    Processing {
        kind: TransactionType,
        message: &'static str,
    },
    /// The transaction was applied and persisted; show the receipt.
    Completed(Transaction),
    /// Navigate back to the summary view (after top-ups).
    ReturnToSummary,
}

/// Why a submission was not enacted.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error("another transaction is still processing")]
    Busy,

    #[error("ledger rejected transaction: {0}")]
    Ledger(#[from] LedgerError),

    #[error("processing task did not finish: {0}")]
    Interrupted(String),
}

// ---------------------------------------------------------------------------
// TransactionSimulator
// ---------------------------------------------------------------------------

/// Validates and enacts transfers and top-ups against a [`Session`].
///
/// Cheap to clone; clones share the session, the in-flight guard, and the
/// event channel.
#[derive(Clone)]
pub struct TransactionSimulator {
    session: Arc<Session>,
    config: SimulatorConfig,
    in_flight: Arc<Mutex<()>>,
    events: broadcast::Sender<SimulatorEvent>,
}

impl TransactionSimulator {
    pub fn new(session: Arc<Session>, config: SimulatorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session,
            config,
            in_flight: Arc::new(Mutex::new(())),
            events,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> SimulatorConfig {
        self.config
    }

    /// Subscribes to progress events. Only events sent after this call are
    /// received.
    pub fn subscribe(&self) -> broadcast::Receiver<SimulatorEvent> {
        self.events.subscribe()
    }

    /// Returns `true` while a submission is being processed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Routes a command to the matching submission.
    pub async fn dispatch(&self, command: Command) -> Result<Transaction, SimulatorError> {
        match command {
            Command::Transfer(input) => self.submit_transfer(input).await,
            Command::TopUp(input) => self.submit_top_up(input).await,
        }
    }

    /// Validates a transfer, waits out the transfer delay, then debits the
    /// ledger and records it.
    pub async fn submit_transfer(&self, input: TransferInput) -> Result<Transaction, SimulatorError> {
        let guard = self.acquire()?;
        let request = validate_transfer(&input, self.session.balance(), Local::now().naive_local())
            .map_err(|errors| {
                tracing::info!(%errors, "transfer rejected");
                errors
            })?;

        tracing::info!(
            amount = %request.amount,
            bank = %request.bank_name,
            account = %request.account_number,
            "transfer accepted, processing"
        );
        self.emit(SimulatorEvent::Processing {
            kind: TransactionType::Transfer,
            message: TRANSFER_PROCESSING_MESSAGE,
        });

        let this = self.clone();
        self.run_detached(async move { this.enact_transfer(request, guard).await })
            .await
    }

    /// Validates a top-up, waits out the top-up delay, then credits the
    /// ledger, records it, and finally signals a return to the summary.
    pub async fn submit_top_up(&self, input: TopUpInput) -> Result<Transaction, SimulatorError> {
        let guard = self.acquire()?;
        let request = validate_top_up(&input).map_err(|errors| {
            tracing::info!(%errors, "top-up rejected");
            errors
        })?;

        tracing::info!(amount = %request.amount, "top-up accepted, processing");
        self.emit(SimulatorEvent::Processing {
            kind: TransactionType::Credit,
            message: TOP_UP_PROCESSING_MESSAGE,
        });

        let this = self.clone();
        self.run_detached(async move { this.enact_top_up(request, guard).await })
            .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn acquire(&self) -> Result<OwnedMutexGuard<()>, SimulatorError> {
        Arc::clone(&self.in_flight)
            .try_lock_owned()
            .map_err(|_| SimulatorError::Busy)
    }

    fn emit(&self, event: SimulatorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Runs the post-validation half on its own task so it completes even if
    /// the caller stops waiting.
    async fn run_detached<F>(&self, work: F) -> Result<Transaction, SimulatorError>
    where
        F: std::future::Future<Output = Result<Transaction, SimulatorError>> + Send + 'static,
    {
        tokio::spawn(work)
            .await
            .map_err(|e| SimulatorError::Interrupted(e.to_string()))?
    }

    async fn enact_transfer(
        &self,
        request: TransferRequest,
        _guard: OwnedMutexGuard<()>,
    ) -> Result<Transaction, SimulatorError> {
        tokio::time::sleep(self.config.transfer_delay).await;

        let record = self.new_record(TransactionType::Transfer, |tx| {
            tx.account_name = request.account_name;
            tx.bank_name = request.bank_name;
            tx.account_number = request.account_number;
            tx.phone_number = request.phone_number;
            tx.amount = request.amount;
            tx.narration = request.narration;
            tx.transaction_date = request.transaction_date;
        });

        let balance = self.session.commit(&record, None)?;
        tracing::info!(
            reference = %record.reference_number,
            amount = %record.amount,
            balance = %balance,
            "transfer completed"
        );
        self.emit(SimulatorEvent::Completed(record.clone()));
        Ok(record)
    }

    async fn enact_top_up(
        &self,
        request: TopUpRequest,
        _guard: OwnedMutexGuard<()>,
    ) -> Result<Transaction, SimulatorError> {
        tokio::time::sleep(self.config.top_up_delay).await;

        let holder = request
            .display_name
            .clone()
            .unwrap_or_else(|| self.session.user_name());
        let record = self.new_record(TransactionType::Credit, |tx| {
            tx.account_name = holder;
            tx.bank_name = TOP_UP_BANK_NAME.to_string();
            tx.amount = request.amount;
            tx.narration = request.narration;
        });

        let balance = self
            .session
            .commit(&record, request.display_name.as_deref())?;
        tracing::info!(
            reference = %record.reference_number,
            amount = %record.amount,
            balance = %balance,
            "top-up completed"
        );
        self.emit(SimulatorEvent::Completed(record.clone()));

        tokio::time::sleep(self.config.top_up_return_delay).await;
        self.emit(SimulatorEvent::ReturnToSummary);
        Ok(record)
    }

    /// Builds a record stamped with fresh identifiers and the current time,
    /// then lets `fill` set the form-specific fields.
    fn new_record(&self, kind: TransactionType, fill: impl FnOnce(&mut Transaction)) -> Transaction {
        let now = Utc::now().trunc_subsecs(3);
        let mut reference = generate_reference_number(now);
        while self.session.has_reference(&reference) {
            reference = generate_reference_number(now);
        }

        let mut record = Transaction {
            id: generate_id(),
            account_name: String::new(),
            bank_name: String::new(),
            account_number: String::new(),
            phone_number: String::new(),
            amount: Default::default(),
            narration: String::new(),
            transaction_date: Local::now().format(TRANSACTION_DATE_FORMAT).to_string(),
            reference_number: reference,
            status: TransactionStatus::Successful,
            kind,
            created_at: now,
        };
        fill(&mut record);
        record
    }
}

impl std::fmt::Debug for TransactionSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSimulator")
            .field("config", &self.config)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

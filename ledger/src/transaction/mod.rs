//! # Transaction Module
//!
//! Records, value types, and input validation for simulated transfers and
//! top-ups.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      : TransactionType, TransactionStatus, Amount (integer kobo)
//! record.rs     : The persisted Transaction record, ids, reference numbers
//! validation.rs : Raw form inputs, validation rules, typed requests
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Input**: the presentation layer collects a [`TransferInput`] or
//!    [`TopUpInput`] exactly as typed.
//! 2. **Validate**: [`validate_transfer`] / [`validate_top_up`] produce a
//!    typed request or [`ValidationErrors`].
//! 3. **Enact**: the simulator waits out its processing delay, then builds
//!    a [`Transaction`] and applies it to the ledger.
//!
//! Records are immutable once created. The ledger only ever prepends them.

pub mod record;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) use record::is_reference_number;
pub use record::{generate_id, generate_reference_number, Transaction};
pub use types::{Amount, AmountParseError, TransactionStatus, TransactionType};
pub use validation::{
    check_amount, validate_top_up, validate_transfer, Field, TopUpInput, TopUpRequest,
    TransferInput, TransferRequest, ValidationError, ValidationErrors,
};

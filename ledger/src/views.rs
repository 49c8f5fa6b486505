//! Read-only projections over the transaction history.
//!
//! Nothing here mutates the ledger. The "current" month and the reference
//! point for relative dates are passed in, so the projections are pure and
//! tests can pin the clock.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::transaction::{Amount, Transaction, TransactionType};

// ---------------------------------------------------------------------------
// Monthly Summary
// ---------------------------------------------------------------------------

/// Money in and money out for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// Sum of credit amounts.
    pub money_in: Amount,
    /// Sum of transfer amounts.
    pub money_out: Amount,
}

/// Totals credits and transfers whose transaction date falls in the same
/// month and year as `today`.
///
/// Records with an unparseable transaction date are left out.
pub fn monthly_summary(transactions: &[Transaction], today: NaiveDate) -> MonthlySummary {
    let in_month = |tx: &&Transaction| {
        tx.transaction_datetime()
            .map(|dt| dt.year() == today.year() && dt.month() == today.month())
            .unwrap_or(false)
    };

    let total = |kind: TransactionType| -> Amount {
        transactions
            .iter()
            .filter(|tx| in_month(tx))
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.amount)
            .sum()
    };

    MonthlySummary {
        year: today.year(),
        month: today.month(),
        money_in: total(TransactionType::Credit),
        money_out: total(TransactionType::Transfer),
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One line of the history listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    /// e.g. "Today, 09:30", "Yesterday, 18:02", "3 days ago", "Sep 1, 2026".
    pub relative_date: String,
}

/// Lists every transaction in stored order (newest first), each labelled
/// with a date relative to `now`.
pub fn history(transactions: &[Transaction], now: NaiveDateTime) -> Vec<HistoryEntry> {
    transactions
        .iter()
        .map(|tx| HistoryEntry {
            transaction: tx.clone(),
            relative_date: relative_date(&tx.transaction_date, now),
        })
        .collect()
}

/// Renders a stored transaction date relative to `now`.
///
/// Unparseable dates are echoed back unchanged.
pub fn relative_date(raw: &str, now: NaiveDateTime) -> String {
    let Some(when) = crate::transaction::record::parse_local_datetime(raw) else {
        return raw.to_string();
    };

    let days = (now.date() - when.date()).num_days();
    match days {
        0 => format!("Today, {}", when.format("%H:%M")),
        1 => format!("Yesterday, {}", when.format("%H:%M")),
        2..=6 => format!("{} days ago", days),
        _ => when.format("%b %-d, %Y").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// Printable receipt for a completed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a>(pub &'a Transaction);

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = self.0;
        let sign = match tx.kind {
            TransactionType::Transfer => "-",
            TransactionType::Credit => "+",
        };
        writeln!(f, "{} {}", tx.kind, tx.status)?;
        writeln!(f, "  Amount      : {}{}", sign, tx.amount.display_with_symbol())?;
        writeln!(f, "  Reference   : {}", tx.reference_number)?;
        writeln!(f, "  Date        : {}", tx.transaction_date)?;
        writeln!(f, "  Name        : {}", tx.account_name)?;
        writeln!(f, "  Bank        : {}", tx.bank_name)?;
        if !tx.account_number.is_empty() {
            writeln!(f, "  Account No. : {}", tx.account_number)?;
        }
        if !tx.phone_number.is_empty() {
            writeln!(f, "  Phone       : {}", tx.phone_number)?;
        }
        if !tx.narration.is_empty() {
            writeln!(f, "  Narration   : {}", tx.narration)?;
        }
        write!(f, "  Session ID  : {}", tx.id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

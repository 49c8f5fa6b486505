//! # Ledger Configuration & Constants
//!
//! Every magic number in MockBank lives here: the defaults a fresh ledger
//! starts from, the local-storage keys it persists under, the simulated
//! processing delays, and the bank directory endpoint.
//!
//! The storage keys and the reference-number shape are part of the persisted
//! data format. Changing them orphans every ledger saved by an older build.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Ledger Defaults
// ---------------------------------------------------------------------------

/// Opening balance of a ledger with nothing persisted, in kobo (₦3.20).
pub const DEFAULT_BALANCE_KOBO: u64 = 320;

/// Display name of a ledger with nothing persisted.
pub const DEFAULT_USER_NAME: &str = "BABATUNDE";

/// Currency sign used when rendering amounts for display.
pub const CURRENCY_SYMBOL: &str = "₦";

/// Minor units per major unit. Balances are integers in kobo.
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

// ---------------------------------------------------------------------------
// Storage Keys
// ---------------------------------------------------------------------------

/// Decimal string, e.g. `"3.20"`.
pub const KEY_BALANCE: &str = "balance";

/// Plain display string.
pub const KEY_USER_NAME: &str = "userName";

/// JSON array of transactions, newest first.
pub const KEY_TRANSACTIONS: &str = "transactions";

/// JSON of the last completed transaction, kept for receipt re-display.
pub const KEY_CURRENT_TRANSACTION: &str = "currentTransaction";

// ---------------------------------------------------------------------------
// Simulated Processing
// ---------------------------------------------------------------------------

/// How long a transfer "processes" before it is applied.
pub const TRANSFER_DELAY: Duration = Duration::from_millis(3_000);

/// How long a top-up "processes" before it is applied.
pub const TOP_UP_DELAY: Duration = Duration::from_millis(2_000);

/// Pause after a completed top-up before the UI returns to the summary view.
pub const TOP_UP_RETURN_DELAY: Duration = Duration::from_millis(1_000);

/// Loading-indicator text shown while a transfer is pending.
pub const TRANSFER_PROCESSING_MESSAGE: &str = "Processing Transaction...";

/// Loading-indicator text shown while a top-up is pending.
pub const TOP_UP_PROCESSING_MESSAGE: &str = "Processing Top-up...";

// ---------------------------------------------------------------------------
// Transaction Records
// ---------------------------------------------------------------------------

/// Every reference number starts with this.
pub const REFERENCE_PREFIX: &str = "TXN";

/// Number of clock digits following the prefix.
pub const REFERENCE_DIGITS: usize = 8;

/// Number of random uppercase alphanumerics closing the reference.
pub const REFERENCE_SUFFIX_LEN: usize = 4;

/// Length of a valid recipient account number (NUBAN).
pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

/// Maximum digits kept by the phone-number formatter.
pub const PHONE_NUMBER_MAX_DIGITS: usize = 11;

/// Bank name stamped on credit records; top-ups have no counterparty bank.
pub const TOP_UP_BANK_NAME: &str = "Wallet Top-up";

/// Narration used on credit records when the user gives none.
pub const TOP_UP_DEFAULT_NARRATION: &str = "Account top-up";

/// `datetime-local` layout used for user-facing transaction dates.
pub const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ---------------------------------------------------------------------------
// Bank Directory
// ---------------------------------------------------------------------------

/// Default endpoint the bank directory is fetched from.
pub const DEFAULT_BANKS_URL: &str = "http://127.0.0.1:8080/api/banks";

/// Give up on the directory fetch after this long and use the fallback list.
pub const BANKS_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_balance_is_three_twenty() {
        assert_eq!(DEFAULT_BALANCE_KOBO / MINOR_UNITS_PER_MAJOR, 3);
        assert_eq!(DEFAULT_BALANCE_KOBO % MINOR_UNITS_PER_MAJOR, 20);
    }

    #[test]
    fn delays_keep_observed_ordering() {
        // Transfers take longer than top-ups, and the return pause is the shortest.
        assert!(TRANSFER_DELAY > TOP_UP_DELAY);
        assert!(TOP_UP_DELAY > TOP_UP_RETURN_DELAY);
    }

    #[test]
    fn storage_keys_are_distinct() {
        let keys = [
            KEY_BALANCE,
            KEY_USER_NAME,
            KEY_TRANSACTIONS,
            KEY_CURRENT_TRANSACTION,
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

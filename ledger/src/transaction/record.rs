//! The persisted transaction record and its identifiers.
//!
//! Field names serialize in camelCase so that a record round-trips through
//! the `transactions` storage key unchanged:
//!
//! ```json
//! {
//!   "id": "6f1c...", "accountName": "John Doe", "bankName": "Access Bank",
//!   "accountNumber": "1234567890", "phoneNumber": "0803-123-4567",
//!   "amount": 1.0, "narration": "rent", "transactionDate": "2026-10-19T09:30",
//!   "referenceNumber": "TXN12345678AB3Z", "status": "Successful",
//!   "type": "Transfer", "createdAt": "2026-10-19T08:30:00.000Z"
//! }
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{Amount, TransactionStatus, TransactionType};
use crate::config::{REFERENCE_DIGITS, REFERENCE_PREFIX, REFERENCE_SUFFIX_LEN};

/// Alphabet for the random tail of a reference number.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A completed, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Internal record id.
    pub id: String,
    /// Recipient name for transfers; the account holder for top-ups.
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub phone_number: String,
    pub amount: Amount,
    #[serde(default)]
    pub narration: String,
    /// Local timestamp as the user entered it (`YYYY-MM-DDTHH:MM`).
    #[serde(default)]
    pub transaction_date: String,
    /// Identifier shown to the user on the receipt.
    pub reference_number: String,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "js_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect of this record on the balance, in kobo.
    pub fn balance_delta(&self) -> i128 {
        let kobo = i128::from(self.amount.kobo());
        match self.kind {
            TransactionType::Transfer => -kobo,
            TransactionType::Credit => kobo,
        }
    }

    /// Parses `transaction_date` as a local date-time.
    ///
    /// Accepts the `datetime-local` layout with or without seconds, a full
    /// RFC 3339 timestamp, or a bare date. Returns `None` for anything else.
    pub fn transaction_datetime(&self) -> Option<NaiveDateTime> {
        parse_local_datetime(&self.transaction_date)
    }
}

/// Parses the timestamp layouts a transaction date may be stored in.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for layout in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Generates a fresh record id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generates a reference number: `TXN`, the last eight digits of the
/// millisecond clock, and four random uppercase alphanumerics.
pub fn generate_reference_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().unsigned_abs();
    let digits = millis % 10u64.pow(REFERENCE_DIGITS as u32);

    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();

    format!(
        "{}{:0width$}{}",
        REFERENCE_PREFIX,
        digits,
        suffix,
        width = REFERENCE_DIGITS
    )
}

/// Returns `true` if `reference` has the `TXN` + 8 digits + 4 alphanumerics shape.
#[cfg(test)]
pub(crate) fn is_reference_number(reference: &str) -> bool {
    let Some(rest) = reference.strip_prefix(REFERENCE_PREFIX) else {
        return false;
    };
    rest.is_ascii()
        && rest.len() == REFERENCE_DIGITS + REFERENCE_SUFFIX_LEN
        && rest[..REFERENCE_DIGITS].bytes().all(|b| b.is_ascii_digit())
        && rest[REFERENCE_DIGITS..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// `createdAt` uses JavaScript's `toISOString()` layout: millisecond
/// precision with a `Z` suffix.
mod js_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    fn sample() -> Transaction {
        Transaction {
            id: generate_id(),
            account_name: "John Doe".into(),
            bank_name: "Access Bank".into(),
            account_number: "1234567890".into(),
            phone_number: "0803-123-4567".into(),
            amount: Amount::from_kobo(100),
            narration: "lunch".into(),
            transaction_date: "2026-10-19T09:30".into(),
            reference_number: generate_reference_number(Utc::now()),
            status: TransactionStatus::Successful,
            kind: TransactionType::Transfer,
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn reference_number_shape() {
        let now = Utc.timestamp_millis_opt(1_760_000_123_456).unwrap();
        let reference = generate_reference_number(now);
        assert!(is_reference_number(&reference), "bad reference {reference}");
        assert!(reference.starts_with("TXN00123456"));
        assert_eq!(reference.len(), 15);
    }

    #[test]
    fn reference_shape_check_rejects_lowercase_and_short() {
        assert!(!is_reference_number("TXN12345678abcd"));
        assert!(!is_reference_number("TXN1234567ABCD"));
        assert!(!is_reference_number("REF12345678ABCD"));
    }

    #[test]
    fn reference_shape_check_handles_multibyte_text() {
        // Same byte length as a valid reference, with a char boundary
        // straddling the digit/suffix split.
        assert!(!is_reference_number("TXN1234567éABC"));
        assert!(!is_reference_number("TXN12345678ÄBC"));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let tx = sample();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["accountName"], "John Doe");
        assert_eq!(json["type"], "Transfer");
        assert_eq!(json["status"], "Successful");
        assert_eq!(json["createdAt"], "2026-10-19T08:30:00.000Z");
        assert_eq!(json["amount"], 1.0);
    }

    #[test]
    fn loads_record_written_by_browser_build() {
        let raw = r#"{
            "id": "lq2x9k",
            "accountName": "Jane",
            "bankName": "Opay",
            "accountNumber": "0123456789",
            "phoneNumber": "",
            "amount": 2.5,
            "narration": "",
            "transactionDate": "2026-09-01T14:05",
            "referenceNumber": "TXN98765432QWER",
            "status": "Successful",
            "type": "Credit",
            "createdAt": "2026-09-01T13:05:11.204Z"
        }"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.amount, Amount::from_kobo(250));
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.balance_delta(), 250);
    }

    #[test]
    fn balance_delta_is_negative_for_transfers() {
        assert_eq!(sample().balance_delta(), -100);
    }

    #[test]
    fn transaction_date_layouts() {
        let dt = parse_local_datetime("2026-10-19T09:30").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (10, 19, 9));
        assert!(parse_local_datetime("2026-10-19T09:30:15").is_some());
        assert!(parse_local_datetime("2026-10-19T09:30:15.250Z").is_some());
        assert!(parse_local_datetime("2026-10-19").is_some());
        assert!(parse_local_datetime("yesterday").is_none());
        assert!(parse_local_datetime("").is_none());
    }
}

//! Form input and the rules it must pass before the simulator enacts it.
//!
//! Raw inputs carry exactly what the user typed (all strings, the amount
//! included). Validation turns them into typed requests or a list of
//! everything wrong with the form, so the presentation layer can flag every
//! field at once.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use super::types::{Amount, AmountParseError};
use crate::config::{ACCOUNT_NUMBER_LENGTH, TOP_UP_DEFAULT_NARRATION, TRANSACTION_DATE_FORMAT};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A required form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    AccountName,
    BankName,
    AccountNumber,
    Amount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountName => write!(f, "account name"),
            Self::BankName => write!(f, "bank name"),
            Self::AccountNumber => write!(f, "account number"),
            Self::Amount => write!(f, "amount"),
        }
    }
}

/// A single reason a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),

    #[error("Account number must be exactly 10 digits")]
    InvalidAccountNumber,

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Amount cannot have more than 2 decimal places")]
    SubKoboAmount,

    #[error("Insufficient funds. Available balance: ₦{available}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        available: Amount,
        /// Amount the user asked for.
        requested: Amount,
    },
}

impl ValidationError {
    /// The form field this error should be shown against.
    pub fn field(&self) -> Field {
        match self {
            Self::MissingField(field) => *field,
            Self::InvalidAccountNumber => Field::AccountNumber,
            Self::NonPositiveAmount | Self::SubKoboAmount | Self::InsufficientFunds { .. } => {
                Field::Amount
            }
        }
    }
}

/// Every problem found in one submission. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Returns `true` if any error matches `pred`.
    pub fn any(&self, pred: impl Fn(&ValidationError) -> bool) -> bool {
        self.0.iter().any(pred)
    }

    /// Iterates over the individual errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        Self(vec![err])
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Raw Inputs
// ---------------------------------------------------------------------------

/// The transfer form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferInput {
    pub account_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub phone_number: String,
    #[serde(deserialize_with = "text_or_number")]
    pub amount: String,
    pub narration: String,
    /// Blank means "now"; the form pre-fills this with the current time.
    pub transaction_date: String,
}

/// The top-up form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopUpInput {
    #[serde(deserialize_with = "text_or_number")]
    pub amount: String,
    /// Replaces the ledger's display name when non-empty.
    pub display_name: Option<String>,
    pub narration: Option<String>,
}

/// Lets JSON clients send the amount either as `"12.50"` or `12.5`.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Validated Requests
// ---------------------------------------------------------------------------

/// A transfer that passed validation against a specific balance.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub account_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub phone_number: String,
    pub amount: Amount,
    pub narration: String,
    pub transaction_date: String,
}

/// A top-up that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUpRequest {
    pub amount: Amount,
    pub display_name: Option<String>,
    pub narration: String,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Returns `true` for exactly ten ASCII digits.
pub fn is_valid_account_number(raw: &str) -> bool {
    raw.len() == ACCOUNT_NUMBER_LENGTH && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a required amount field. Blanks, garbage, zero and fractions of a
/// kobo are all refused; nothing is rounded.
fn required_amount(raw: &str, errors: &mut Vec<ValidationError>) -> Option<Amount> {
    if raw.trim().is_empty() {
        errors.push(ValidationError::MissingField(Field::Amount));
        return None;
    }
    match Amount::parse_exact(raw) {
        Ok(amount) if !amount.is_zero() => Some(amount),
        Err(AmountParseError::SubKobo) => {
            errors.push(ValidationError::SubKoboAmount);
            None
        }
        _ => {
            errors.push(ValidationError::NonPositiveAmount);
            None
        }
    }
}

fn required_text(raw: &str, field: Field, errors: &mut Vec<ValidationError>) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(ValidationError::MissingField(field));
    }
    value.to_string()
}

/// Per-keystroke amount check.
///
/// Only flags an amount that exceeds the balance; half-typed or blank input
/// is left alone until submission. The comparison is made on the typed
/// value, so `"3.204"` against `3.20` is already an overdraft.
pub fn check_amount(raw: &str, balance: Amount) -> Result<(), ValidationError> {
    if !balance.is_exceeded_by(raw) {
        return Ok(());
    }
    Err(ValidationError::InsufficientFunds {
        available: balance,
        requested: Amount::parse_ceil(raw).unwrap_or(balance),
    })
}

/// Validates a transfer form against the current balance.
///
/// Field errors are collected first; the funds check only runs once the
/// form itself is well formed, and it runs independently of
/// [`check_amount`]. A blank transaction date defaults to `now`.
pub fn validate_transfer(
    input: &TransferInput,
    balance: Amount,
    now: NaiveDateTime,
) -> Result<TransferRequest, ValidationErrors> {
    let mut errors = Vec::new();

    let account_name = required_text(&input.account_name, Field::AccountName, &mut errors);
    let bank_name = required_text(&input.bank_name, Field::BankName, &mut errors);
    let account_number = required_text(&input.account_number, Field::AccountNumber, &mut errors);
    if !account_number.is_empty() && !is_valid_account_number(&account_number) {
        errors.push(ValidationError::InvalidAccountNumber);
    }
    let amount = required_amount(&input.amount, &mut errors);

    let amount = match amount {
        Some(amount) if errors.is_empty() => amount,
        _ => return Err(ValidationErrors(errors)),
    };

    if amount > balance {
        return Err(ValidationError::InsufficientFunds {
            available: balance,
            requested: amount,
        }
        .into());
    }

    let transaction_date = match input.transaction_date.trim() {
        "" => now.format(TRANSACTION_DATE_FORMAT).to_string(),
        given => given.to_string(),
    };

    Ok(TransferRequest {
        account_name,
        bank_name,
        account_number,
        phone_number: input.phone_number.trim().to_string(),
        amount,
        narration: input.narration.trim().to_string(),
        transaction_date,
    })
}

/// Validates a top-up form.
pub fn validate_top_up(input: &TopUpInput) -> Result<TopUpRequest, ValidationErrors> {
    let mut errors = Vec::new();
    let amount = required_amount(&input.amount, &mut errors);
    let Some(amount) = amount else {
        return Err(ValidationErrors(errors));
    };

    let display_name = input
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let narration = input
        .narration
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(TOP_UP_DEFAULT_NARRATION)
        .to_string();

    Ok(TopUpRequest {
        amount,
        display_name,
        narration,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 41, 27)
            .unwrap()
    }

    fn transfer(amount: &str) -> TransferInput {
        TransferInput {
            account_name: "John Doe".into(),
            bank_name: "Access Bank".into(),
            account_number: "1234567890".into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_transfer_passes() {
        let req = validate_transfer(&transfer("1.00"), Amount::from_kobo(320), now()).unwrap();
        assert_eq!(req.amount, Amount::from_kobo(100));
        assert_eq!(req.account_number, "1234567890");
    }

    #[test]
    fn blank_date_defaults_to_now_minute_precision() {
        let req = validate_transfer(&transfer("1"), Amount::from_kobo(320), now()).unwrap();
        assert_eq!(req.transaction_date, "2026-10-19T09:41");
    }

    #[test]
    fn given_date_is_kept() {
        let mut input = transfer("1");
        input.transaction_date = "2026-01-02T03:04".into();
        let req = validate_transfer(&input, Amount::from_kobo(320), now()).unwrap();
        assert_eq!(req.transaction_date, "2026-01-02T03:04");
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errs =
            validate_transfer(&TransferInput::default(), Amount::from_kobo(320), now()).unwrap_err();
        let fields: Vec<Field> = errs.iter().map(ValidationError::field).collect();
        assert_eq!(
            fields,
            vec![
                Field::AccountName,
                Field::BankName,
                Field::AccountNumber,
                Field::Amount
            ]
        );
    }

    #[test]
    fn account_number_must_be_ten_digits() {
        for bad in ["123456789", "12345678901", "12345abcde"] {
            let mut input = transfer("1");
            input.account_number = bad.into();
            let errs = validate_transfer(&input, Amount::from_kobo(320), now()).unwrap_err();
            assert!(errs.any(|e| *e == ValidationError::InvalidAccountNumber), "{bad}");
        }
    }

    #[test]
    fn zero_and_garbage_amounts_rejected() {
        for bad in ["0", "0.00", "abc", "-3"] {
            let errs =
                validate_transfer(&transfer(bad), Amount::from_kobo(320), now()).unwrap_err();
            assert_eq!(errs.0, vec![ValidationError::NonPositiveAmount], "{bad}");
        }
    }

    #[test]
    fn over_balance_rejected_at_submission() {
        let errs =
            validate_transfer(&transfer("15.00"), Amount::from_kobo(1_000), now()).unwrap_err();
        assert_eq!(
            errs.0,
            vec![ValidationError::InsufficientFunds {
                available: Amount::from_kobo(1_000),
                requested: Amount::from_kobo(1_500),
            }]
        );
    }

    #[test]
    fn exact_balance_is_allowed() {
        assert!(validate_transfer(&transfer("3.20"), Amount::from_kobo(320), now()).is_ok());
    }

    #[test]
    fn live_check_flags_only_overdrafts() {
        let balance = Amount::from_kobo(320);
        assert!(check_amount("3.20", balance).is_ok());
        assert!(check_amount("", balance).is_ok());
        assert!(check_amount("3.", balance).is_ok());
        let err = check_amount("3.21", balance).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient funds. Available balance: ₦3.20");
    }

    #[test]
    fn sub_kobo_amount_against_matching_balance_is_rejected() {
        let balance = Amount::from_kobo(320);
        let errs = validate_transfer(&transfer("3.204"), balance, now()).unwrap_err();
        assert_eq!(errs.0, vec![ValidationError::SubKoboAmount]);
        assert_eq!(errs.0[0].field(), Field::Amount);

        let err = check_amount("3.204", balance).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientFunds {
                available: balance,
                requested: Amount::from_kobo(321),
            }
        );
    }

    #[test]
    fn sub_kobo_top_up_is_not_rounded_away() {
        let errs = validate_top_up(&TopUpInput {
            amount: "0.004".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(errs.0, vec![ValidationError::SubKoboAmount]);
        assert!(validate_top_up(&TopUpInput {
            amount: "1.500".into(),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn top_up_display_name_is_trimmed_and_optional() {
        let req = validate_top_up(&TopUpInput {
            amount: "50".into(),
            display_name: Some("  ADA ".into()),
            narration: None,
        })
        .unwrap();
        assert_eq!(req.display_name.as_deref(), Some("ADA"));
        assert_eq!(req.narration, TOP_UP_DEFAULT_NARRATION);

        let req = validate_top_up(&TopUpInput {
            amount: "50".into(),
            display_name: Some("   ".into()),
            narration: Some("salary".into()),
        })
        .unwrap();
        assert_eq!(req.display_name, None);
        assert_eq!(req.narration, "salary");
    }

    #[test]
    fn top_up_requires_positive_amount() {
        let errs = validate_top_up(&TopUpInput::default()).unwrap_err();
        assert_eq!(errs.0, vec![ValidationError::MissingField(Field::Amount)]);
        let errs = validate_top_up(&TopUpInput {
            amount: "0".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(errs.0, vec![ValidationError::NonPositiveAmount]);
    }

    #[test]
    fn json_amount_may_be_number() {
        let input: TopUpInput = serde_json::from_str(r#"{"amount": 50, "displayName": "ADA"}"#).unwrap();
        assert_eq!(input.amount, "50");
        let input: TransferInput =
            serde_json::from_str(r#"{"accountName": "A", "amount": "1.5"}"#).unwrap();
        assert_eq!(input.amount, "1.5");
    }

    #[test]
    fn errors_join_into_one_message() {
        let errs = ValidationErrors(vec![
            ValidationError::MissingField(Field::BankName),
            ValidationError::NonPositiveAmount,
        ]);
        assert_eq!(
            errs.to_string(),
            "bank name is required; Amount must be greater than 0"
        );
    }
}

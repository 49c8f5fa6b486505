//! Core value types for MockBank transactions.
//!
//! These types are small and `Copy` so they can be passed around freely by
//! the simulator and the view projections.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::{CURRENCY_SYMBOL, MINOR_UNITS_PER_MAJOR};

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money sent to another bank account. Debits the balance.
    Transfer,
    /// Money added by a top-up. Credits the balance.
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "Transfer"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Outcome of a simulated transaction.
///
/// There is only one variant: the simulator has no failure path once a
/// submission passes validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    #[default]
    Successful,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Successful => write!(f, "Successful"),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A naira amount held as an integer number of kobo.
///
/// User input and persisted data are decimal (`"12.50"`, `12.5`); they are
/// converted at the boundary and rounded to the nearest kobo. All ledger
/// arithmetic happens on the integer, so repeated transfers never drift.
///
/// # Examples
///
/// ```
/// use mockbank_ledger::transaction::types::Amount;
///
/// let amount = Amount::parse("12.5").unwrap();
/// assert_eq!(amount.kobo(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Wraps a raw kobo count.
    pub const fn from_kobo(kobo: u64) -> Self {
        Self(kobo)
    }

    /// Returns the raw kobo count.
    pub const fn kobo(self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero amount.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Converts a decimal naira value, rounding to the nearest kobo.
    ///
    /// Returns `None` for NaN, infinities, negative values, and values too
    /// large to represent.
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let kobo = (value * MINOR_UNITS_PER_MAJOR as f64).round();
        if kobo >= u64::MAX as f64 {
            return None;
        }
        Some(Self(kobo as u64))
    }

    /// Returns the amount as a decimal naira value.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_MAJOR as f64
    }

    /// Parses user-entered text such as `"1,250.50"` or `" 3.2 "`.
    ///
    /// Thousands separators and surrounding whitespace are ignored. Anything
    /// that is not a finite, non-negative decimal yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_naira(raw).and_then(Self::from_major)
    }

    /// Parses user-entered text that must name a whole number of kobo.
    ///
    /// Unlike [`Amount::parse`], `"3.204"` is refused instead of rounded, so
    /// a form can never move a value other than the one that was typed.
    pub fn parse_exact(raw: &str) -> Result<Self, AmountParseError> {
        let naira = parse_naira(raw).ok_or(AmountParseError::Invalid)?;
        let kobo = naira * MINOR_UNITS_PER_MAJOR as f64;
        if (kobo - kobo.round()).abs() > KOBO_EPSILON {
            return Err(AmountParseError::SubKobo);
        }
        Self::from_major(naira).ok_or(AmountParseError::Invalid)
    }

    /// Returns `true` if `raw` names more money than `self`, compared before
    /// any rounding. Unparseable text never exceeds anything.
    pub fn is_exceeded_by(self, raw: &str) -> bool {
        parse_naira(raw).is_some_and(|naira| {
            naira * MINOR_UNITS_PER_MAJOR as f64 > self.0 as f64 + KOBO_EPSILON
        })
    }

    /// Smallest whole-kobo amount not below `raw`.
    pub(crate) fn parse_ceil(raw: &str) -> Option<Self> {
        let kobo = parse_naira(raw)? * MINOR_UNITS_PER_MAJOR as f64;
        Self::from_major((kobo - KOBO_EPSILON).ceil() / MINOR_UNITS_PER_MAJOR as f64)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Renders the amount with the naira sign, e.g. `₦3.20`.
    pub fn display_with_symbol(self) -> String {
        format!("{}{}", CURRENCY_SYMBOL, self)
    }
}

/// Slack for float noise when checking kobo precision (`0.1 * 100` is
/// `10.000000000000002`).
const KOBO_EPSILON: f64 = 1e-6;

/// Strips thousands separators and whitespace, then reads a finite,
/// non-negative naira value.
fn parse_naira(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Why text could not be read by [`Amount::parse_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountParseError {
    /// Not a finite, non-negative decimal.
    Invalid,
    /// Finer than one kobo, e.g. `"3.204"`.
    SubKobo,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_MAJOR,
            self.0 % MINOR_UNITS_PER_MAJOR
        )
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        Amount(iter.map(|a| a.0).fold(0u64, u64::saturating_add))
    }
}

// Persisted records carry the amount as a plain JSON number in naira, so
// data written by older builds (and hand-edited stores) keeps loading.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount::from_major(n),
            Raw::Text(s) => Amount::parse(&s),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("amount must be a non-negative decimal"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

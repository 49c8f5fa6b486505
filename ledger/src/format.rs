//! Cosmetic input formatting applied as the user types.
//!
//! These never reject anything; they only reshape what is in the field.
//! Validation happens separately, on submission.

use crate::config::{ACCOUNT_NUMBER_LENGTH, PHONE_NUMBER_MAX_DIGITS};

/// Keeps only digits, at most ten of them.
pub fn format_account_number(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(ACCOUNT_NUMBER_LENGTH)
        .collect()
}

/// Drops spaces and dashes, keeping everything else.
///
/// For input that arrives in one piece (a CLI flag, a pasted value) and must
/// still reach validation intact: `"0123 456-789"` becomes `"0123456789"`
/// but `"12345678901"` stays eleven digits.
pub fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Groups a phone number as `XXXX-XXX-XXXX`, dropping non-digits and
/// anything past the eleventh digit. Partial input is grouped as far as it
/// goes (`0803` → `0803`, `08031` → `0803-1`).
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_NUMBER_MAX_DIGITS)
        .collect();

    match digits.len() {
        0..=4 => digits,
        5..=7 => format!("{}-{}", &digits[..4], &digits[4..]),
        _ => format!("{}-{}-{}", &digits[..4], &digits[4..7], &digits[7..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_number_strips_and_caps() {
        assert_eq!(format_account_number("12-34 56a7890123"), "1234567890");
        assert_eq!(format_account_number("abc"), "");
        assert_eq!(format_account_number("0123"), "0123");
    }

    #[test]
    fn separators_are_dropped_without_truncating() {
        assert_eq!(strip_separators("0123 456-789"), "0123456789");
        assert_eq!(strip_separators("123456789012"), "123456789012");
        assert_eq!(strip_separators("12345abcde"), "12345abcde");
    }

    #[test]
    fn phone_number_grouping() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("0803"), "0803");
        assert_eq!(format_phone_number("08031"), "0803-1");
        assert_eq!(format_phone_number("0803123"), "0803-123");
        assert_eq!(format_phone_number("08031234"), "0803-123-4");
        assert_eq!(format_phone_number("08031234567"), "0803-123-4567");
    }

    #[test]
    fn phone_number_drops_extra_digits_and_noise() {
        assert_eq!(format_phone_number("+234 (803) 123-4567 99"), "2348-031-2345");
        assert_eq!(format_phone_number("0803-123-456789"), "0803-123-4567");
    }
}

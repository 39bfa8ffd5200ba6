//! Fixed-point stroop amount parsing.
//!
//! Per spec §9 "Floating-point amount strings": amounts are never parsed as
//! binary floats. A decimal string with up to 7 fractional digits is parsed
//! directly into `i64` stroops (1 XLM = 10^7 stroops). `,` is rejected as a
//! decimal separator, matching the teacher's `tx/builder/amount.rs`
//! `Amount` `FromStr`, which similarly rejects malformed separator usage
//! (there applied to `_` digit-grouping rather than decimals).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("amount must not be negative: {0:?}")]
    Negative(String),
    #[error("amount has more than 7 fractional digits: {0:?}")]
    TooManyFractionalDigits(String),
    #[error("amount overflows i64 stroops: {0:?}")]
    Overflow(String),
    #[error("amount is not a valid decimal number: {0:?}")]
    NotANumber(String),
    #[error("\",\" is not a valid decimal separator: {0:?}")]
    CommaSeparator(String),
}

const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Parses a decimal amount string (e.g. `"100.5000000"`) into stroops.
pub fn parse_stroops(s: &str) -> Result<i64, Error> {
    if s.contains(',') {
        return Err(Error::CommaSeparator(s.to_string()));
    }
    if s.starts_with('-') {
        return Err(Error::Negative(s.to_string()));
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::NotANumber(s.to_string()));
    }
    if frac_part.len() > 7 {
        return Err(Error::TooManyFractionalDigits(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::NotANumber(s.to_string()));
    }
    let int_value: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| Error::Overflow(s.to_string()))?
    };
    let mut frac_padded = frac_part.to_string();
    while frac_padded.len() < 7 {
        frac_padded.push('0');
    }
    let frac_value: i64 = frac_padded.parse().map_err(|_| Error::Overflow(s.to_string()))?;

    int_value
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|whole| whole.checked_add(frac_value))
        .ok_or_else(|| Error::Overflow(s.to_string()))
}

pub fn format_stroops(stroops: i64) -> String {
    let whole = stroops / STROOPS_PER_UNIT;
    let frac = (stroops % STROOPS_PER_UNIT).abs();
    format!("{whole}.{frac:07}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_number() {
        assert_eq!(parse_stroops("100").unwrap(), 100 * STROOPS_PER_UNIT);
    }

    #[test]
    fn parses_seven_fractional_digits() {
        assert_eq!(parse_stroops("1.5000000").unwrap(), 15_000_000);
    }

    #[test]
    fn pads_short_fractional_part() {
        assert_eq!(parse_stroops("1.5").unwrap(), 15_000_000);
    }

    #[test]
    fn rejects_eight_fractional_digits() {
        assert_eq!(
            parse_stroops("1.12345678").unwrap_err(),
            Error::TooManyFractionalDigits("1.12345678".to_string())
        );
    }

    #[test]
    fn rejects_negative() {
        assert!(parse_stroops("-1").is_err());
    }

    #[test]
    fn rejects_comma_separator() {
        assert_eq!(
            parse_stroops("1,5").unwrap_err(),
            Error::CommaSeparator("1,5".to_string())
        );
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_stroops("99999999999999999999").is_err());
    }

    #[test]
    fn formats_round_trip() {
        let stroops = 123_456_789;
        let s = format_stroops(stroops);
        assert_eq!(parse_stroops(&s).unwrap(), stroops);
    }
}

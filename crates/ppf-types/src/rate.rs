//! Fixed-point rate encoding.
//!
//! A rate crossing the feed boundary is the integer `real_rate * ONE`. Real
//! rates are written as plain decimal strings (`"2"`, `"0.5"`,
//! `"1234.000001"`) with at most [`RATE_DECIMALS`] fractional digits, so
//! encoding is exact and [`decode_rate`] inverts [`encode_rate`].

use crate::{Result, TypesError};

/// Number of fractional decimal digits carried by an encoded rate.
pub const RATE_DECIMALS: usize = 18;

/// Scaling constant: the encoding of a rate of exactly 1.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Encode a decimal real rate into fixed point.
///
/// # Errors
///
/// - [`TypesError::InvalidRate`] if the string is not an unsigned decimal or
///   carries more than [`RATE_DECIMALS`] fractional digits
/// - [`TypesError::RateOverflow`] if the scaled value exceeds `u128::MAX`
///
/// # Examples
///
/// ```
/// use ppf_types::rate::{encode_rate, ONE};
///
/// assert_eq!(encode_rate("2").unwrap(), 2 * ONE);
/// assert_eq!(encode_rate("0.5").unwrap(), ONE / 2);
/// ```
pub fn encode_rate(real: &str) -> Result<u128> {
    let invalid = || TypesError::InvalidRate(real.to_string());
    let trimmed = real.trim();

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac_part.len() > RATE_DECIMALS || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if trimmed.ends_with('.') {
        return Err(invalid());
    }

    let whole: u128 = int_part.parse().map_err(|_| TypesError::RateOverflow)?;

    let mut frac: u128 = 0;
    for digit in frac_part.bytes() {
        frac = frac * 10 + u128::from(digit - b'0');
    }
    // Pad the fraction out to RATE_DECIMALS digits.
    for _ in frac_part.len()..RATE_DECIMALS {
        frac *= 10;
    }

    whole
        .checked_mul(ONE)
        .and_then(|scaled| scaled.checked_add(frac))
        .ok_or(TypesError::RateOverflow)
}

/// Render a fixed-point rate as its canonical decimal string.
///
/// Integral rates have no fractional part; otherwise trailing zeros are
/// dropped.
pub fn decode_rate(rate: u128) -> String {
    let whole = rate / ONE;
    let frac = rate % ONE;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = RATE_DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Encode the ratio `numerator / denominator`, truncating below `1 / ONE`.
///
/// # Errors
///
/// - [`TypesError::ZeroDenominator`] if `denominator` is zero
/// - [`TypesError::RateOverflow`] if `numerator * ONE` exceeds `u128::MAX`
pub fn rate_from_ratio(numerator: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(TypesError::ZeroDenominator);
    }
    numerator
        .checked_mul(ONE)
        .map(|scaled| scaled / denominator)
        .ok_or(TypesError::RateOverflow)
}

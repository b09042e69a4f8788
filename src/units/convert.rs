//! Exact conversion between display strings and raw integer amounts.
//!
//! # Responsibilities
//! - Format raw `U256` amounts at any decimal precision
//! - Parse decimal numerals (with optional exponent) into raw amounts
//! - Provide the 18-decimal ether pair and the legacy 9-decimal `i64` pair

use alloy::primitives::U256;

use crate::units::error::UnitsError;

/// Decimal places of the native coin (1 ether = 10^18 wei).
pub const ETHER_DECIMALS: u8 = 18;

/// Decimal places of the legacy 64-bit conversion pair.
pub const LEGACY_WEI_DECIMALS: u8 = 9;

/// Returns `10^exponent` as an exact integer, or `None` once it exceeds 256 bits.
pub fn pow10(exponent: u64) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exponent))
}

/// Format a raw amount as a human-readable decimal string.
///
/// Divides by `10^decimals`, truncating toward zero, and strips trailing
/// zeros from the fraction. Whole values are rendered without a decimal point.
pub fn to_display(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    // A scale wider than 256 bits is larger than every raw value.
    let (whole, fraction) = match pow10(u64::from(decimals)) {
        Some(scale) => (raw / scale, raw % scale),
        None => (U256::ZERO, raw),
    };

    let width = usize::from(decimals);
    let padded = format!("{:0>width$}", fraction.to_string());
    let trimmed = padded.trim_end_matches('0');

    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parse a decimal numeral and scale it by `10^decimals`.
///
/// Digits below the requested precision are dropped, not rounded.
///
/// # Errors
/// - `InvalidFormat` if `display` is not a decimal numeral
/// - `Overflow` if the scaled value exceeds 256 bits
pub fn from_display(display: &str, decimals: u8) -> Result<U256, UnitsError> {
    let (digits, exponent) = parse_numeral(display)?;

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    let overflow = || UnitsError::Overflow {
        input: display.to_string(),
        target: "u256",
    };

    let shift = exponent + i64::from(decimals);
    if shift >= 0 {
        let mantissa = U256::from_str_radix(significant, 10).map_err(|_| overflow())?;
        let scale = pow10(shift.unsigned_abs()).ok_or_else(overflow)?;
        mantissa.checked_mul(scale).ok_or_else(overflow)
    } else {
        let dropped = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
        if dropped >= significant.len() {
            return Ok(U256::ZERO);
        }
        let kept = &significant[..significant.len() - dropped];
        U256::from_str_radix(kept, 10).map_err(|_| overflow())
    }
}

/// Format a wei amount in ether.
pub fn to_ether(wei: U256) -> String {
    to_display(wei, ETHER_DECIMALS)
}

/// Parse an ether amount into wei.
pub fn from_ether(ether: &str) -> Result<U256, UnitsError> {
    from_display(ether, ETHER_DECIMALS)
}

/// Parse an amount at the legacy 9-decimal scale into a signed 64-bit integer.
///
/// Unlike the ether pair this path is bounded by `i64::MAX` and fails with
/// `Overflow` rather than wrapping.
pub fn to_wei(amount: &str) -> Result<i64, UnitsError> {
    let overflow = || UnitsError::Overflow {
        input: amount.to_string(),
        target: "i64",
    };

    let raw = from_display(amount, LEGACY_WEI_DECIMALS).map_err(|err| match err {
        UnitsError::Overflow { .. } => overflow(),
        other => other,
    })?;

    i64::try_from(raw).map_err(|_| overflow())
}

/// Format a legacy 9-decimal amount.
pub fn from_wei(amount: i64) -> String {
    let magnitude = to_display(U256::from(amount.unsigned_abs()), LEGACY_WEI_DECIMALS);
    if amount < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Split a numeral into its concatenated digits and the power of ten that
/// applies to them.
fn parse_numeral(input: &str) -> Result<(String, i64), UnitsError> {
    let invalid = || UnitsError::InvalidFormat(input.to_string());

    let unsigned = input.strip_prefix('+').unwrap_or(input);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (
            &unsigned[..idx],
            parse_exponent(&unsigned[idx + 1..]).ok_or_else(invalid)?,
        ),
        None => (unsigned, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !is_digits(int_part) || !is_digits(frac_part) {
        return Err(invalid());
    }

    let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
    Ok((format!("{int_part}{frac_part}"), exponent - frac_len))
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Anything past i32 is already far outside the U256 range.
    let magnitude = digits
        .parse::<i64>()
        .unwrap_or(i64::MAX)
        .min(i64::from(i32::MAX));

    Some(if negative { -magnitude } else { magnitude })
}

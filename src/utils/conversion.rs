//! Big-integer parsing and fixed-point formatting.
//!
//! Token amounts reported by the stats endpoints routinely exceed 64 bits, so
//! everything here stays in `BigInt`/`BigDecimal` and never goes through f64.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};
use std::str::FromStr;

// ============================================
// Parsing
// ============================================

/// Parse a decimal integer string into a BigInt.
///
/// Accepts an optional leading `-` and surrounding whitespace. Rejects
/// fractional parts, exponents, `+` signs and digit separators.
pub fn parse_bigint(raw: &str) -> Option<BigInt> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    BigInt::from_str(trimmed).ok()
}

// ============================================
// Fixed-point Conversions
// ============================================

/// Interpret `value` as a fixed-point number with `decimals` fractional digits.
///
/// # Example
/// ```ignore
/// let usd = to_decimal(&BigInt::from(1_500_000u64), 6); // 1.5
/// ```
pub fn to_decimal(value: &BigInt, decimals: u8) -> BigDecimal {
    BigDecimal::new(value.clone(), decimals as i64)
}

/// Format a fixed-point amount for display.
///
/// Rounds toward zero to `precision` fractional digits and groups the integer
/// part in thousands.
///
/// # Arguments
/// * `value` - Raw integer amount as reported by the endpoint
/// * `decimals` - Number of fractional digits encoded in `value`
/// * `precision` - Number of fractional digits to keep
///
/// # Returns
/// * e.g. `"1,234,567.89"`
pub fn format_amount(value: &BigInt, decimals: u8, precision: u8) -> String {
    let rounded =
        to_decimal(value, decimals).with_scale_round(precision as i64, RoundingMode::Down);
    let (digits, scale) = rounded.into_bigint_and_exponent();
    let scale = scale.max(0) as usize;

    let mut magnitude = digits.magnitude().to_string();
    if magnitude.len() <= scale {
        magnitude = format!("{}{}", "0".repeat(scale + 1 - magnitude.len()), magnitude);
    }
    let (int_part, frac_part) = magnitude.split_at(magnitude.len() - scale);

    let mut out = String::with_capacity(magnitude.len() + magnitude.len() / 3 + 2);
    if digits.sign() == Sign::Minus {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if scale > 0 {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

// ============================================
// Internal Helpers
// ============================================

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

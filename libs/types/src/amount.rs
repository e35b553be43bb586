//! Fixed-point token amounts
//!
//! Amounts are unsigned integers in the token's smallest unit: with 18
//! decimals, `1.0` is `1_000_000_000_000_000_000`. Parsing goes through
//! `rust_decimal` so user input like `"0.25"` is exact; formatting is pure
//! integer arithmetic so values beyond `Decimal`'s 96-bit mantissa still
//! render correctly.

use crate::errors::{AmmError, AmmResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest precision whose scale factor fits in `u128`
pub const MAX_DECIMALS: u8 = 38;

/// `10^decimals`, or `None` when it does not fit in `u128`
pub fn scale_factor(decimals: u8) -> Option<u128> {
    10u128.checked_pow(decimals as u32)
}

/// Parse a decimal string into native units of a token with `decimals`
///
/// # Examples
/// ```
/// use types::amount::parse_units;
///
/// assert_eq!(parse_units("1000", 18).unwrap(), 1_000_000_000_000_000_000_000);
/// assert_eq!(parse_units("0.000001", 6).unwrap(), 1);
/// ```
pub fn parse_units(input: &str, decimals: u8) -> AmmResult<u128> {
    let invalid = |reason: &str| AmmError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let value = Decimal::from_str(input.trim()).map_err(|_| invalid("not a decimal number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("amount cannot be negative"));
    }

    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals as u32 {
        return Err(invalid("more fractional digits than the token precision"));
    }

    let mantissa = u128::try_from(value.mantissa()).map_err(|_| invalid("amount cannot be negative"))?;
    let factor = scale_factor(decimals - scale as u8).ok_or_else(|| invalid("precision too large"))?;
    mantissa
        .checked_mul(factor)
        .ok_or_else(|| invalid("amount exceeds the representable range"))
}

/// Render native units as a decimal string with trailing zeros trimmed
pub fn format_units(amount: u128, decimals: u8) -> String {
    let Some(factor) = scale_factor(decimals) else {
        return amount.to_string();
    };
    if decimals == 0 {
        return amount.to_string();
    }

    let whole = amount / factor;
    let fraction = amount % factor;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Display-only conversion to `Decimal`
///
/// Returns `None` when the amount exceeds `Decimal`'s 96-bit mantissa.
pub fn to_decimal(amount: u128, decimals: u8) -> Option<Decimal> {
    let mantissa = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, decimals as u32).ok()
}

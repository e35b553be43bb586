//! 256-bit intermediates
//!
//! Reserves and amounts are `u128`, so the product of any two of them fits
//! in 256 bits. Every multi-term product goes through these helpers and is
//! narrowed back to `u128` with an explicit overflow check.

use alloy_primitives::U256;
use types::{AmmError, AmmResult};

/// Exact product of two native amounts
pub fn product(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// `floor(a * b / denominator)` without intermediate overflow
pub fn mul_div(a: u128, b: u128, denominator: u128, context: &'static str) -> AmmResult<u128> {
    if denominator == 0 {
        return Err(AmmError::DivisionByZero(context));
    }
    narrow(product(a, b) / U256::from(denominator), context)
}

/// Convert back to `u128`, failing instead of truncating
pub fn narrow(value: U256, context: &'static str) -> AmmResult<u128> {
    u128::try_from(value).map_err(|_| AmmError::ArithmeticOverflow(context))
}

pub(crate) fn checked_mul(a: U256, b: U256, context: &'static str) -> AmmResult<U256> {
    a.checked_mul(b).ok_or(AmmError::ArithmeticOverflow(context))
}

pub(crate) fn checked_add(a: U256, b: U256, context: &'static str) -> AmmResult<U256> {
    a.checked_add(b).ok_or(AmmError::ArithmeticOverflow(context))
}

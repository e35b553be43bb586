//! Integer square root
//!
//! Babylonian iteration producing `floor(sqrt(x))`. Converges in
//! O(log x) steps; for 256-bit inputs that is well under 300 iterations.

use alloy_primitives::U256;

/// Floor of the square root of `value`
pub fn isqrt(value: U256) -> U256 {
    if value.is_zero() {
        return U256::ZERO;
    }
    if value < U256::from(4u8) {
        return U256::from(1u8);
    }

    let two = U256::from(2u8);
    let mut z = value;
    let mut y = value / two + U256::from(1u8);
    while y < z {
        z = y;
        y = (value / z + z) / two;
    }
    z
}

/// Convenience wrapper for values that already fit in `u128`
pub fn isqrt_u128(value: u128) -> u128 {
    // sqrt of a u128 always fits in 64 bits
    isqrt(U256::from(value)).saturating_to::<u128>()
}

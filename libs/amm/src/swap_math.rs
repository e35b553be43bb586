//! Constant product swap math with exact integer arithmetic
//!
//! The quote path and the settlement path must agree bit-for-bit, so every
//! authoritative number here is computed with integers and floor division.
//! `Decimal` only appears in display values (price impact, spot price).

use crate::wide::{self, checked_add, checked_mul, mul_div, narrow};
use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::{AmmError, AmmResult};

/// Basis-point denominator for slippage tolerances
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fractional digits used when converting integer ratios for display
const RATIO_SCALE: u32 = 18;

/// Largest mantissa `Decimal` can hold (96 bits)
const MAX_DECIMAL_MANTISSA: u128 = (1u128 << 96) - 1;

/// Proportional trading fee taken from the input leg
///
/// `numerator / denominator` of every input is kept by the pool;
/// 3/1000 is the 0.3% fee of the classic constant product pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeSchedule {
    numerator: u128,
    denominator: u128,
}

impl FeeSchedule {
    /// 0.3% fee
    pub const DEFAULT: Self = Self {
        numerator: 3,
        denominator: 1_000,
    };

    pub fn new(numerator: u128, denominator: u128) -> AmmResult<Self> {
        if denominator == 0 || numerator >= denominator {
            return Err(AmmError::InvalidFee {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Fee-free schedule, the limiting case of the constant product invariant
    pub const fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1_000,
        }
    }

    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// Share of each input that reaches the curve, over `denominator`
    pub fn retained(&self) -> u128 {
        self.denominator - self.numerator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Fee portion of `amount_in`, floored. Informational only.
    pub fn fee_on(&self, amount_in: u128) -> AmmResult<u128> {
        mul_div(amount_in, self.numerator, self.denominator, "fee amount")
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Constant product (`x * y = k`) math functions
pub struct SwapMath;

impl SwapMath {
    /// Exact output for `amount_in` against `reserve_in`/`reserve_out`
    ///
    /// ```text
    /// amount_in_after_fee = amount_in * (denominator - numerator)
    /// amount_out = amount_in_after_fee * reserve_out
    ///            / (reserve_in * denominator + amount_in_after_fee)
    /// ```
    ///
    /// The result is always strictly below `reserve_out`.
    ///
    /// # Examples
    /// ```
    /// use amm::{FeeSchedule, SwapMath};
    ///
    /// let out = SwapMath::amount_out(100, 1_000, 1_000, FeeSchedule::DEFAULT).unwrap();
    /// assert_eq!(out, 90);
    /// ```
    pub fn amount_out(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee: FeeSchedule,
    ) -> AmmResult<u128> {
        if amount_in == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }

        let after_fee = wide::product(amount_in, fee.retained());
        let numerator = checked_mul(after_fee, U256::from(reserve_out), "swap numerator")?;
        let denominator = checked_add(
            wide::product(reserve_in, fee.denominator()),
            after_fee,
            "swap denominator",
        )?;

        narrow(numerator / denominator, "swap output")
    }

    /// Minimal input that yields at least `amount_out` (reverse quote)
    ///
    /// Rounds up by one unit so the pool never receives less than the
    /// curve requires.
    pub fn amount_in(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee: FeeSchedule,
    ) -> AmmResult<u128> {
        if amount_out == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = checked_mul(
            wide::product(reserve_in, amount_out),
            U256::from(fee.denominator()),
            "reverse quote numerator",
        )?;
        let denominator = wide::product(reserve_out - amount_out, fee.retained());

        let amount = narrow(numerator / denominator, "reverse quote")?;
        amount
            .checked_add(1)
            .ok_or(AmmError::ArithmeticOverflow("reverse quote"))
    }

    /// Price impact as the ratio `amount_in / (reserve_in + amount_in)`
    ///
    /// Display only; the engine never gates a swap on it.
    pub fn price_impact(amount_in: u128, reserve_in: u128) -> AmmResult<Decimal> {
        let total = checked_add(
            U256::from(reserve_in),
            U256::from(amount_in),
            "price impact",
        )?;
        if total.is_zero() {
            return Ok(Decimal::ZERO);
        }
        ratio_to_decimal(U256::from(amount_in), total, "price impact")
    }

    /// Price of token A in units of token B (`reserve_b / reserve_a`)
    ///
    /// `None` for an empty pool. Display only.
    pub fn spot_price(reserve_a: u128, reserve_b: u128) -> AmmResult<Option<Decimal>> {
        if reserve_a == 0 || reserve_b == 0 {
            return Ok(None);
        }
        ratio_to_decimal(U256::from(reserve_b), U256::from(reserve_a), "spot price").map(Some)
    }

    /// Caller-side floor for a quoted output under a slippage tolerance
    ///
    /// `floor(amount_out * (10000 - bps) / 10000)`. The engine itself does
    /// not enforce slippage; settlement layers pass this as their minimum.
    pub fn minimum_output(amount_out: u128, slippage_bps: u32) -> AmmResult<u128> {
        if slippage_bps > BPS_DENOMINATOR {
            return Err(AmmError::InvalidSlippage { bps: slippage_bps });
        }
        mul_div(
            amount_out,
            (BPS_DENOMINATOR - slippage_bps) as u128,
            BPS_DENOMINATOR as u128,
            "minimum output",
        )
    }
}

/// Integer ratio rendered as a `Decimal`, shedding fractional digits
/// when the integer part alone needs most of the 96-bit mantissa
fn ratio_to_decimal(numerator: U256, denominator: U256, context: &'static str) -> AmmResult<Decimal> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero(context));
    }

    let ten = U256::from(10u8);
    let scaled = checked_mul(numerator, U256::from(10u128.pow(RATIO_SCALE)), context)? / denominator;

    let mut value = scaled;
    let mut scale = RATIO_SCALE;
    let max = U256::from(MAX_DECIMAL_MANTISSA);
    while value > max && scale > 0 {
        value = value / ten;
        scale -= 1;
    }
    if value > max {
        return Err(AmmError::ArithmeticOverflow(context));
    }

    let mantissa = narrow(value, context)? as i128;
    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map(|d| d.normalize())
        .map_err(|_| AmmError::ArithmeticOverflow(context))
}

//! LP share issuance and redemption math
//!
//! First deposit: `shares = isqrt(amount_a * amount_b) - MINIMUM_LIQUIDITY`,
//! with the minimum permanently locked. Later deposits mint the smaller of
//! the two proportional share counts; redemptions return a floor-divided
//! pro-rata slice of both reserves.

use crate::sqrt::isqrt;
use crate::wide::{self, mul_div, narrow};
use types::{AmmError, AmmResult};

/// Shares locked forever on the first deposit of every pool
///
/// Fixed per pool at creation; changing it for a live pool would change
/// the meaning of every share already minted.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Share amounts produced by seeding an empty pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialMint {
    /// Shares credited to the depositor
    pub minted: u128,
    /// Shares credited to the non-redeemable sink
    pub locked: u128,
}

impl InitialMint {
    /// `totalShares` right after seeding, i.e. `isqrt(amount_a * amount_b)`
    pub fn total(&self) -> u128 {
        self.minted + self.locked
    }
}

pub struct LiquidityMath;

impl LiquidityMath {
    /// Shares for the first deposit into an empty pool
    pub fn initial_shares(
        amount_a: u128,
        amount_b: u128,
        minimum_liquidity: u128,
    ) -> AmmResult<InitialMint> {
        if amount_a == 0 || amount_b == 0 {
            return Err(AmmError::ZeroAmount);
        }

        let root = narrow(isqrt(wide::product(amount_a, amount_b)), "initial shares")?;
        if root <= minimum_liquidity {
            return Err(AmmError::InsufficientInitialLiquidity {
                root,
                minimum: minimum_liquidity,
            });
        }

        Ok(InitialMint {
            minted: root - minimum_liquidity,
            locked: minimum_liquidity,
        })
    }

    /// Shares for a deposit into a seeded pool: `min(sharesA, sharesB)`
    ///
    /// Any excess on the larger leg stays in the pool as a donation to
    /// existing holders.
    pub fn proportional_shares(
        amount_a: u128,
        amount_b: u128,
        reserve_a: u128,
        reserve_b: u128,
        total_shares: u128,
    ) -> AmmResult<u128> {
        if amount_a == 0 || amount_b == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_a == 0 || reserve_b == 0 || total_shares == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }

        let shares_a = mul_div(amount_a, total_shares, reserve_a, "deposit shares")?;
        let shares_b = mul_div(amount_b, total_shares, reserve_b, "deposit shares")?;
        let shares = shares_a.min(shares_b);
        if shares == 0 {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        Ok(shares)
    }

    /// Reserve amounts returned for burning `shares` of `total_shares`
    pub fn redemption_amounts(
        shares: u128,
        reserve_a: u128,
        reserve_b: u128,
        total_shares: u128,
    ) -> AmmResult<(u128, u128)> {
        if shares == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if shares > total_shares {
            return Err(AmmError::InsufficientShares {
                requested: shares,
                available: total_shares,
            });
        }

        let amount_a = mul_div(shares, reserve_a, total_shares, "redemption")?;
        let amount_b = mul_div(shares, reserve_b, total_shares, "redemption")?;
        Ok((amount_a, amount_b))
    }

    /// Deposit of the other token that matches the current reserve ratio
    ///
    /// `floor(amount * reserve_other / reserve_this)`
    pub fn counterpart_amount(amount: u128, reserve_this: u128, reserve_other: u128) -> AmmResult<u128> {
        if amount == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_this == 0 || reserve_other == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }
        mul_div(amount, reserve_other, reserve_this, "counterpart amount")
    }
}

//! Pool ledger record
//!
//! A `Pool` is only ever mutated through `apply_swap`, `apply_deposit` and
//! `apply_withdrawal`. Each one validates first and writes last, so a
//! rejected operation leaves the record untouched.

use amm::{wide, AmmPool, FeeSchedule, SwapMath, MINIMUM_LIQUIDITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::{Address, AmmError, AmmResult, TokenPair};

/// Economics fixed when a pool is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    pub fee: FeeSchedule,
    /// Shares locked to the sink on the first deposit
    pub minimum_liquidity: u128,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            fee: FeeSchedule::DEFAULT,
            minimum_liquidity: MINIMUM_LIQUIDITY,
        }
    }
}

/// Authoritative state of a single token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    address: Address,
    name: String,
    token_a: Address,
    token_b: Address,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
    params: PoolParams,

    // Display counters, never used for pricing
    swap_count: u64,
    volume_a: u128,
    volume_b: u128,
}

impl Pool {
    /// Create an empty pool
    pub fn new(
        address: Address,
        name: impl Into<String>,
        token_a: Address,
        token_b: Address,
        params: PoolParams,
    ) -> AmmResult<Self> {
        if token_a == token_b {
            return Err(AmmError::IdenticalTokens(token_a));
        }
        Ok(Self {
            address,
            name: name.into(),
            token_a,
            token_b,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            params,
            swap_count: 0,
            volume_a: 0,
            volume_b: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token_a(&self) -> Address {
        self.token_a
    }

    pub fn token_b(&self) -> Address {
        self.token_b
    }

    pub fn pair(&self) -> AmmResult<TokenPair> {
        TokenPair::new(self.token_a, self.token_b)
    }

    pub fn contains_token(&self, token: &Address) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn params(&self) -> PoolParams {
        self.params
    }

    pub fn swap_count(&self) -> u64 {
        self.swap_count
    }

    /// Cumulative swap input per token, `(volume_a, volume_b)`
    pub fn volumes(&self) -> (u128, u128) {
        (self.volume_a, self.volume_b)
    }

    /// No liquidity has been deposited, or all of it was withdrawn
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Price of token A in token B, `None` while empty
    pub fn spot_price(&self) -> Option<Decimal> {
        SwapMath::spot_price(self.reserve_a, self.reserve_b)
            .ok()
            .flatten()
    }

    /// Settle a swap: `token_in` reserve grows by `amount_in`, the other
    /// shrinks by `amount_out`
    ///
    /// Rejected unless `reserve_a * reserve_b` stays at or above its
    /// current value.
    pub fn apply_swap(&mut self, token_in: &Address, amount_in: u128, amount_out: u128) -> AmmResult<()> {
        if amount_in == 0 {
            return Err(AmmError::ZeroAmount);
        }
        let (reserve_in, reserve_out, _) = self.orient(token_in)?;
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }
        let new_in = reserve_in
            .checked_add(amount_in)
            .ok_or(AmmError::ArithmeticOverflow("swap reserve"))?;
        let new_out = reserve_out - amount_out;
        if wide::product(new_in, new_out) < wide::product(reserve_in, reserve_out) {
            return Err(AmmError::InsufficientLiquidity);
        }

        if *token_in == self.token_a {
            self.reserve_a = new_in;
            self.reserve_b = new_out;
            self.volume_a = self.volume_a.saturating_add(amount_in);
        } else {
            self.reserve_b = new_in;
            self.reserve_a = new_out;
            self.volume_b = self.volume_b.saturating_add(amount_in);
        }
        self.swap_count = self.swap_count.saturating_add(1);
        Ok(())
    }

    /// Add both legs to the reserves and `shares` to the supply
    ///
    /// `shares` includes any locked minimum on a first deposit.
    pub fn apply_deposit(&mut self, amount_a: u128, amount_b: u128, shares: u128) -> AmmResult<()> {
        if amount_a == 0 || amount_b == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if shares == 0 {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        let reserve_a = self
            .reserve_a
            .checked_add(amount_a)
            .ok_or(AmmError::ArithmeticOverflow("deposit reserve"))?;
        let reserve_b = self
            .reserve_b
            .checked_add(amount_b)
            .ok_or(AmmError::ArithmeticOverflow("deposit reserve"))?;
        let total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(AmmError::ArithmeticOverflow("share supply"))?;

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_shares = total_shares;
        Ok(())
    }

    /// Burn `shares` and pay out both legs
    ///
    /// Either everything drains to zero together or reserves and supply all
    /// stay positive.
    pub fn apply_withdrawal(&mut self, shares: u128, amount_a: u128, amount_b: u128) -> AmmResult<()> {
        if shares == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if shares > self.total_shares {
            return Err(AmmError::InsufficientShares {
                requested: shares,
                available: self.total_shares,
            });
        }
        let reserve_a = self
            .reserve_a
            .checked_sub(amount_a)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let reserve_b = self
            .reserve_b
            .checked_sub(amount_b)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let total_shares = self.total_shares - shares;

        if !empty_state_consistent(reserve_a, reserve_b, total_shares) {
            return Err(AmmError::InsufficientLiquidity);
        }

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_shares = total_shares;
        Ok(())
    }

    /// Structural checks applied to records coming from outside the ledger
    pub fn validate(&self) -> AmmResult<()> {
        if self.token_a == self.token_b {
            return Err(AmmError::IdenticalTokens(self.token_a));
        }
        if !empty_state_consistent(self.reserve_a, self.reserve_b, self.total_shares) {
            return Err(AmmError::Snapshot(format!(
                "pool {} has inconsistent reserves {}/{} for {} shares",
                self.address, self.reserve_a, self.reserve_b, self.total_shares
            )));
        }
        FeeSchedule::new(self.params.fee.numerator(), self.params.fee.denominator())?;
        Ok(())
    }
}

/// `reserve_a == 0 ⇔ reserve_b == 0 ⇔ total_shares == 0`
fn empty_state_consistent(reserve_a: u128, reserve_b: u128, total_shares: u128) -> bool {
    (reserve_a == 0) == (reserve_b == 0) && (reserve_a == 0) == (total_shares == 0)
}

impl AmmPool for Pool {
    fn address(&self) -> Address {
        self.address
    }

    fn tokens(&self) -> (Address, Address) {
        (self.token_a, self.token_b)
    }

    fn reserves(&self) -> (u128, u128) {
        (self.reserve_a, self.reserve_b)
    }

    fn fee(&self) -> FeeSchedule {
        self.params.fee
    }
}

//! Liquidity Manager
//!
//! Mints shares on deposit and burns them on withdrawal. The first deposit
//! into an empty pool mints `isqrt(a * b)` in total, of which the pool's
//! `minimum_liquidity` is locked for good.

use crate::ledger::{Operation, PoolLedger};
use crate::pool::Pool;
use amm::{AmmPool, LiquidityMath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use types::{Address, AmmResult};

/// Result of a deposit (or a preview of one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub pool: Address,
    pub amount_a: u128,
    pub amount_b: u128,
    /// Shares credited to the depositor
    pub shares_minted: u128,
    /// Shares credited to the lock sink; non-zero only for the first deposit
    pub shares_locked: u128,
}

/// Result of a withdrawal (or a preview of one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub pool: Address,
    pub shares_burned: u128,
    pub amount_a: u128,
    pub amount_b: u128,
}

pub struct LiquidityManager {
    ledger: Arc<PoolLedger>,
}

impl LiquidityManager {
    pub fn new(ledger: Arc<PoolLedger>) -> Self {
        Self { ledger }
    }

    /// Deposit math against a pool record, without touching it
    pub fn preview_deposit(pool: &Pool, amount_a: u128, amount_b: u128) -> AmmResult<DepositReceipt> {
        let (minted, locked) = if pool.is_empty() {
            let mint = LiquidityMath::initial_shares(
                amount_a,
                amount_b,
                pool.params().minimum_liquidity,
            )?;
            (mint.minted, mint.locked)
        } else {
            let (reserve_a, reserve_b) = pool.reserves();
            let minted = LiquidityMath::proportional_shares(
                amount_a,
                amount_b,
                reserve_a,
                reserve_b,
                pool.total_shares(),
            )?;
            (minted, 0)
        };

        Ok(DepositReceipt {
            pool: pool.address(),
            amount_a,
            amount_b,
            shares_minted: minted,
            shares_locked: locked,
        })
    }

    /// Withdrawal math against a pool record, without touching it
    pub fn preview_withdrawal(pool: &Pool, shares: u128) -> AmmResult<WithdrawalReceipt> {
        let (reserve_a, reserve_b) = pool.reserves();
        let (amount_a, amount_b) =
            LiquidityMath::redemption_amounts(shares, reserve_a, reserve_b, pool.total_shares())?;
        Ok(WithdrawalReceipt {
            pool: pool.address(),
            shares_burned: shares,
            amount_a,
            amount_b,
        })
    }

    pub fn quote_add_liquidity(&self, pool: &Address, amount_a: u128, amount_b: u128) -> AmmResult<DepositReceipt> {
        self.ledger
            .with_pool(pool, |p| Self::preview_deposit(p, amount_a, amount_b))?
    }

    pub fn quote_remove_liquidity(&self, pool: &Address, shares: u128) -> AmmResult<WithdrawalReceipt> {
        self.ledger
            .with_pool(pool, |p| Self::preview_withdrawal(p, shares))?
    }

    /// Amount of the other token matching the pool ratio for `amount` of `token_in`
    pub fn optimal_counterpart(&self, pool: &Address, token_in: &Address, amount: u128) -> AmmResult<u128> {
        self.ledger.with_pool(pool, |p| {
            let (reserve_this, reserve_other, _) = p.orient(token_in)?;
            LiquidityMath::counterpart_amount(amount, reserve_this, reserve_other)
        })?
    }

    /// Deposit both tokens; reserves grow by exactly `amount_a`/`amount_b`
    pub fn add_liquidity(&self, pool: &Address, amount_a: u128, amount_b: u128) -> AmmResult<DepositReceipt> {
        self.add_liquidity_and(pool, amount_a, amount_b, |_| Ok(()))
    }

    /// Deposit, running `settle` under the same pool write lock
    ///
    /// `settle` sees the receipt before the pool record changes. If it
    /// fails, nothing is committed and its error is returned.
    pub fn add_liquidity_and(
        &self,
        pool: &Address,
        amount_a: u128,
        amount_b: u128,
        settle: impl FnOnce(&DepositReceipt) -> AmmResult<()>,
    ) -> AmmResult<DepositReceipt> {
        let receipt = self.ledger.with_pool_mut(pool, |p| {
            let receipt = Self::preview_deposit(p, amount_a, amount_b)?;
            let total = receipt
                .shares_minted
                .checked_add(receipt.shares_locked)
                .ok_or(types::AmmError::ArithmeticOverflow("share supply"))?;
            let mut next = p.clone();
            next.apply_deposit(amount_a, amount_b, total)?;
            settle(&receipt)?;
            *p = next;
            Ok(receipt)
        })?;
        self.ledger.record(Operation::Deposit);

        info!(
            pool = %pool,
            amount_a,
            amount_b,
            shares = receipt.shares_minted,
            locked = receipt.shares_locked,
            "Added liquidity"
        );
        Ok(receipt)
    }

    /// Burn `shares` of the pool's total supply
    ///
    /// Only checks against the total supply; holder balances are the
    /// caller's concern (see `PositionBook`).
    pub fn remove_liquidity(&self, pool: &Address, shares: u128) -> AmmResult<WithdrawalReceipt> {
        self.remove_liquidity_and(pool, shares, |_, _| Ok(()))
    }

    /// Withdraw, running `settle` under the same pool write lock
    ///
    /// `settle` sees the pool as it was before the burn. If it fails,
    /// nothing is committed and its error is returned.
    pub fn remove_liquidity_and(
        &self,
        pool: &Address,
        shares: u128,
        settle: impl FnOnce(&Pool, &WithdrawalReceipt) -> AmmResult<()>,
    ) -> AmmResult<WithdrawalReceipt> {
        let receipt = self.ledger.with_pool_mut(pool, |p| {
            let receipt = Self::preview_withdrawal(p, shares)?;
            let mut next = p.clone();
            next.apply_withdrawal(shares, receipt.amount_a, receipt.amount_b)?;
            settle(p, &receipt)?;
            *p = next;
            Ok(receipt)
        })?;
        self.ledger.record(Operation::Withdrawal);

        info!(
            pool = %pool,
            shares,
            amount_a = receipt.amount_a,
            amount_b = receipt.amount_b,
            "Removed liquidity"
        );
        Ok(receipt)
    }
}

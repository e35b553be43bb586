//! Swap Engine
//!
//! Quotes swaps against pool snapshots and settles them against the ledger.
//! Settlement re-quotes under the pool's write lock, so the applied amounts
//! always come from the reserves they are applied to.

use crate::ledger::{Operation, PoolLedger};
use crate::pool::Pool;
use crate::traits::LedgerEvent;
use amm::{AmmPool, FeeSchedule, SwapMath};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use types::{Address, AmmResult};

/// Fully resolved quote for one swap against one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: u128,
    pub amount_out: u128,
    /// Portion of `amount_in` kept by the pool as fee (floor)
    pub fee_amount: u128,
    /// `amount_in / (reserve_in + amount_in)`, display only
    pub price_impact: Decimal,
    /// Reserves the quote was computed against
    pub reserve_in: u128,
    pub reserve_out: u128,
}

impl SwapQuote {
    /// Ledger event that settles exactly this quote
    pub fn to_event(&self) -> LedgerEvent {
        LedgerEvent::Swap {
            pool: self.pool,
            token_in: self.token_in,
            amount_in: self.amount_in,
            amount_out: self.amount_out,
        }
    }
}

pub struct SwapEngine {
    ledger: Arc<PoolLedger>,
}

impl SwapEngine {
    pub fn new(ledger: Arc<PoolLedger>) -> Self {
        Self { ledger }
    }

    /// Output for `amount_in` at the default 0.3% fee
    pub fn quote(reserve_in: u128, reserve_out: u128, amount_in: u128) -> AmmResult<u128> {
        Self::quote_with_fee(reserve_in, reserve_out, amount_in, FeeSchedule::DEFAULT)
    }

    pub fn quote_with_fee(
        reserve_in: u128,
        reserve_out: u128,
        amount_in: u128,
        fee: FeeSchedule,
    ) -> AmmResult<u128> {
        SwapMath::amount_out(amount_in, reserve_in, reserve_out, fee)
    }

    pub fn price_impact(reserve_in: u128, amount_in: u128) -> AmmResult<Decimal> {
        SwapMath::price_impact(amount_in, reserve_in)
    }

    /// Quote against a pool record the caller already holds
    pub fn quote_pool(pool: &Pool, token_in: &Address, amount_in: u128) -> AmmResult<SwapQuote> {
        let (reserve_in, reserve_out, token_out) = pool.orient(token_in)?;
        let fee = pool.fee();
        let amount_out = SwapMath::amount_out(amount_in, reserve_in, reserve_out, fee)?;

        Ok(SwapQuote {
            pool: pool.address(),
            token_in: *token_in,
            token_out,
            amount_in,
            amount_out,
            fee_amount: fee.fee_on(amount_in)?,
            price_impact: SwapMath::price_impact(amount_in, reserve_in)?,
            reserve_in,
            reserve_out,
        })
    }

    /// Read-only quote against the current reserves
    pub fn quote_swap(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<SwapQuote> {
        self.ledger
            .with_pool(pool, |p| Self::quote_pool(p, token_in, amount_in))?
    }

    /// Input of `token_in` needed to receive at least `amount_out`
    pub fn quote_amount_in(&self, pool: &Address, token_in: &Address, amount_out: u128) -> AmmResult<u128> {
        self.ledger
            .with_pool(pool, |p| p.get_amount_in(token_in, amount_out))?
    }

    /// Quote and settle under one write lock
    pub fn execute_swap(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<SwapQuote> {
        let quote = self.ledger.with_pool_mut(pool, |p| {
            let quote = Self::quote_pool(p, token_in, amount_in)?;
            p.apply_swap(token_in, quote.amount_in, quote.amount_out)?;
            Ok(quote)
        })?;
        self.ledger.record(Operation::Swap);

        info!(
            pool = %quote.pool,
            token_in = %quote.token_in,
            token_out = %quote.token_out,
            amount_in = quote.amount_in,
            amount_out = quote.amount_out,
            fee = quote.fee_amount,
            "Executed swap"
        );
        Ok(quote)
    }
}

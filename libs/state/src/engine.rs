//! AMM Engine facade
//!
//! Wires the ledger, swap engine, liquidity manager, router and position
//! book together behind one handle. Every component shares the same
//! `Arc<PoolLedger>`.

use crate::ledger::{LedgerSnapshot, LedgerStats, PoolLedger};
use crate::liquidity::{DepositReceipt, LiquidityManager, WithdrawalReceipt};
use crate::pool::{Pool, PoolParams};
use crate::positions::{PositionBook, PositionEntry, LOCK_SINK};
use crate::router::{PoolRouter, Route, RouteQuote};
use crate::swap::{SwapEngine, SwapQuote};
use amm::AmmPool;
use anyhow::{Context, Result};
use engine_config::EngineSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use types::{Address, AmmError, AmmResult};

/// Display view of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub address: Address,
    pub name: String,
    pub token_a: Address,
    pub token_b: Address,
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub total_shares: u128,
    pub fee_numerator: u128,
    pub fee_denominator: u128,
    pub minimum_liquidity: u128,
    pub swap_count: u64,
    pub volume_a: u128,
    pub volume_b: u128,
    /// Token A priced in token B
    pub spot_price: Option<Decimal>,
}

impl From<&Pool> for PoolInfo {
    fn from(pool: &Pool) -> Self {
        let (reserve_a, reserve_b) = pool.reserves();
        let (volume_a, volume_b) = pool.volumes();
        let params = pool.params();
        Self {
            address: pool.address(),
            name: pool.name().to_string(),
            token_a: pool.token_a(),
            token_b: pool.token_b(),
            reserve_a,
            reserve_b,
            total_shares: pool.total_shares(),
            fee_numerator: params.fee.numerator(),
            fee_denominator: params.fee.denominator(),
            minimum_liquidity: params.minimum_liquidity,
            swap_count: pool.swap_count(),
            volume_a,
            volume_b,
            spot_price: pool.spot_price(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EngineSnapshot {
    ledger: LedgerSnapshot,
    positions: Vec<PositionEntry>,
}

pub struct AmmEngine {
    ledger: Arc<PoolLedger>,
    swaps: SwapEngine,
    liquidity: LiquidityManager,
    router: PoolRouter,
    positions: PositionBook,
    bridge_token: Option<Address>,
    default_params: PoolParams,
}

impl Default for AmmEngine {
    fn default() -> Self {
        Self::new(None, PoolParams::default())
    }
}

impl AmmEngine {
    pub fn new(bridge_token: Option<Address>, default_params: PoolParams) -> Self {
        let ledger = Arc::new(PoolLedger::new());
        Self {
            swaps: SwapEngine::new(ledger.clone()),
            liquidity: LiquidityManager::new(ledger.clone()),
            router: PoolRouter::new(ledger.clone()),
            positions: PositionBook::new(),
            ledger,
            bridge_token,
            default_params,
        }
    }

    /// Build an engine with every configured pool created and seeded
    ///
    /// Seed liquidity is added at pool level and credited to no holder.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        settings.validate()?;

        let default_params = PoolParams {
            fee: settings.fee_schedule()?,
            minimum_liquidity: settings.engine.minimum_liquidity as u128,
        };
        let engine = Self::new(settings.bridge_token()?, default_params);

        for pool in settings.resolved_pools()? {
            let params = PoolParams {
                fee: pool.fee,
                minimum_liquidity: pool.minimum_liquidity,
            };
            engine
                .create_pool_with_params(
                    pool.address,
                    &pool.name,
                    pool.token_a.address,
                    pool.token_b.address,
                    params,
                )
                .with_context(|| format!("Failed to create pool {}", pool.name))?;

            if let Some((amount_a, amount_b)) = pool.seed {
                engine
                    .add_liquidity_detailed(&pool.address, amount_a, amount_b)
                    .with_context(|| format!("Failed to seed pool {}", pool.name))?;
            }
        }

        info!(
            pools = engine.ledger.len(),
            bridge = ?engine.bridge_token,
            "Engine initialised from settings"
        );
        Ok(engine)
    }

    pub fn bridge_token(&self) -> Option<Address> {
        self.bridge_token
    }

    pub fn default_params(&self) -> PoolParams {
        self.default_params
    }

    // Pool registry

    pub fn create_pool(
        &self,
        address: Address,
        name: &str,
        token_a: Address,
        token_b: Address,
    ) -> AmmResult<()> {
        self.create_pool_with_params(address, name, token_a, token_b, self.default_params)
    }

    /// Register a new empty pool in the ledger and the router
    pub fn create_pool_with_params(
        &self,
        address: Address,
        name: &str,
        token_a: Address,
        token_b: Address,
        params: PoolParams,
    ) -> AmmResult<()> {
        let pool = Pool::new(address, name, token_a, token_b, params)?;
        if self.ledger.contains(&address) {
            return Err(AmmError::PoolAlreadyExists(address));
        }

        // Claim the pair first so two creators of one pair cannot both win
        self.router.register(&pool)?;
        if let Err(e) = self.ledger.register(pool.clone()) {
            self.router.unregister(&pool);
            return Err(e);
        }
        Ok(())
    }

    pub fn get_reserves(&self, pool: &Address) -> AmmResult<(u128, u128)> {
        self.ledger.reserves(pool)
    }

    pub fn total_shares(&self, pool: &Address) -> AmmResult<u128> {
        self.ledger.total_shares(pool)
    }

    pub fn pool_info(&self, pool: &Address) -> AmmResult<PoolInfo> {
        self.ledger.with_pool(pool, |p| PoolInfo::from(p))
    }

    /// Every pool, ordered by address
    pub fn pools(&self) -> Vec<PoolInfo> {
        self.ledger.pools().iter().map(PoolInfo::from).collect()
    }

    pub fn pools_for_token(&self, token: &Address) -> Vec<Address> {
        self.router.pools_for_token(token)
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    // Swap operations

    pub fn quote_swap(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<u128> {
        Ok(self.swaps.quote_swap(pool, token_in, amount_in)?.amount_out)
    }

    pub fn quote_swap_detailed(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<SwapQuote> {
        self.swaps.quote_swap(pool, token_in, amount_in)
    }

    pub fn quote_amount_in(&self, pool: &Address, token_in: &Address, amount_out: u128) -> AmmResult<u128> {
        self.swaps.quote_amount_in(pool, token_in, amount_out)
    }

    pub fn execute_swap(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<u128> {
        Ok(self.swaps.execute_swap(pool, token_in, amount_in)?.amount_out)
    }

    pub fn execute_swap_detailed(&self, pool: &Address, token_in: &Address, amount_in: u128) -> AmmResult<SwapQuote> {
        self.swaps.execute_swap(pool, token_in, amount_in)
    }

    // Liquidity operations

    /// Pool-level deposit; returns the shares minted to the depositor
    pub fn add_liquidity(&self, pool: &Address, amount_a: u128, amount_b: u128) -> AmmResult<u128> {
        Ok(self.add_liquidity_detailed(pool, amount_a, amount_b)?.shares_minted)
    }

    pub fn add_liquidity_detailed(&self, pool: &Address, amount_a: u128, amount_b: u128) -> AmmResult<DepositReceipt> {
        self.liquidity
            .add_liquidity_and(pool, amount_a, amount_b, |receipt| self.credit_lock(receipt))
    }

    /// Pool-level withdrawal of shares no holder owns
    ///
    /// Only the part of the supply missing from the position book can be
    /// burned here; shares credited to a holder (or locked to the sink) are
    /// redeemed through [`withdraw_liquidity`](Self::withdraw_liquidity).
    pub fn remove_liquidity(&self, pool: &Address, shares: u128) -> AmmResult<(u128, u128)> {
        let receipt = self.remove_liquidity_detailed(pool, shares)?;
        Ok((receipt.amount_a, receipt.amount_b))
    }

    pub fn remove_liquidity_detailed(&self, pool: &Address, shares: u128) -> AmmResult<WithdrawalReceipt> {
        self.liquidity.remove_liquidity_and(pool, shares, |p, _| {
            let available = p.total_shares().saturating_sub(self.positions.attributed(pool));
            if shares > available {
                return Err(AmmError::InsufficientShares {
                    requested: shares,
                    available,
                });
            }
            Ok(())
        })
    }

    /// Shares of `pool` not credited to any holder
    pub fn unattributed_shares(&self, pool: &Address) -> AmmResult<u128> {
        self.ledger
            .with_pool(pool, |p| p.total_shares().saturating_sub(self.positions.attributed(pool)))
    }

    pub fn quote_add_liquidity(&self, pool: &Address, amount_a: u128, amount_b: u128) -> AmmResult<DepositReceipt> {
        self.liquidity.quote_add_liquidity(pool, amount_a, amount_b)
    }

    pub fn quote_remove_liquidity(&self, pool: &Address, shares: u128) -> AmmResult<WithdrawalReceipt> {
        self.liquidity.quote_remove_liquidity(pool, shares)
    }

    pub fn optimal_counterpart(&self, pool: &Address, token_in: &Address, amount: u128) -> AmmResult<u128> {
        self.liquidity.optimal_counterpart(pool, token_in, amount)
    }

    /// Deposit on behalf of `holder`, crediting the minted shares to them
    pub fn provide_liquidity(
        &self,
        pool: &Address,
        holder: &Address,
        amount_a: u128,
        amount_b: u128,
    ) -> AmmResult<DepositReceipt> {
        if *holder == LOCK_SINK {
            return Err(AmmError::InvalidAddress(holder.to_string()));
        }
        self.liquidity.add_liquidity_and(pool, amount_a, amount_b, |receipt| {
            self.positions.credit(pool, holder, receipt.shares_minted)?;
            self.credit_lock(receipt)
        })
    }

    /// Redeem shares held by `holder`
    ///
    /// The holder is debited under the pool's write lock; a rejected debit
    /// leaves the pool untouched.
    pub fn withdraw_liquidity(&self, pool: &Address, holder: &Address, shares: u128) -> AmmResult<WithdrawalReceipt> {
        self.liquidity.remove_liquidity_and(pool, shares, |_, _| {
            self.positions.debit(pool, holder, shares).map_err(|e| {
                debug!(pool = %pool, holder = %holder, shares, error = %e, "Withdrawal rejected");
                e
            })
        })
    }

    fn credit_lock(&self, receipt: &DepositReceipt) -> AmmResult<()> {
        if receipt.shares_locked > 0 {
            self.positions.credit(&receipt.pool, &LOCK_SINK, receipt.shares_locked)?;
        }
        Ok(())
    }

    pub fn share_balance(&self, pool: &Address, holder: &Address) -> u128 {
        self.positions.balance(pool, holder)
    }

    pub fn holders(&self, pool: &Address) -> Vec<(Address, u128)> {
        self.positions.holders(pool)
    }

    // Routing

    /// Route using the configured bridge token
    pub fn find_route(&self, from: &Address, to: &Address) -> AmmResult<Route> {
        self.router.find_route(from, to, self.bridge_token.as_ref())
    }

    pub fn find_route_via(&self, from: &Address, to: &Address, bridge: Option<&Address>) -> AmmResult<Route> {
        self.router.find_route(from, to, bridge)
    }

    pub fn quote_route(&self, route: &Route, amount_in: u128) -> AmmResult<RouteQuote> {
        self.router.quote_route(route, amount_in)
    }

    // Persistence

    /// Ledger and holder balances as one binary blob
    pub fn snapshot(&self) -> AmmResult<Vec<u8>> {
        let snapshot = EngineSnapshot {
            ledger: self.ledger.export(),
            positions: self.positions.entries(),
        };
        bincode::serialize(&snapshot).map_err(|e| AmmError::Snapshot(e.to_string()))
    }

    /// Replace all state with a snapshot; the router is rebuilt from the pools
    ///
    /// The whole snapshot is checked before anything is replaced, so a
    /// rejected snapshot leaves the engine as it was. Not meant to race
    /// with mutations on the same engine.
    pub fn restore(&self, bytes: &[u8]) -> AmmResult<()> {
        let snapshot: EngineSnapshot =
            bincode::deserialize(bytes).map_err(|e| AmmError::Snapshot(e.to_string()))?;
        validate_snapshot(&snapshot)?;

        self.ledger.import(snapshot.ledger)?;
        self.positions.load(snapshot.positions)?;
        self.router.rebuild()?;
        info!(pools = self.ledger.len(), "Engine restored from snapshot");
        Ok(())
    }
}

/// One pool per pair, and holders of a pool never own more than its supply
fn validate_snapshot(snapshot: &EngineSnapshot) -> AmmResult<()> {
    PoolLedger::validate_snapshot(&snapshot.ledger)?;

    let mut pairs = HashMap::with_capacity(snapshot.ledger.pools.len());
    let mut held: HashMap<Address, (u128, u128)> = HashMap::with_capacity(snapshot.ledger.pools.len());
    for pool in &snapshot.ledger.pools {
        if let Some(existing) = pairs.insert(pool.pair()?, pool.address()) {
            return Err(AmmError::PoolAlreadyExists(existing));
        }
        held.insert(pool.address(), (pool.total_shares(), 0));
    }

    for entry in &snapshot.positions {
        let (supply, owned) = held.get_mut(&entry.pool).ok_or_else(|| {
            AmmError::Snapshot(format!("position in unknown pool {}", entry.pool))
        })?;
        *owned = owned
            .checked_add(entry.shares)
            .ok_or(AmmError::ArithmeticOverflow("position balance"))?;
        if *owned > *supply {
            return Err(AmmError::Snapshot(format!(
                "holders of pool {} own more than its {} shares",
                entry.pool, supply
            )));
        }
    }
    Ok(())
}

//! Pool Ledger
//!
//! Owns the authoritative reserves and share supply of every pool. Each pool
//! sits behind its own `RwLock`, so writers on one pool never block readers
//! or writers on another.

use crate::pool::Pool;
use crate::traits::{LedgerEvent, Stateful};
use amm::AmmPool;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use types::{Address, AmmError, AmmResult};

/// Bumped whenever the snapshot layout changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// Manages state for all pools
#[derive(Default)]
pub struct PoolLedger {
    /// All pools indexed by full 20-byte address
    pools: DashMap<Address, Arc<RwLock<Pool>>>,

    /// Operation counters
    stats: RwLock<LedgerStats>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_pools: usize,
    /// Pools currently holding liquidity
    pub seeded_pools: usize,
    pub total_swaps: u64,
    pub total_deposits: u64,
    pub total_withdrawals: u64,
}

/// Serialized form of the whole ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub pools: Vec<Pool>,
    pub stats: LedgerStats,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation {
    Swap,
    Deposit,
    Withdrawal,
}

impl PoolLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new pool; its address must be unused
    pub fn register(&self, pool: Pool) -> AmmResult<Arc<RwLock<Pool>>> {
        pool.validate()?;
        let address = pool.address();

        let shared = match self.pools.entry(address) {
            Entry::Occupied(_) => return Err(AmmError::PoolAlreadyExists(address)),
            Entry::Vacant(slot) => {
                let shared = Arc::new(RwLock::new(pool));
                slot.insert(shared.clone());
                shared
            }
        };

        {
            let pool = shared.read();
            info!(
                pool = %address,
                name = pool.name(),
                token_a = %pool.token_a(),
                token_b = %pool.token_b(),
                "Registered pool"
            );
        }
        Ok(shared)
    }

    /// Get pool handle by address
    pub fn get_pool(&self, address: &Address) -> Option<Arc<RwLock<Pool>>> {
        self.pools.get(address).map(|entry| entry.clone())
    }

    /// Like [`get_pool`](Self::get_pool) but unknown pools are an error
    pub fn pool(&self, address: &Address) -> AmmResult<Arc<RwLock<Pool>>> {
        self.get_pool(address)
            .ok_or(AmmError::PoolNotFound(*address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.pools.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// `(reserve_a, reserve_b)` of one pool
    pub fn reserves(&self, address: &Address) -> AmmResult<(u128, u128)> {
        self.with_pool(address, |pool| pool.reserves())
    }

    pub fn total_shares(&self, address: &Address) -> AmmResult<u128> {
        self.with_pool(address, |pool| pool.total_shares())
    }

    /// Consistent copy of one pool
    pub fn snapshot_of(&self, address: &Address) -> AmmResult<Pool> {
        self.with_pool(address, Pool::clone)
    }

    /// Run `f` under the pool's read lock
    pub fn with_pool<R>(&self, address: &Address, f: impl FnOnce(&Pool) -> R) -> AmmResult<R> {
        let shared = self.pool(address)?;
        let pool = shared.read();
        Ok(f(&pool))
    }

    /// Run `f` under the pool's write lock
    ///
    /// Anything `f` reads and then writes is atomic with respect to every
    /// other operation on the same pool.
    pub fn with_pool_mut<R>(
        &self,
        address: &Address,
        f: impl FnOnce(&mut Pool) -> AmmResult<R>,
    ) -> AmmResult<R> {
        let shared = self.pool(address)?;
        let mut pool = shared.write();
        f(&mut pool)
    }

    pub fn apply_swap(
        &self,
        address: &Address,
        token_in: &Address,
        amount_in: u128,
        amount_out: u128,
    ) -> AmmResult<()> {
        self.with_pool_mut(address, |pool| pool.apply_swap(token_in, amount_in, amount_out))?;
        self.record(Operation::Swap);
        debug!(pool = %address, token_in = %token_in, amount_in, amount_out, "Applied swap");
        Ok(())
    }

    pub fn apply_deposit(
        &self,
        address: &Address,
        amount_a: u128,
        amount_b: u128,
        shares: u128,
    ) -> AmmResult<()> {
        self.with_pool_mut(address, |pool| pool.apply_deposit(amount_a, amount_b, shares))?;
        self.record(Operation::Deposit);
        debug!(pool = %address, amount_a, amount_b, shares, "Applied deposit");
        Ok(())
    }

    pub fn apply_withdrawal(
        &self,
        address: &Address,
        shares: u128,
        amount_a: u128,
        amount_b: u128,
    ) -> AmmResult<()> {
        self.with_pool_mut(address, |pool| pool.apply_withdrawal(shares, amount_a, amount_b))?;
        self.record(Operation::Withdrawal);
        debug!(pool = %address, shares, amount_a, amount_b, "Applied withdrawal");
        Ok(())
    }

    /// Apply a settled event without exclusive access to the ledger
    pub fn apply_event_shared(&self, event: &LedgerEvent) -> AmmResult<()> {
        match *event {
            LedgerEvent::Swap {
                pool,
                token_in,
                amount_in,
                amount_out,
            } => self.apply_swap(&pool, &token_in, amount_in, amount_out),
            LedgerEvent::Deposit {
                pool,
                amount_a,
                amount_b,
                shares,
            } => self.apply_deposit(&pool, amount_a, amount_b, shares),
            LedgerEvent::Withdrawal {
                pool,
                shares,
                amount_a,
                amount_b,
            } => self.apply_withdrawal(&pool, shares, amount_a, amount_b),
        }
    }

    pub(crate) fn record(&self, operation: Operation) {
        let mut stats = self.stats.write();
        match operation {
            Operation::Swap => stats.total_swaps += 1,
            Operation::Deposit => stats.total_deposits += 1,
            Operation::Withdrawal => stats.total_withdrawals += 1,
        }
    }

    /// Get statistics
    pub fn stats(&self) -> LedgerStats {
        let mut stats = self.stats.read().clone();
        stats.total_pools = self.pools.len();
        stats.seeded_pools = self
            .pools
            .iter()
            .filter(|entry| !entry.value().read().is_empty())
            .count();
        stats
    }

    /// Copies of every pool, ordered by address
    pub fn pools(&self) -> Vec<Pool> {
        let mut pools: Vec<Pool> = self
            .pools
            .iter()
            .map(|entry| entry.value().read().clone())
            .collect();
        pools.sort_by_key(|pool| pool.address());
        pools
    }

    /// Capture every pool; each pool is copied under its own read lock
    pub fn export(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            pools: self.pools(),
            stats: self.stats(),
        }
    }

    /// Structural checks on a snapshot; nothing is touched
    pub fn validate_snapshot(snapshot: &LedgerSnapshot) -> AmmResult<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AmmError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut seen = HashSet::with_capacity(snapshot.pools.len());
        for pool in &snapshot.pools {
            pool.validate()?;
            if !seen.insert(pool.address()) {
                return Err(AmmError::Snapshot(format!(
                    "duplicate pool {} in snapshot",
                    pool.address()
                )));
            }
        }
        Ok(())
    }

    /// Replace the whole ledger with `snapshot`
    ///
    /// The snapshot is fully validated before anything is replaced. Pools
    /// from the snapshot are installed first and stale ones dropped after,
    /// so a concurrent reader never finds the ledger empty. It may still
    /// see a mix of old and new pools while the swap is in progress.
    pub fn import(&self, snapshot: LedgerSnapshot) -> AmmResult<()> {
        Self::validate_snapshot(&snapshot)?;

        let count = snapshot.pools.len();
        let keep: HashSet<Address> = snapshot.pools.iter().map(|pool| pool.address()).collect();
        for pool in snapshot.pools {
            self.pools.insert(pool.address(), Arc::new(RwLock::new(pool)));
        }
        self.pools.retain(|address, _| keep.contains(address));
        *self.stats.write() = snapshot.stats;

        info!(pools = count, "Restored ledger from snapshot");
        Ok(())
    }

    /// Restore without exclusive access to the ledger
    pub fn restore_shared(&self, bytes: &[u8]) -> AmmResult<()> {
        let snapshot: LedgerSnapshot = bincode::deserialize(bytes)
            .map_err(|e| AmmError::Snapshot(e.to_string()))?;
        self.import(snapshot)
    }

    pub fn snapshot_bytes(&self) -> AmmResult<Vec<u8>> {
        bincode::serialize(&self.export()).map_err(|e| AmmError::Snapshot(e.to_string()))
    }
}

impl Stateful for PoolLedger {
    type Event = LedgerEvent;
    type Error = AmmError;

    fn apply_event(&mut self, event: Self::Event) -> Result<(), Self::Error> {
        self.apply_event_shared(&event)
    }

    fn snapshot(&self) -> Result<Vec<u8>, Self::Error> {
        self.snapshot_bytes()
    }

    fn restore(&mut self, snapshot: &[u8]) -> Result<(), Self::Error> {
        self.restore_shared(snapshot)
    }
}

//! LP share balances per holder
//!
//! The ledger only knows each pool's total share supply. The position book
//! tracks who holds those shares, including the minimum-liquidity lock
//! credited to [`LOCK_SINK`].

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::{Address, AmmError, AmmResult};

/// Holder of permanently locked shares; never allowed to redeem
pub const LOCK_SINK: Address = Address::ZERO;

/// One `(pool, holder) -> shares` balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub pool: Address,
    pub holder: Address,
    pub shares: u128,
}

#[derive(Default)]
pub struct PositionBook {
    balances: DashMap<(Address, Address), u128>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, pool: &Address, holder: &Address) -> u128 {
        self.balances
            .get(&(*pool, *holder))
            .map(|entry| *entry)
            .unwrap_or(0)
    }

    pub fn credit(&self, pool: &Address, holder: &Address, shares: u128) -> AmmResult<()> {
        let mut entry = self.balances.entry((*pool, *holder)).or_insert(0);
        *entry = entry
            .checked_add(shares)
            .ok_or(AmmError::ArithmeticOverflow("position balance"))?;
        Ok(())
    }

    /// Remove `shares` from a holder; the sink can never be debited
    pub fn debit(&self, pool: &Address, holder: &Address, shares: u128) -> AmmResult<()> {
        if shares == 0 {
            return Err(AmmError::ZeroAmount);
        }
        let key = (*pool, *holder);
        let insufficient = |available| AmmError::InsufficientShares {
            requested: shares,
            available,
        };
        if *holder == LOCK_SINK {
            return Err(insufficient(0));
        }

        let emptied = {
            let mut balance = self.balances.get_mut(&key).ok_or_else(|| insufficient(0))?;
            if *balance < shares {
                return Err(insufficient(*balance));
            }
            *balance -= shares;
            *balance == 0
        };
        if emptied {
            self.balances.remove_if(&key, |_, balance| *balance == 0);
        }
        Ok(())
    }

    /// Holders of `pool` with a non-zero balance, sorted by holder
    pub fn holders(&self, pool: &Address) -> Vec<(Address, u128)> {
        let mut holders: Vec<(Address, u128)> = self
            .balances
            .iter()
            .filter(|entry| entry.key().0 == *pool && *entry.value() > 0)
            .map(|entry| (entry.key().1, *entry.value()))
            .collect();
        holders.sort();
        holders
    }

    /// Shares of `pool` held by anyone, the sink included
    pub fn attributed(&self, pool: &Address) -> u128 {
        self.balances
            .iter()
            .filter(|entry| entry.key().0 == *pool)
            .fold(0u128, |sum, entry| sum.saturating_add(*entry.value()))
    }

    pub fn entries(&self) -> Vec<PositionEntry> {
        let mut entries: Vec<PositionEntry> = self
            .balances
            .iter()
            .filter(|entry| *entry.value() > 0)
            .map(|entry| PositionEntry {
                pool: entry.key().0,
                holder: entry.key().1,
                shares: *entry.value(),
            })
            .collect();
        entries.sort_by_key(|entry| (entry.pool, entry.holder));
        entries
    }

    /// Replace every balance
    ///
    /// New balances are written before stale ones are dropped, so readers
    /// never observe an empty book part way through.
    pub fn load(&self, entries: Vec<PositionEntry>) -> AmmResult<()> {
        let mut next: HashMap<(Address, Address), u128> = HashMap::with_capacity(entries.len());
        for entry in entries {
            let balance = next.entry((entry.pool, entry.holder)).or_insert(0);
            *balance = balance
                .checked_add(entry.shares)
                .ok_or(AmmError::ArithmeticOverflow("position balance"))?;
        }
        next.retain(|_, shares| *shares > 0);

        for (key, shares) in &next {
            self.balances.insert(*key, *shares);
        }
        self.balances.retain(|key, _| next.contains_key(key));
        Ok(())
    }
}

//! Pool Router
//!
//! At most one pool per unordered token pair. Routes are either a direct
//! hop or two hops through a single bridge token; nothing deeper is searched.

use crate::ledger::PoolLedger;
use crate::pool::Pool;
use crate::swap::SwapEngine;
use amm::AmmPool;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use types::{Address, AmmError, AmmResult, TokenPair};

/// One swap of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    Direct,
    ViaBridge { bridge: Address },
}

/// Ordered hops from `from` to `to`; derived on demand, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub from: Address,
    pub to: Address,
    pub kind: RouteKind,
    pub hops: Vec<Hop>,
}

impl Route {
    pub fn is_direct(&self) -> bool {
        self.kind == RouteKind::Direct
    }

    pub fn pools(&self) -> Vec<Address> {
        self.hops.iter().map(|hop| hop.pool).collect()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.from.short())?;
        for hop in &self.hops {
            write!(f, " -[{}]-> {}", hop.pool.short(), hop.token_out.short())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopQuote {
    pub hop: Hop,
    pub amount_in: u128,
    pub amount_out: u128,
    pub price_impact: Decimal,
}

/// End-to-end quote; hops are quoted one after another, not atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub route: Route,
    pub amount_in: u128,
    pub amount_out: u128,
    pub hops: Vec<HopQuote>,
}

pub struct PoolRouter {
    ledger: Arc<PoolLedger>,

    /// Unordered token pair -> the pool trading it
    pairs: DashMap<TokenPair, Address>,

    /// Token address -> pools containing it
    token_index: DashMap<Address, Vec<Address>>,
}

impl PoolRouter {
    pub fn new(ledger: Arc<PoolLedger>) -> Self {
        Self {
            ledger,
            pairs: DashMap::new(),
            token_index: DashMap::new(),
        }
    }

    /// Index a pool by its pair; a pair can only be claimed once
    pub fn register(&self, pool: &Pool) -> AmmResult<()> {
        let pair = pool.pair()?;
        let address = pool.address();

        match self.pairs.entry(pair) {
            Entry::Occupied(existing) => return Err(AmmError::PoolAlreadyExists(*existing.get())),
            Entry::Vacant(slot) => {
                slot.insert(address);
            }
        }
        for token in [pair.low(), pair.high()] {
            self.token_index.entry(token).or_default().push(address);
        }

        debug!(pool = %address, low = %pair.low(), high = %pair.high(), "Indexed pool pair");
        Ok(())
    }

    /// Drop a pool from both indexes
    pub fn unregister(&self, pool: &Pool) {
        let address = pool.address();
        if let Ok(pair) = pool.pair() {
            self.pairs.remove_if(&pair, |_, indexed| *indexed == address);
            for token in [pair.low(), pair.high()] {
                if let Some(mut pools) = self.token_index.get_mut(&token) {
                    pools.retain(|p| *p != address);
                }
            }
        }
    }

    /// Rebuild both indexes from ledger contents
    ///
    /// The new indexes are computed in full before either map changes.
    pub fn rebuild(&self) -> AmmResult<()> {
        let mut pairs: HashMap<TokenPair, Address> = HashMap::new();
        let mut token_index: HashMap<Address, Vec<Address>> = HashMap::new();
        for pool in self.ledger.pools() {
            let pair = pool.pair()?;
            if let Some(existing) = pairs.insert(pair, pool.address()) {
                return Err(AmmError::PoolAlreadyExists(existing));
            }
            for token in [pair.low(), pair.high()] {
                token_index.entry(token).or_default().push(pool.address());
            }
        }

        for (pair, address) in &pairs {
            self.pairs.insert(*pair, *address);
        }
        self.pairs.retain(|pair, _| pairs.contains_key(pair));
        for (token, pools) in &token_index {
            self.token_index.insert(*token, pools.clone());
        }
        self.token_index.retain(|token, _| token_index.contains_key(token));
        Ok(())
    }

    pub fn pool_for_pair(&self, a: &Address, b: &Address) -> Option<Address> {
        let pair = TokenPair::new(*a, *b).ok()?;
        self.pairs.get(&pair).map(|entry| *entry)
    }

    /// Pools containing `token`, ordered by address
    pub fn pools_for_token(&self, token: &Address) -> Vec<Address> {
        let mut pools = self
            .token_index
            .get(token)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        pools.sort();
        pools
    }

    /// Direct route if one exists, else a two-hop route through `bridge`
    pub fn find_route(&self, from: &Address, to: &Address, bridge: Option<&Address>) -> AmmResult<Route> {
        if from == to {
            return Err(AmmError::IdenticalTokens(*from));
        }

        if let Some(pool) = self.pool_for_pair(from, to) {
            return Ok(Route {
                from: *from,
                to: *to,
                kind: RouteKind::Direct,
                hops: vec![Hop {
                    pool,
                    token_in: *from,
                    token_out: *to,
                }],
            });
        }

        if let Some(bridge) = bridge.filter(|b| *b != from && *b != to) {
            if let (Some(first), Some(second)) = (
                self.pool_for_pair(from, bridge),
                self.pool_for_pair(bridge, to),
            ) {
                return Ok(Route {
                    from: *from,
                    to: *to,
                    kind: RouteKind::ViaBridge { bridge: *bridge },
                    hops: vec![
                        Hop {
                            pool: first,
                            token_in: *from,
                            token_out: *bridge,
                        },
                        Hop {
                            pool: second,
                            token_in: *bridge,
                            token_out: *to,
                        },
                    ],
                });
            }
        }

        Err(AmmError::NoRouteFound {
            from: *from,
            to: *to,
        })
    }

    /// Chain per-hop quotes, each against that pool's current reserves
    pub fn quote_route(&self, route: &Route, amount_in: u128) -> AmmResult<RouteQuote> {
        let mut hops = Vec::with_capacity(route.hops.len());
        let mut amount = amount_in;

        for hop in &route.hops {
            let quote = self.ledger.with_pool(&hop.pool, |pool| {
                SwapEngine::quote_pool(pool, &hop.token_in, amount)
            })??;
            hops.push(HopQuote {
                hop: *hop,
                amount_in: amount,
                amount_out: quote.amount_out,
                price_impact: quote.price_impact,
            });
            amount = quote.amount_out;
        }

        Ok(RouteQuote {
            route: route.clone(),
            amount_in,
            amount_out: amount,
            hops,
        })
    }
}

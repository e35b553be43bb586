//! # Pool State - Constant Product Ledger and Execution
//!
//! ## Purpose
//!
//! Authoritative in-memory state for a set of constant product pools:
//! reserves and share supply per pool, swap settlement, liquidity minting
//! and burning, holder balances, and bridge-token routing between pools.
//!
//! ## Integration Points
//!
//! - **Input Sources**: caller swap and liquidity requests, configured pool registry
//! - **Output Destinations**: settlement layer (token transfers are out of scope)
//! - **State Persistence**: bincode snapshots of the ledger and position book
//! - **Math**: every amount comes from the `amm` crate, never computed here
//!
//! ## Architecture Role
//!
//! ```text
//! caller ──► AmmEngine ──► PoolRouter ──► Route / RouteQuote
//!               │
//!               ├──► SwapEngine ───────┐
//!               ├──► LiquidityManager ─┼──► PoolLedger (DashMap<Address, Arc<RwLock<Pool>>>)
//!               └──► PositionBook      │
//!                                      └──► amm::{SwapMath, LiquidityMath}
//! ```
//!
//! ## Concurrency
//!
//! Every quote-then-apply sequence runs under the pool's write lock, so two
//! swaps on one pool serialize and never price against stale reserves.
//! Pools are independent of each other. Multi-hop routes are quoted hop by
//! hop and are not atomic across pools.

pub mod engine;
pub mod ledger;
pub mod liquidity;
pub mod pool;
pub mod positions;
pub mod router;
pub mod swap;
pub mod traits;

pub use engine::{AmmEngine, PoolInfo};
pub use ledger::{LedgerSnapshot, LedgerStats, PoolLedger, SNAPSHOT_VERSION};
pub use liquidity::{DepositReceipt, LiquidityManager, WithdrawalReceipt};
pub use pool::{Pool, PoolParams};
pub use positions::{PositionBook, PositionEntry, LOCK_SINK};
pub use router::{Hop, HopQuote, PoolRouter, Route, RouteKind, RouteQuote};
pub use swap::{SwapEngine, SwapQuote};

// Re-export core traits for convenience
pub use traits::{LedgerEvent, Stateful};

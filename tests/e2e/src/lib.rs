//! End-to-end test support for ArcSwap
//!
//! Builds engines with the reference deployment (TKA, TKB, USDC, USDT and
//! the three TKA-bridged pools) and checks ledger invariants after whole
//! scenarios run against them.

pub mod fixtures;

pub use fixtures::*;
pub use validation::{validate_empty_state, validate_share_accounting, InvariantValidator};

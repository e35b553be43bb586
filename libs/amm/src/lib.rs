//! # ArcSwap AMM Library - Exact Constant Product Mathematics
//!
//! ## Purpose
//!
//! Pure integer math for a constant product (`x * y = k`) market maker:
//! swap quotes, reverse quotes, LP share issuance and redemption, and the
//! integer square root used to seed a pool. The same functions back both the
//! read-only quoting path and the authoritative ledger mutation, so the two
//! can never disagree.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve snapshots from the pool ledger, caller amounts
//! - **Output Destinations**: swap engine, liquidity manager, route quoting
//! - **Precision**: native token units (`u128`), 256-bit intermediates
//! - **Validation**: zero amounts, empty reserves and overflow surface as [`AmmError`]
//!
//! ## Arithmetic Profile
//!
//! - **No floating point** on any authoritative path
//! - **Floor division** everywhere, matching on-chain integer semantics
//! - **Checked narrowing** from 256 to 128 bits; overflow is an error, never a wrap
//! - **Display values** (price impact, spot price) as `rust_decimal::Decimal`

pub mod liquidity_math;
pub mod pool_traits;
pub mod sqrt;
pub mod swap_math;
pub mod wide;

pub use liquidity_math::{InitialMint, LiquidityMath, MINIMUM_LIQUIDITY};
pub use pool_traits::AmmPool;
pub use sqrt::{isqrt, isqrt_u128};
pub use swap_math::{FeeSchedule, SwapMath, BPS_DENOMINATOR};

/// Common types for AMM calculations
pub use alloy_primitives::U256;
pub use rust_decimal::Decimal;
pub use types::{AmmError, AmmResult};

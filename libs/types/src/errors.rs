//! Error types for AMM pricing, liquidity and routing
//!
//! Every failure in the engine is a deterministic function of its inputs:
//! retrying the same call against the same state reproduces the same error.
//! None of these variants are transient, so no retry policy lives here.

use crate::identifiers::Address;
use thiserror::Error;

/// Result alias used throughout the engine crates
pub type AmmResult<T> = Result<T, AmmError>;

/// Errors raised by the reserve ledger, swap math, liquidity math and router
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// A zero input where a positive value is required
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Pool has no reserves, or the operation would exhaust a reserve
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    /// First deposit too small to mint shares after the minimum-liquidity lock
    #[error("Initial deposit too small: sqrt(k) = {root} does not exceed the locked minimum {minimum}")]
    InsufficientInitialLiquidity { root: u128, minimum: u128 },

    /// Deposit into a seeded pool would mint zero shares
    #[error("Deposit mints zero liquidity shares")]
    InsufficientLiquidityMinted,

    /// Burn request exceeds the available shares
    #[error("Insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    /// Neither a direct pool nor a bridge-mediated pool chain exists
    #[error("No route found from {from} to {to}")]
    NoRouteFound { from: Address, to: Address },

    /// Intermediate or final value exceeds the representable range
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// Division with a zero denominator
    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("Pool not found: {0}")]
    PoolNotFound(Address),

    /// Pool address, or the unordered token pair, is already registered
    #[error("Pool already registered: {0}")]
    PoolAlreadyExists(Address),

    #[error("Token {token} is not part of pool {pool}")]
    UnknownToken { pool: Address, token: Address },

    #[error("Token pair must be two distinct tokens, got {0} twice")]
    IdenticalTokens(Address),

    #[error("Invalid fee {numerator}/{denominator}: numerator must be below a non-zero denominator")]
    InvalidFee { numerator: u128, denominator: u128 },

    #[error("Invalid slippage tolerance: {bps} bps exceeds 10000")]
    InvalidSlippage { bps: u32 },

    /// Fixed-point amount could not be parsed in the token's precision
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Invalid address '{0}': expected 20 hex-encoded bytes")]
    InvalidAddress(String),

    /// Ledger snapshot could not be encoded, decoded or validated
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl AmmError {
    /// True for errors caused by the caller's inputs rather than pool state
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AmmError::ZeroAmount
                | AmmError::InsufficientShares { .. }
                | AmmError::IdenticalTokens(_)
                | AmmError::UnknownToken { .. }
                | AmmError::InvalidFee { .. }
                | AmmError::InvalidSlippage { .. }
                | AmmError::InvalidAmount { .. }
                | AmmError::InvalidAddress(_)
        )
    }
}

//! Token metadata and unordered token pairs
//!
//! Tokens are owned by an external registry; the engine only needs their
//! identity and decimal precision. Amounts are always expressed in the
//! token's native integer unit.

use crate::errors::{AmmError, AmmResult};
use crate::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision used by standard ERC-20 tokens
pub const DEFAULT_DECIMALS: u8 = 18;

/// Token identity as supplied by the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Parse a human-readable amount ("12.5") into native units
    pub fn parse_amount(&self, input: &str) -> AmmResult<u128> {
        crate::amount::parse_units(input, self.decimals)
    }

    /// Render native units as a human-readable decimal string
    pub fn format_amount(&self, amount: u128) -> String {
        crate::amount::format_units(amount, self.decimals)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Unordered pair of distinct tokens
///
/// `TokenPair::new(a, b) == TokenPair::new(b, a)`; the lower address is
/// always stored first so the pair can key a map directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenPair {
    low: Address,
    high: Address,
}

impl TokenPair {
    pub fn new(a: Address, b: Address) -> AmmResult<Self> {
        if a == b {
            return Err(AmmError::IdenticalTokens(a));
        }
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Address {
        self.low
    }

    pub fn high(&self) -> Address {
        self.high
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.low == *token || self.high == *token
    }

    /// The counterpart of `token`, if it belongs to the pair
    pub fn other(&self, token: &Address) -> Option<Address> {
        if *token == self.low {
            Some(self.high)
        } else if *token == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

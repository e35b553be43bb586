//! # ArcSwap Shared Types
//!
//! Identifiers, token metadata, fixed-point amounts and the unified error
//! type shared by every crate of the AMM engine.
//!
//! ## Design Principles
//!
//! - **Integers only for value**: amounts are `u128` in the token's native unit
//! - **Full identities**: pools, tokens and holders keep all 20 address bytes
//! - **One error type**: [`AmmError`] covers every deterministic engine failure
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Address, Token, TokenPair};
//!
//! let tka: Address = "0xf8BF7E1938886b6d8D7e94A93FDd7d857E425496".parse().unwrap();
//! let tkb: Address = "0xe25A6bcDAFB93762fD727d1375403506F1e4d381".parse().unwrap();
//!
//! let token = Token::new(tka, "TKA", 18);
//! assert_eq!(token.parse_amount("1.5").unwrap(), 1_500_000_000_000_000_000);
//!
//! // Pairs are unordered
//! assert_eq!(TokenPair::new(tka, tkb).unwrap(), TokenPair::new(tkb, tka).unwrap());
//! ```

pub mod amount;
pub mod errors;
pub mod identifiers;
pub mod token;

pub use amount::{format_units, parse_units, to_decimal};
pub use errors::{AmmError, AmmResult};
pub use identifiers::Address;
pub use token::{Token, TokenPair, DEFAULT_DECIMALS};

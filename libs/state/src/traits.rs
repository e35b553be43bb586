//! State Management Traits
//!
//! Core trait for components whose state can be driven by events and
//! persisted as an opaque snapshot.

use serde::{Deserialize, Serialize};
use types::Address;

/// Core trait for stateful components that can apply events
pub trait Stateful {
    /// Event type this component can handle
    type Event;

    /// Error type for failed operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Apply an event to update the state
    fn apply_event(&mut self, event: Self::Event) -> Result<(), Self::Error>;

    /// Create a snapshot of the current state
    fn snapshot(&self) -> Result<Vec<u8>, Self::Error>;

    /// Restore state from a snapshot, replacing everything held now
    fn restore(&mut self, snapshot: &[u8]) -> Result<(), Self::Error>;
}

/// Settled ledger mutations
///
/// Amounts are already computed; applying an event only checks that the
/// pool can absorb it. Replaying a journal of these events against an
/// empty ledger with the same registered pools reproduces its reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Swap {
        pool: Address,
        token_in: Address,
        amount_in: u128,
        amount_out: u128,
    },
    Deposit {
        pool: Address,
        amount_a: u128,
        amount_b: u128,
        shares: u128,
    },
    Withdrawal {
        pool: Address,
        shares: u128,
        amount_a: u128,
        amount_b: u128,
    },
}

impl LedgerEvent {
    pub fn pool(&self) -> Address {
        match self {
            LedgerEvent::Swap { pool, .. }
            | LedgerEvent::Deposit { pool, .. }
            | LedgerEvent::Withdrawal { pool, .. } => *pool,
        }
    }
}

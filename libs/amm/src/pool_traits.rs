//! Pool trait definitions for a unified quoting interface

use crate::{FeeSchedule, SwapMath};
use types::{Address, AmmError, AmmResult};

/// Read-only view of a two-token constant product pool
///
/// Implementors only expose identity, reserves and fee; orientation and
/// quoting come for free.
pub trait AmmPool {
    fn address(&self) -> Address;

    /// `(token_a, token_b)` in reserve-slot order
    fn tokens(&self) -> (Address, Address);

    /// `(reserve_a, reserve_b)`
    fn reserves(&self) -> (u128, u128);

    fn fee(&self) -> FeeSchedule;

    /// `(reserve_in, reserve_out, token_out)` for a swap paying `token_in`
    fn orient(&self, token_in: &Address) -> AmmResult<(u128, u128, Address)> {
        let (token_a, token_b) = self.tokens();
        let (reserve_a, reserve_b) = self.reserves();
        if *token_in == token_a {
            Ok((reserve_a, reserve_b, token_b))
        } else if *token_in == token_b {
            Ok((reserve_b, reserve_a, token_a))
        } else {
            Err(AmmError::UnknownToken {
                pool: self.address(),
                token: *token_in,
            })
        }
    }

    /// Output for paying `amount_in` of `token_in`
    fn get_amount_out(&self, token_in: &Address, amount_in: u128) -> AmmResult<u128> {
        let (reserve_in, reserve_out, _) = self.orient(token_in)?;
        SwapMath::amount_out(amount_in, reserve_in, reserve_out, self.fee())
    }

    /// Input of `token_in` required to receive `amount_out`
    fn get_amount_in(&self, token_in: &Address, amount_out: u128) -> AmmResult<u128> {
        let (reserve_in, reserve_out, _) = self.orient(token_in)?;
        SwapMath::amount_in(amount_out, reserve_in, reserve_out, self.fee())
    }
}

//! Terminal formatting helpers

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use types::{amount, Token};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// "12.5 TKA"
pub fn amount(token: &Token, units: u128) -> String {
    format!("{} {}", token.format_amount(units), token.symbol)
}

/// Display fraction as a percentage with four decimal places
pub fn percent(fraction: Decimal) -> String {
    format!("{}%", (fraction * Decimal::ONE_HUNDRED).round_dp(4))
}

/// Price of one whole `token_a` in `token_b`, adjusted for decimals
pub fn spot_price(token_a: &Token, token_b: &Token, reserve_a: u128, reserve_b: u128) -> String {
    let a = amount::to_decimal(reserve_a, token_a.decimals);
    let b = amount::to_decimal(reserve_b, token_b.decimals);
    match (a, b) {
        (Some(a), Some(b)) if !a.is_zero() => match b.checked_div(a) {
            Some(price) => format!("1 {} = {} {}", token_a.symbol, price.round_dp(8).normalize(), token_b.symbol),
            None => "n/a".to_string(),
        },
        _ => "empty".to_string(),
    }
}

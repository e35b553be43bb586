//! Command handlers backed by one in-process engine

use crate::render;
use amm::SwapMath;
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use engine_config::EngineSettings;
use pool_state::{AmmEngine, PoolInfo, LOCK_SINK};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use types::{Address, Token};

pub struct App {
    engine: AmmEngine,
    settings: EngineSettings,
    tokens: HashMap<Address, Token>,
    json: bool,
}

impl App {
    pub fn new(settings: EngineSettings, json: bool) -> Result<Self> {
        let engine = AmmEngine::from_settings(&settings)?;
        let tokens = settings
            .token_list()?
            .into_iter()
            .map(|token| (token.address, token))
            .collect();
        Ok(Self {
            engine,
            settings,
            tokens,
            json,
        })
    }

    pub fn engine(&self) -> &AmmEngine {
        &self.engine
    }

    /// Replace the configured state with a saved snapshot, if one exists
    pub fn load_state(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            debug!(path = %path.display(), "No snapshot yet, starting from configuration");
            return Ok(());
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        self.engine
            .restore(&bytes)
            .with_context(|| format!("Failed to restore snapshot {}", path.display()))?;
        info!(path = %path.display(), pools = self.engine.pools().len(), "Restored engine snapshot");
        Ok(())
    }

    pub fn save_state(&self, path: &Path) -> Result<()> {
        let bytes = self.engine.snapshot()?;
        fs::write(path, &bytes).with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "Saved engine snapshot");
        Ok(())
    }

    /// Registry token by symbol or address
    pub fn token(&self, key: &str) -> Result<Token> {
        self.settings.resolve_token(key)
    }

    fn token_at(&self, address: &Address) -> Token {
        self.tokens
            .get(address)
            .cloned()
            .unwrap_or_else(|| Token::new(*address, address.short(), types::DEFAULT_DECIMALS))
    }

    /// Pool by address or by its configured name (case-insensitive)
    pub fn pool(&self, key: &str) -> Result<PoolInfo> {
        if let Ok(address) = key.parse::<Address>() {
            return Ok(self.engine.pool_info(&address)?);
        }
        self.engine
            .pools()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| anyhow!("Unknown pool {:?}", key))
    }

    fn holder(key: Option<&str>) -> Result<Option<Address>> {
        key.map(|k| k.parse::<Address>().map_err(Into::into)).transpose()
    }

    pub fn pools(&self) -> Result<()> {
        let pools = self.engine.pools();
        if self.json {
            return render::print_json(&pools);
        }
        if pools.is_empty() {
            println!("No pools configured");
            return Ok(());
        }
        for info in &pools {
            let token_a = self.token_at(&info.token_a);
            let token_b = self.token_at(&info.token_b);
            println!("{} {}", info.name.green().bold(), info.address.to_string().dimmed());
            println!(
                "   reserves: {} / {}",
                render::amount(&token_a, info.reserve_a),
                render::amount(&token_b, info.reserve_b)
            );
            println!(
                "   shares:   {}",
                info.total_shares
            );
            println!(
                "   price:    {}",
                render::spot_price(&token_a, &token_b, info.reserve_a, info.reserve_b)
            );
            println!(
                "   fee:      {}/{}  swaps: {}",
                info.fee_numerator, info.fee_denominator, info.swap_count
            );
        }
        Ok(())
    }

    pub fn quote(&self, pool: &str, token_in: &str, amount: &str, slippage_bps: Option<u32>) -> Result<()> {
        let info = self.pool(pool)?;
        let token_in = self.token(token_in)?;
        let amount_in = token_in.parse_amount(amount)?;

        let quote = self
            .engine
            .quote_swap_detailed(&info.address, &token_in.address, amount_in)?;
        let minimum = slippage_bps
            .map(|bps| SwapMath::minimum_output(quote.amount_out, bps))
            .transpose()?;
        let token_out = self.token_at(&quote.token_out);

        if self.json {
            return render::print_json(&json!({
                "quote": quote,
                "minimum_output": minimum,
                "slippage_bps": slippage_bps,
            }));
        }

        println!(
            "{} {} -> {}",
            info.name.green().bold(),
            render::amount(&token_in, quote.amount_in),
            render::amount(&token_out, quote.amount_out).cyan()
        );
        println!("   fee:          {}", render::amount(&token_in, quote.fee_amount));
        println!("   price impact: {}", render::percent(quote.price_impact));
        if let (Some(minimum), Some(bps)) = (minimum, slippage_bps) {
            println!(
                "   minimum out:  {} ({} bps tolerance)",
                render::amount(&token_out, minimum),
                bps
            );
        }
        Ok(())
    }

    pub fn route(&self, from: &str, to: &str, amount: Option<&str>) -> Result<()> {
        let from = self.token(from)?;
        let to = self.token(to)?;
        let route = self.engine.find_route(&from.address, &to.address)?;

        let quote = match amount {
            Some(amount) => Some(self.engine.quote_route(&route, from.parse_amount(amount)?)?),
            None => None,
        };

        if self.json {
            return render::print_json(&json!({ "route": route, "quote": quote }));
        }

        let kind = if route.is_direct() {
            "direct".to_string()
        } else {
            let bridge = route.hops.first().map(|hop| self.token_at(&hop.token_out));
            format!("via {}", bridge.map(|t| t.symbol).unwrap_or_default())
        };
        println!("{} -> {} ({})", from.symbol.green(), to.symbol.green(), kind.cyan());
        for (i, hop) in route.hops.iter().enumerate() {
            let pool_name = self
                .engine
                .pool_info(&hop.pool)
                .map(|p| p.name)
                .unwrap_or_else(|_| hop.pool.short());
            println!(
                "   {}. {} {} -> {}",
                i + 1,
                pool_name,
                self.token_at(&hop.token_in).symbol,
                self.token_at(&hop.token_out).symbol
            );
        }
        if let Some(quote) = quote {
            for hop in &quote.hops {
                println!(
                    "   {} -> {}  impact {}",
                    render::amount(&self.token_at(&hop.hop.token_in), hop.amount_in),
                    render::amount(&self.token_at(&hop.hop.token_out), hop.amount_out),
                    render::percent(hop.price_impact).dimmed()
                );
            }
            println!("   total out: {}", render::amount(&to, quote.amount_out).cyan());
        }
        Ok(())
    }

    pub fn swap(&self, pool: &str, token_in: &str, amount: &str) -> Result<()> {
        let info = self.pool(pool)?;
        let token_in = self.token(token_in)?;
        let amount_in = token_in.parse_amount(amount)?;

        let executed = self
            .engine
            .execute_swap_detailed(&info.address, &token_in.address, amount_in)?;
        let after = self.engine.pool_info(&info.address)?;

        if self.json {
            return render::print_json(&json!({ "swap": executed, "pool": after }));
        }

        let token_out = self.token_at(&executed.token_out);
        println!(
            "✅ Swapped {} for {} in {}",
            render::amount(&token_in, executed.amount_in),
            render::amount(&token_out, executed.amount_out).cyan(),
            info.name.green()
        );
        let (token_a, token_b) = (self.token_at(&after.token_a), self.token_at(&after.token_b));
        println!(
            "   reserves: {} / {}  {}",
            render::amount(&token_a, info.reserve_a),
            render::amount(&token_b, info.reserve_b),
            "(before)".dimmed()
        );
        println!(
            "             {} / {}",
            render::amount(&token_a, after.reserve_a),
            render::amount(&token_b, after.reserve_b)
        );
        Ok(())
    }

    pub fn add_liquidity(&self, pool: &str, amount_a: &str, amount_b: &str, holder: Option<&str>) -> Result<()> {
        let info = self.pool(pool)?;
        let token_a = self.token_at(&info.token_a);
        let token_b = self.token_at(&info.token_b);
        let amount_a = token_a.parse_amount(amount_a)?;
        let amount_b = token_b.parse_amount(amount_b)?;

        let receipt = match Self::holder(holder)? {
            Some(holder) => self.engine.provide_liquidity(&info.address, &holder, amount_a, amount_b)?,
            None => self.engine.add_liquidity_detailed(&info.address, amount_a, amount_b)?,
        };

        if self.json {
            return render::print_json(&receipt);
        }

        println!(
            "✅ Deposited {} + {} into {}",
            render::amount(&token_a, receipt.amount_a),
            render::amount(&token_b, receipt.amount_b),
            info.name.green()
        );
        println!(
            "   shares minted: {}",
            receipt.shares_minted.to_string().cyan()
        );
        if receipt.shares_locked > 0 {
            println!(
                "   shares locked: {} {}",
                receipt.shares_locked,
                format!("(held by {})", LOCK_SINK).dimmed()
            );
        }
        Ok(())
    }

    /// Burn `shares` raw share units, from `holder` when given
    ///
    /// Without a holder only shares nobody owns (seed liquidity) can be burned.
    pub fn remove_liquidity(&self, pool: &str, shares: u128, holder: Option<&str>) -> Result<()> {
        let info = self.pool(pool)?;

        let receipt = match Self::holder(holder)? {
            Some(holder) => self.engine.withdraw_liquidity(&info.address, &holder, shares)?,
            None => self.engine.remove_liquidity_detailed(&info.address, shares)?,
        };

        if self.json {
            return render::print_json(&receipt);
        }

        println!(
            "✅ Burned {} shares of {}",
            receipt.shares_burned,
            info.name.green()
        );
        println!(
            "   received: {} + {}",
            render::amount(&self.token_at(&info.token_a), receipt.amount_a).cyan(),
            render::amount(&self.token_at(&info.token_b), receipt.amount_b).cyan()
        );
        Ok(())
    }

    pub fn stats(&self) -> Result<()> {
        let stats = self.engine.stats();
        if self.json {
            return render::print_json(&stats);
        }
        println!("📊 Ledger Statistics:");
        println!("   Pools:        {}", stats.total_pools);
        println!("   Seeded pools: {}", stats.seeded_pools);
        println!("   Swaps:        {}", stats.total_swaps);
        println!("   Deposits:     {}", stats.total_deposits);
        println!("   Withdrawals:  {}", stats.total_withdrawals);
        Ok(())
    }

    pub fn config(&self) -> Result<()> {
        if self.json {
            return render::print_json(&self.settings);
        }
        let rendered = self.settings.to_toml_string()?;
        if rendered.trim().is_empty() {
            bail!("Configuration rendered empty");
        }
        print!("{}", rendered);
        Ok(())
    }
}

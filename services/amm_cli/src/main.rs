//! ArcSwap command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine_config::{config_path, load_settings};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod render;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "arcswap")]
#[command(author, version, about = "Quote, route and simulate constant product pools", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment overlay (config/environments/<env>.toml)
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Engine snapshot to load before and save after mutating commands
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List pools with reserves, spot price and share supply
    Pools,
    /// Quote a swap without executing it
    Quote {
        /// Pool address or name
        #[arg(long)]
        pool: String,
        /// Token paid in, by symbol or address
        #[arg(long)]
        token_in: String,
        /// Amount paid in, as a decimal in the token's units
        #[arg(long)]
        amount: String,
        /// Slippage tolerance in basis points, for the minimum output
        #[arg(long)]
        slippage_bps: Option<u32>,
    },
    /// Find a route between two tokens
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Quote the route end to end for this input amount
        #[arg(long)]
        amount: Option<String>,
    },
    /// Execute a swap against the in-memory engine
    Swap {
        #[arg(long)]
        pool: String,
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        amount: String,
    },
    /// Deposit both tokens of a pool
    AddLiquidity {
        #[arg(long)]
        pool: String,
        #[arg(long)]
        amount_a: String,
        #[arg(long)]
        amount_b: String,
        /// Credit the minted shares to this holder
        #[arg(long)]
        holder: Option<String>,
    },
    /// Burn LP shares for both tokens
    RemoveLiquidity {
        #[arg(long)]
        pool: String,
        /// Shares to burn, in raw share units
        #[arg(long)]
        shares: u128,
        /// Debit the shares from this holder's balance
        #[arg(long)]
        holder: Option<String>,
    },
    /// Show ledger counters
    Stats,
    /// Print the effective configuration as TOML
    Config,
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Swap { .. } | Command::AddLiquidity { .. } | Command::RemoveLiquidity { .. }
        )
    }
}

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = config_path(cli.config.as_deref());
    let settings = load_settings(Some(&path), cli.env.as_deref())
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    init_logging(&settings.logging.level);
    info!("ArcSwap {}", env!("CARGO_PKG_VERSION"));
    debug!(config = %path.display(), env = ?cli.env, "Configuration loaded");

    let app = App::new(settings, cli.json)?;
    if let Some(state) = &cli.state {
        app.load_state(state)?;
    }

    let mutates = cli.command.mutates();
    match cli.command {
        Command::Pools => app.pools()?,
        Command::Quote {
            pool,
            token_in,
            amount,
            slippage_bps,
        } => app.quote(&pool, &token_in, &amount, slippage_bps)?,
        Command::Route { from, to, amount } => app.route(&from, &to, amount.as_deref())?,
        Command::Swap {
            pool,
            token_in,
            amount,
        } => app.swap(&pool, &token_in, &amount)?,
        Command::AddLiquidity {
            pool,
            amount_a,
            amount_b,
            holder,
        } => app.add_liquidity(&pool, &amount_a, &amount_b, holder.as_deref())?,
        Command::RemoveLiquidity {
            pool,
            shares,
            holder,
        } => app.remove_liquidity(&pool, shares, holder.as_deref())?,
        Command::Stats => app.stats()?,
        Command::Config => app.config()?,
    }

    if mutates {
        if let Some(state) = &cli.state {
            app.save_state(state)?;
        }
    }
    Ok(())
}

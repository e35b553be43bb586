//! Engine Configuration Module
//!
//! Loads engine settings from a base TOML file, an optional per-environment
//! overlay and `ARCSWAP__` environment variables, in that order of precedence
//! (later sources win).

use crate::defaults;
use amm::FeeSchedule;
use anyhow::{bail, ensure, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::{Address, Token, DEFAULT_DECIMALS};

/// Complete engine configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct EngineSettings {
    /// Pool economics and routing
    pub engine: EngineSection,

    pub logging: LoggingConfig,

    /// Token registry: identity and decimals
    pub tokens: Vec<TokenConfig>,

    /// Pools created (and optionally seeded) at startup
    pub pools: Vec<PoolConfig>,
}

/// Engine-wide defaults, overridable per pool
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EngineSection {
    pub fee_numerator: u64,
    pub fee_denominator: u64,
    pub minimum_liquidity: u64,
    /// Symbol or address of the token used for two-hop routes
    pub bridge_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    pub name: Option<String>,
}

/// Pool registry entry
///
/// `token_a`/`token_b` accept a configured symbol or an address. Seeds are
/// human-readable decimal amounts in each token's precision.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolConfig {
    pub name: String,
    pub address: String,
    pub token_a: String,
    pub token_b: String,
    pub seed_a: Option<String>,
    pub seed_b: Option<String>,
    pub fee_numerator: Option<u64>,
    pub fee_denominator: Option<u64>,
    pub minimum_liquidity: Option<u64>,
}

/// Pool entry with every reference resolved and every amount parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    pub name: String,
    pub address: Address,
    pub token_a: Token,
    pub token_b: Token,
    pub fee: FeeSchedule,
    pub minimum_liquidity: u128,
    /// Initial `(reserve_a, reserve_b)` deposit in native units
    pub seed: Option<(u128, u128)>,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            fee_numerator: defaults::engine::FEE_NUMERATOR,
            fee_denominator: defaults::engine::FEE_DENOMINATOR,
            minimum_liquidity: defaults::engine::MINIMUM_LIQUIDITY,
            bridge_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
        }
    }
}

impl EngineSettings {
    /// Load configuration from files with environment overrides
    ///
    /// The overlay for `environment` is looked up in an `environments/`
    /// directory next to the base file; a missing overlay is logged and
    /// skipped.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(defaults::paths::CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join(defaults::paths::ENVIRONMENTS_DIR)
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator(defaults::ENV_SEPARATOR)
                .separator(defaults::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {:?}", base))?;

        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(
            tokens = settings.tokens.len(),
            pools = settings.pools.len(),
            "Configuration loaded"
        );
        Ok(settings)
    }

    /// Parse a single TOML document, without overlays or environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective settings rendered back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Check every cross-reference and amount without building anything
    pub fn validate(&self) -> Result<()> {
        self.fee_schedule()?;
        self.token_list()?;
        self.bridge_token()?;
        self.resolved_pools()?;
        Ok(())
    }

    /// Engine-wide fee schedule
    pub fn fee_schedule(&self) -> Result<FeeSchedule> {
        FeeSchedule::new(
            self.engine.fee_numerator as u128,
            self.engine.fee_denominator as u128,
        )
        .context("Invalid engine fee")
    }

    /// Registry tokens with parsed addresses
    pub fn token_list(&self) -> Result<Vec<Token>> {
        let mut seen_symbols = HashSet::new();
        let mut seen_addresses = HashSet::new();
        let mut tokens = Vec::with_capacity(self.tokens.len());

        for entry in &self.tokens {
            let address: Address = entry
                .address
                .parse()
                .with_context(|| format!("Invalid address for token {}", entry.symbol))?;
            ensure!(
                entry.decimals <= types::amount::MAX_DECIMALS,
                "Token {} has {} decimals, at most {} supported",
                entry.symbol,
                entry.decimals,
                types::amount::MAX_DECIMALS
            );
            ensure!(
                seen_symbols.insert(entry.symbol.to_ascii_uppercase()),
                "Duplicate token symbol {}",
                entry.symbol
            );
            ensure!(
                seen_addresses.insert(address),
                "Duplicate token address {}",
                address
            );
            tokens.push(Token::new(address, entry.symbol.clone(), entry.decimals));
        }

        Ok(tokens)
    }

    /// Find a registry token by symbol (case-insensitive) or address
    pub fn resolve_token(&self, key: &str) -> Result<Token> {
        let tokens = self.token_list()?;

        if let Some(token) = tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(key)) {
            return Ok(token.clone());
        }
        if let Ok(address) = key.parse::<Address>() {
            if let Some(token) = tokens.iter().find(|t| t.address == address) {
                return Ok(token.clone());
            }
            bail!("Token {} is not in the token registry", address);
        }
        bail!("Unknown token {:?}", key)
    }

    /// Configured bridge token address, if any
    pub fn bridge_token(&self) -> Result<Option<Address>> {
        match &self.engine.bridge_token {
            Some(key) => {
                let token = self
                    .resolve_token(key)
                    .context("Invalid engine.bridge_token")?;
                Ok(Some(token.address))
            }
            None => Ok(None),
        }
    }

    /// Pool registry with tokens resolved, fees built and seeds parsed
    pub fn resolved_pools(&self) -> Result<Vec<ResolvedPool>> {
        let default_fee = self.fee_schedule()?;
        let mut seen = HashSet::new();
        let mut pools = Vec::with_capacity(self.pools.len());

        for entry in &self.pools {
            let pool = self
                .resolve_pool(entry, default_fee)
                .with_context(|| format!("Invalid pool {}", entry.name))?;
            ensure!(
                seen.insert(pool.address),
                "Duplicate pool address {}",
                pool.address
            );
            pools.push(pool);
        }

        Ok(pools)
    }

    fn resolve_pool(&self, entry: &PoolConfig, default_fee: FeeSchedule) -> Result<ResolvedPool> {
        let address: Address = entry.address.parse().context("Invalid pool address")?;
        let token_a = self.resolve_token(&entry.token_a)?;
        let token_b = self.resolve_token(&entry.token_b)?;
        ensure!(
            token_a.address != token_b.address,
            "Pool tokens must differ, both are {}",
            token_a.symbol
        );

        let fee = match (entry.fee_numerator, entry.fee_denominator) {
            (None, None) => default_fee,
            (numerator, denominator) => FeeSchedule::new(
                numerator.map_or(default_fee.numerator(), u128::from),
                denominator.map_or(default_fee.denominator(), u128::from),
            )
            .context("Invalid pool fee")?,
        };

        let seed = match (&entry.seed_a, &entry.seed_b) {
            (Some(a), Some(b)) => {
                let amount_a = token_a
                    .parse_amount(a)
                    .with_context(|| format!("Invalid seed_a {:?}", a))?;
                let amount_b = token_b
                    .parse_amount(b)
                    .with_context(|| format!("Invalid seed_b {:?}", b))?;
                Some((amount_a, amount_b))
            }
            (None, None) => None,
            _ => bail!("seed_a and seed_b must be given together"),
        };

        Ok(ResolvedPool {
            name: entry.name.clone(),
            address,
            token_a,
            token_b,
            fee,
            minimum_liquidity: entry
                .minimum_liquidity
                .unwrap_or(self.engine.minimum_liquidity) as u128,
            seed,
        })
    }
}

/// Convenience function to load and validate configuration with defaults
pub fn load_settings(path: Option<&Path>, environment: Option<&str>) -> Result<EngineSettings> {
    let settings = EngineSettings::load(path, environment)?;
    settings.validate()?;
    Ok(settings)
}

/// Base configuration path, honouring an explicit override
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(defaults::paths::CONFIG_PATH))
}

//! Deployment fixtures: the reference token set and pool layout

use engine_config::EngineSettings;
use pool_state::{AmmEngine, PoolParams};
use types::{Address, Token};

pub const TKA_ADDRESS: &str = "0xf8BF7E1938886b6d8D7e94A93FDd7d857E425496";
pub const TKB_ADDRESS: &str = "0xe25A6bcDAFB93762fD727d1375403506F1e4d381";
pub const USDC_ADDRESS: &str = "0x3600000000000000000000000000000000000000";
pub const USDT_ADDRESS: &str = "0x89B50855Aa3bE2F677cD6303Cec089B5F319D72a";

pub const TKA_TKB_POOL: &str = "0xFb2ecDB978FE3c6597F44D3e0B3B5442a6F10aAf";
pub const USDC_TKA_POOL: &str = "0xeCa87Acf0A8D038ed94BD4C755109fA1D391ca32";
pub const USDT_TKA_POOL: &str = "0xb29E57E2B5b86F0637825fb898bf53E1C1244245";

/// Parse a fixture address constant
pub fn addr(hex: &str) -> Address {
    hex.parse().expect("fixture address")
}

pub fn tka() -> Token {
    Token::new(addr(TKA_ADDRESS), "TKA", 18)
}

pub fn tkb() -> Token {
    Token::new(addr(TKB_ADDRESS), "TKB", 18)
}

pub fn usdc() -> Token {
    Token::new(addr(USDC_ADDRESS), "USDC", 6)
}

pub fn usdt() -> Token {
    Token::new(addr(USDT_ADDRESS), "USDT", 6)
}

/// Liquidity holder `n`, never the lock sink
pub fn holder(n: u64) -> Address {
    Address::from_low_u64(0xA11CE_0000 + n)
}

/// Settings equivalent to `config/arcswap.toml`
pub const DEPLOYMENT_TOML: &str = r#"
[engine]
fee_numerator = 3
fee_denominator = 1000
minimum_liquidity = 1000
bridge_token = "TKA"

[logging]
level = "warn"

[[tokens]]
symbol = "TKA"
address = "0xf8BF7E1938886b6d8D7e94A93FDd7d857E425496"
decimals = 18

[[tokens]]
symbol = "TKB"
address = "0xe25A6bcDAFB93762fD727d1375403506F1e4d381"
decimals = 18

[[tokens]]
symbol = "USDC"
address = "0x3600000000000000000000000000000000000000"
decimals = 6

[[tokens]]
symbol = "USDT"
address = "0x89B50855Aa3bE2F677cD6303Cec089B5F319D72a"
decimals = 6

[[pools]]
name = "TKA/TKB"
address = "0xFb2ecDB978FE3c6597F44D3e0B3B5442a6F10aAf"
token_a = "TKA"
token_b = "TKB"
seed_a = "10000"
seed_b = "10000"

[[pools]]
name = "USDC/TKA"
address = "0xeCa87Acf0A8D038ed94BD4C755109fA1D391ca32"
token_a = "USDC"
token_b = "TKA"
seed_a = "20000"
seed_b = "10000"

[[pools]]
name = "USDT/TKA"
address = "0xb29E57E2B5b86F0637825fb898bf53E1C1244245"
token_a = "USDT"
token_b = "TKA"
seed_a = "20000"
seed_b = "10000"
"#;

pub fn deployment_settings() -> EngineSettings {
    EngineSettings::from_toml_str(DEPLOYMENT_TOML).expect("deployment settings")
}

/// Engine built from [`DEPLOYMENT_TOML`] with every pool seeded
pub fn deployed_engine() -> AmmEngine {
    AmmEngine::from_settings(&deployment_settings()).expect("deployed engine")
}

/// Empty pools for the three deployment pairs, TKA as bridge
pub struct EngineFixture {
    params: PoolParams,
    seeds: Vec<(Address, u128, u128)>,
}

impl Default for EngineFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFixture {
    pub fn new() -> Self {
        Self {
            params: PoolParams::default(),
            seeds: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: PoolParams) -> Self {
        self.params = params;
        self
    }

    /// Seed `pool` with raw amounts once it is created
    pub fn with_seed(mut self, pool: &str, amount_a: u128, amount_b: u128) -> Self {
        self.seeds.push((addr(pool), amount_a, amount_b));
        self
    }

    pub fn build(self) -> AmmEngine {
        let engine = AmmEngine::new(Some(tka().address), self.params);
        engine
            .create_pool(addr(TKA_TKB_POOL), "TKA/TKB", tka().address, tkb().address)
            .expect("TKA/TKB pool");
        engine
            .create_pool(addr(USDC_TKA_POOL), "USDC/TKA", usdc().address, tka().address)
            .expect("USDC/TKA pool");
        engine
            .create_pool(addr(USDT_TKA_POOL), "USDT/TKA", usdt().address, tka().address)
            .expect("USDT/TKA pool");

        for (pool, amount_a, amount_b) in self.seeds {
            engine
                .add_liquidity(&pool, amount_a, amount_b)
                .expect("fixture seed");
        }
        engine
    }
}

/// Install a test subscriber once; honours RUST_LOG
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

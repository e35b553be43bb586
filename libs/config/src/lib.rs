//! # ArcSwap Engine Configuration
//!
//! Layered settings for the AMM engine: fee schedule, minimum liquidity,
//! bridge token, token registry, pool registry and logging.
//!
//! ## Sources
//!
//! 1. Base TOML file (default `config/arcswap.toml`)
//! 2. Optional overlay `environments/<env>.toml` beside the base file
//! 3. `ARCSWAP__SECTION__KEY` environment variables
//!
//! ## Usage
//!
//! ```rust
//! use engine_config::EngineSettings;
//!
//! let settings = EngineSettings::from_toml_str(r#"
//!     [engine]
//!     fee_numerator = 3
//!     fee_denominator = 1000
//! "#).unwrap();
//!
//! assert_eq!(settings.engine.minimum_liquidity, 1000);
//! settings.validate().unwrap();
//! ```

pub mod defaults;
pub mod engine_config;

pub use engine_config::{
    config_path, load_settings, EngineSection, EngineSettings, LoggingConfig, PoolConfig,
    ResolvedPool, TokenConfig,
};

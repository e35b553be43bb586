//! Engine defaults
//!
//! Values used when the configuration files leave a setting out.

/// Prefix for environment variable overrides (`ARCSWAP__ENGINE__FEE_NUMERATOR`)
pub const ENV_PREFIX: &str = "ARCSWAP";

/// Separator between the prefix and each nested key
pub const ENV_SEPARATOR: &str = "__";

/// Pool economics
pub mod engine {
    /// 0.3% trading fee: 3 / 1000 of every input
    pub const FEE_NUMERATOR: u64 = 3;
    pub const FEE_DENOMINATOR: u64 = 1_000;

    /// Shares locked on the first deposit of a pool
    pub const MINIMUM_LIQUIDITY: u64 = 1_000;
}

/// Configuration file locations
pub mod paths {
    /// Base configuration, relative to the working directory
    pub const CONFIG_PATH: &str = "config/arcswap.toml";

    /// Overlay directory, relative to the base file's directory
    pub const ENVIRONMENTS_DIR: &str = "environments";
}

pub mod logging {
    pub const LEVEL: &str = "info";
}

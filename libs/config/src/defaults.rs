//! Default values shared by the config loader and the services

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SYNTHEX";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/synthex.toml";

/// Reconciliation defaults
pub mod reconciler {
    /// Seconds between reconciliation cycles
    pub const PERIOD_SECS: u64 = 300;

    /// Low bits of the devnet identity that signs price pushes
    pub const OPERATOR_ID: u64 = 0xa1;
}

/// Chef defaults
pub mod chef {
    /// Compound fee taken from harvested rewards (basis points)
    pub const FEE_BPS: u32 = 0;

    /// Upper bound for any configured fee
    pub const MAX_FEE_BPS: u32 = 10_000;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";
}

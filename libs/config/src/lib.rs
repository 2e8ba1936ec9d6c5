//! # Synthex Configuration
//!
//! Layered configuration for the reconciliation service and the devnet it
//! drives: a TOML file, then `SYNTHEX_`-prefixed environment variables
//! (`SYNTHEX_RECONCILER__PERIOD_SECS=60`), then validation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use synthex_config::SynthexConfig;
//! use std::path::Path;
//!
//! let config = SynthexConfig::load(Some(Path::new("config/synthex.toml"))).unwrap();
//! println!("reconciling every {}s", config.reconciler.period_secs);
//! ```

pub mod defaults;
pub mod synthex_config;

pub use synthex_config::{
    load_config, LoggingSettings, NetworkSettings, ReconcilerSettings, SynthSettings,
    SynthexConfig,
};

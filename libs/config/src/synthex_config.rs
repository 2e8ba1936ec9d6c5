//! Synthex Configuration Module
//!
//! Loads the reconciler and devnet settings from a TOML file with
//! `SYNTHEX_`-prefixed environment overrides, then validates the result.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};
use types::{Address, ChainId, Sid};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthexConfig {
    pub reconciler: ReconcilerSettings,
    pub logging: LoggingSettings,
    /// Networks hosting a chef and a factory mirror
    pub networks: Vec<NetworkSettings>,
    /// Synths tracked by the reconciler
    pub synths: Vec<SynthSettings>,
}

/// Reconciliation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerSettings {
    /// Seconds between cycles
    pub period_secs: u64,
    /// Principal that signs `set_price` pushes
    pub operator: Address,
    /// Where factory state is written on shutdown (`$VAR` expanded)
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive
    pub level: String,
    pub json: bool,
}

/// One network of the deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub name: String,
    pub chain_id: ChainId,
    /// Decimals of the chef's reference collateral (6 or 18)
    #[serde(default = "default_collateral_decimals")]
    pub collateral_decimals: u8,
    /// Compound fee of the network's chef
    #[serde(default)]
    pub chef_fee_bps: u32,
}

/// A synth tracked across all networks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthSettings {
    pub sid: Sid,
    pub symbol: String,
    /// Collateral seeded into the origin pool on the devnet, whole units
    #[serde(default = "default_seed_deposit")]
    pub seed_deposit: String,
}

fn default_collateral_decimals() -> u8 {
    18
}

fn default_seed_deposit() -> String {
    "1000".to_string()
}

impl Default for SynthexConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerSettings::default(),
            logging: LoggingSettings::default(),
            networks: vec![
                NetworkSettings {
                    name: "optimism".to_string(),
                    chain_id: 10,
                    collateral_decimals: 6,
                    chef_fee_bps: defaults::chef::FEE_BPS,
                },
                NetworkSettings {
                    name: "bsc".to_string(),
                    chain_id: 56,
                    collateral_decimals: 18,
                    chef_fee_bps: defaults::chef::FEE_BPS,
                },
            ],
            synths: vec![SynthSettings {
                sid: Sid::from_parts(10, 1, 0),
                symbol: "sVELO-USDC".to_string(),
                seed_deposit: default_seed_deposit(),
            }],
        }
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            period_secs: defaults::reconciler::PERIOD_SECS,
            operator: Address::from_low_u64_be(defaults::reconciler::OPERATOR_ID),
            snapshot_path: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl SynthexConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            debug!("No configuration file given, using defaults");
        }

        // Override with environment variables (SYNTHEX_ prefix)
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator(defaults::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let raw = builder.build().context("Failed to build configuration")?;
        let mut config: Self = raw
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in path-like values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.reconciler.snapshot_path {
            let expanded = shellexpand::env(path).context("Failed to expand snapshot path")?;
            self.reconciler.snapshot_path = Some(expanded.to_string());
        }
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.reconciler.period_secs == 0 {
            bail!("reconciler.period_secs must be positive");
        }

        if self.networks.is_empty() {
            bail!("at least one network must be configured");
        }

        let mut chains = HashSet::new();
        for network in &self.networks {
            if !chains.insert(network.chain_id) {
                bail!("duplicate chain_id {} in networks", network.chain_id);
            }
            if !matches!(network.collateral_decimals, 6 | 18) {
                bail!(
                    "network '{}' collateral_decimals must be 6 or 18, got {}",
                    network.name,
                    network.collateral_decimals
                );
            }
            if network.chef_fee_bps > defaults::chef::MAX_FEE_BPS {
                bail!(
                    "network '{}' chef_fee_bps must be <= {}",
                    network.name,
                    defaults::chef::MAX_FEE_BPS
                );
            }
        }

        let mut sids = HashSet::new();
        for synth in &self.synths {
            if !sids.insert(synth.sid) {
                bail!("synth {} configured twice", synth.sid);
            }
            if !chains.contains(&synth.sid.chain()) {
                bail!(
                    "synth {} originates on chain {} which is not configured",
                    synth.symbol,
                    synth.sid.chain()
                );
            }
            if synth.symbol.is_empty() {
                bail!("synth {} has an empty symbol", synth.sid);
            }
        }

        Ok(())
    }

    /// Settings of the network with `chain_id`
    pub fn network(&self, chain_id: ChainId) -> Option<&NetworkSettings> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Render as TOML, used to write a starter config file
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration from the default path when present
pub fn load_config(path: Option<&Path>) -> Result<SynthexConfig> {
    match path {
        Some(path) => SynthexConfig::load(Some(path)),
        None => {
            let default_path = Path::new(defaults::DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                SynthexConfig::load(Some(default_path))
            } else {
                SynthexConfig::load(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    const TWO_NETWORKS: &str = r#"
[reconciler]
period_secs = 60
operator = "0x00000000000000000000000000000000000000b2"

[[networks]]
name = "optimism"
chain_id = 10
collateral_decimals = 6
chef_fee_bps = 100

[[networks]]
name = "bsc"
chain_id = 56

[[synths]]
sid = "0x000000000000000a0000000100000000"
symbol = "sVELO-USDC"
seed_deposit = "2500"
"#;

    #[test]
    fn test_default_config_validation() {
        let config = SynthexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconciler.period_secs, 300);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("synthex.toml");
        fs::write(&path, TWO_NETWORKS).unwrap();

        let config = SynthexConfig::load(Some(&path)).unwrap();

        assert_eq!(config.reconciler.period_secs, 60);
        assert_eq!(
            config.reconciler.operator,
            Address::from_low_u64_be(0xb2)
        );
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.network(10).unwrap().collateral_decimals, 6);
        assert_eq!(config.network(56).unwrap().collateral_decimals, 18);
        assert_eq!(config.network(56).unwrap().chef_fee_bps, 0);
        assert_eq!(config.synths[0].sid, Sid::from_parts(10, 1, 0));
        assert_eq!(config.synths[0].seed_deposit, "2500");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("synthex.toml");
        fs::write(&path, TWO_NETWORKS).unwrap();

        std::env::set_var("SYNTHEX_LOGGING__JSON", "true");
        let config = SynthexConfig::load(Some(&path)).unwrap();
        std::env::remove_var("SYNTHEX_LOGGING__JSON");

        assert!(config.logging.json);
    }

    #[test]
    fn test_rejects_unsupported_decimals() {
        let mut config = SynthexConfig::default();
        config.networks[0].collateral_decimals = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_chain() {
        let mut config = SynthexConfig::default();
        config.networks[1].chain_id = config.networks[0].chain_id;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_synth_with_unknown_origin() {
        let mut config = SynthexConfig::default();
        config.synths[0].sid = Sid::from_parts(42161, 1, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("written.toml");
        let original = SynthexConfig::default();
        fs::write(&path, original.to_toml_string().unwrap()).unwrap();

        let reloaded = SynthexConfig::load(Some(&path)).unwrap();
        assert_eq!(reloaded.networks.len(), original.networks.len());
        assert_eq!(reloaded.synths[0].sid, original.synths[0].sid);
    }

    #[test]
    #[serial]
    fn test_snapshot_path_expansion() {
        std::env::set_var("SNAPSHOT_TEST_DIR", "/var/lib/synthex");
        let mut config = SynthexConfig::default();
        config.reconciler.snapshot_path = Some("$SNAPSHOT_TEST_DIR/state.bin".to_string());
        config.expand_env_vars().unwrap();
        std::env::remove_var("SNAPSHOT_TEST_DIR");

        assert_eq!(
            config.reconciler.snapshot_path.as_deref(),
            Some("/var/lib/synthex/state.bin")
        );
    }
}

//! Two-coin stable pool + gauge (Curve / Convex)

use super::{check_farm, expect_amounts};
use crate::adapter::VenueAdapter;
use crate::config::{PoolConfig, StableSwapConfig};
use amm::PoolType;
use ledger::{FarmKind, Ledger, Venue};
use types::{Address, Result, SynthError, U256};

#[derive(Debug, Clone, Copy, Default)]
pub struct StableGaugeVenue;

impl VenueAdapter for StableGaugeVenue {
    type Config = StableSwapConfig;

    fn family(&self) -> PoolType {
        PoolType::StableSwap
    }

    fn decode_config(&self, config: PoolConfig) -> Result<Self::Config> {
        match config {
            PoolConfig::StableSwap(inner) => Ok(inner),
            other => Err(SynthError::Range(format!(
                "{:?} config given to a stable-swap chef",
                other.family()
            ))),
        }
    }

    fn validate(&self, ledger: &Ledger, config: &Self::Config) -> Result<()> {
        match ledger.venue(&config.pool)? {
            Venue::Stable(pool) if pool.coins == config.coins => {}
            Venue::Stable(_) => {
                return Err(SynthError::Range(format!(
                    "stable pool {:?} does not hold coins {:?}",
                    config.pool, config.coins
                )))
            }
            other => {
                return Err(SynthError::Range(format!(
                    "{:?} is a {:?} venue, not a stable pool",
                    config.pool,
                    other.pool_type()
                )))
            }
        }
        check_farm(ledger, &config.gauge, FarmKind::Gauge, &config.pool)
    }

    fn pool_tokens(&self, config: &Self::Config) -> Vec<Address> {
        config.coins.to_vec()
    }

    fn lp_token(&self, config: &Self::Config) -> Address {
        config.pool
    }

    fn farm(&self, config: &Self::Config) -> Address {
        config.gauge
    }

    fn provide(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        amounts: &[U256],
    ) -> Result<U256> {
        let amounts = expect_amounts::<2>(amounts)?;
        ledger.stable_add_liquidity(&config.pool, owner, amounts)
    }

    fn redeem(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        lp: U256,
    ) -> Result<Vec<U256>> {
        Ok(ledger.stable_remove_liquidity(&config.pool, owner, lp)?.to_vec())
    }

    fn preview_redeem(&self, ledger: &Ledger, config: &Self::Config, lp: U256) -> Result<Vec<U256>> {
        Ok(ledger.stable_preview_remove(&config.pool, lp)?.to_vec())
    }
}

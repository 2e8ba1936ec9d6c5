//! Single-asset bridge pool + LP staking (Stargate)
//!
//! Synths backed by this family carry the liquidity-staking flag in their SID.

use super::{check_farm, expect_amounts};
use crate::adapter::VenueAdapter;
use crate::config::{BridgeLiquidityConfig, PoolConfig};
use amm::PoolType;
use ledger::{FarmKind, Ledger, Venue};
use types::{Address, Result, SynthError, U256};

#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeStakingVenue;

impl VenueAdapter for BridgeStakingVenue {
    type Config = BridgeLiquidityConfig;

    fn family(&self) -> PoolType {
        PoolType::BridgeLiquidity
    }

    fn decode_config(&self, config: PoolConfig) -> Result<Self::Config> {
        match config {
            PoolConfig::BridgeLiquidity(inner) => Ok(inner),
            other => Err(SynthError::Range(format!(
                "{:?} config given to a bridge-liquidity chef",
                other.family()
            ))),
        }
    }

    fn validate(&self, ledger: &Ledger, config: &Self::Config) -> Result<()> {
        match ledger.venue(&config.pool)? {
            Venue::Bridge(pool) if pool.token == config.token => {}
            Venue::Bridge(pool) => {
                return Err(SynthError::Range(format!(
                    "bridge pool {:?} holds {:?}, not {:?}",
                    config.pool, pool.token, config.token
                )))
            }
            other => {
                return Err(SynthError::Range(format!(
                    "{:?} is a {:?} venue, not a bridge pool",
                    config.pool,
                    other.pool_type()
                )))
            }
        }
        check_farm(ledger, &config.staking, FarmKind::LpStaking, &config.pool)
    }

    fn pool_tokens(&self, config: &Self::Config) -> Vec<Address> {
        vec![config.token]
    }

    fn lp_token(&self, config: &Self::Config) -> Address {
        config.pool
    }

    fn farm(&self, config: &Self::Config) -> Address {
        config.staking
    }

    fn provide(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        amounts: &[U256],
    ) -> Result<U256> {
        let [amount] = expect_amounts::<1>(amounts)?;
        ledger.bridge_deposit(&config.pool, owner, amount)
    }

    fn redeem(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        lp: U256,
    ) -> Result<Vec<U256>> {
        Ok(vec![ledger.bridge_redeem(&config.pool, owner, lp)?])
    }

    fn preview_redeem(&self, ledger: &Ledger, config: &Self::Config, lp: U256) -> Result<Vec<U256>> {
        Ok(vec![ledger.bridge_preview_redeem(&config.pool, lp)?])
    }
}

//! Constant-product pair + MasterChef farm (Uniswap V2 / Pancake / Velodrome)

use super::{check_farm, expect_amounts};
use crate::adapter::VenueAdapter;
use crate::config::{ConstantProductConfig, PoolConfig};
use amm::PoolType;
use ledger::{FarmKind, Ledger, Venue};
use types::{Address, Result, SynthError, U256};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProductVenue;

impl VenueAdapter for ConstantProductVenue {
    type Config = ConstantProductConfig;

    fn family(&self) -> PoolType {
        PoolType::ConstantProduct
    }

    fn decode_config(&self, config: PoolConfig) -> Result<Self::Config> {
        match config {
            PoolConfig::ConstantProduct(inner) => Ok(inner),
            other => Err(SynthError::Range(format!(
                "{:?} config given to a constant-product chef",
                other.family()
            ))),
        }
    }

    fn validate(&self, ledger: &Ledger, config: &Self::Config) -> Result<()> {
        match ledger.venue(&config.pair)? {
            Venue::Pair(pair) if [pair.token0, pair.token1] == config.tokens => {}
            Venue::Pair(_) => {
                return Err(SynthError::Range(format!(
                    "pair {:?} does not hold tokens {:?}",
                    config.pair, config.tokens
                )))
            }
            other => {
                return Err(SynthError::Range(format!(
                    "{:?} is a {:?} venue, not a pair",
                    config.pair,
                    other.pool_type()
                )))
            }
        }
        check_farm(ledger, &config.farm, FarmKind::MasterChef, &config.pair)
    }

    fn pool_tokens(&self, config: &Self::Config) -> Vec<Address> {
        config.tokens.to_vec()
    }

    fn lp_token(&self, config: &Self::Config) -> Address {
        config.pair
    }

    fn farm(&self, config: &Self::Config) -> Address {
        config.farm
    }

    fn provide(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        amounts: &[U256],
    ) -> Result<U256> {
        let [amount0, amount1] = expect_amounts::<2>(amounts)?;
        // unused side of an unbalanced request stays with the owner
        let (_, _, minted) = ledger.pair_add_liquidity(&config.pair, owner, amount0, amount1)?;
        Ok(minted)
    }

    fn redeem(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        lp: U256,
    ) -> Result<Vec<U256>> {
        let (amount0, amount1) = ledger.pair_remove_liquidity(&config.pair, owner, lp)?;
        Ok(vec![amount0, amount1])
    }

    fn preview_redeem(&self, ledger: &Ledger, config: &Self::Config, lp: U256) -> Result<Vec<U256>> {
        let (amount0, amount1) = ledger.pair_preview_remove(&config.pair, lp)?;
        Ok(vec![amount0, amount1])
    }
}

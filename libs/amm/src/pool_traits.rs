//! Pool trait definitions for unified AMM interface

use crate::{StableSwapMath, StableSwapState, V2Math, V2PoolState};
use anyhow::{bail, Result};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Pool family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    ConstantProduct,
    StableSwap,
    BridgeLiquidity,
}

/// Unified two-asset pool interface used by swap routing and LP accounting
pub trait AmmPool {
    /// Output for swapping `amount_in` of coin `index_in` into the other coin
    fn get_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256>;

    /// `amount_in` valued at the pool's marginal price, no fee or impact
    fn spot_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256>;

    /// Current balances of both coins, raw units
    fn get_liquidity(&self) -> (U256, U256);

    /// Outstanding LP supply
    fn lp_supply(&self) -> U256;

    /// Underlying amounts for burning `lp` LP tokens
    fn underlying_for_lp(&self, lp: U256) -> Result<(U256, U256)>;

    fn get_fee_bps(&self) -> u32;

    fn pool_type(&self) -> PoolType;
}

impl AmmPool for V2PoolState {
    fn get_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256> {
        match index_in {
            0 => V2Math::calculate_output_amount(amount_in, self.reserve0, self.reserve1, self.fee_bps),
            1 => V2Math::calculate_output_amount(amount_in, self.reserve1, self.reserve0, self.fee_bps),
            other => bail!("Invalid coin index {}", other),
        }
    }

    fn spot_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = match index_in {
            0 => (self.reserve0, self.reserve1),
            1 => (self.reserve1, self.reserve0),
            other => bail!("Invalid coin index {}", other),
        };
        if reserve_in.is_zero() {
            bail!("Reserves must be positive");
        }
        U256::try_from(amount_in.full_mul(reserve_out) / reserve_in)
            .map_err(|_| anyhow::anyhow!("Spot quote overflow"))
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    fn lp_supply(&self) -> U256 {
        self.total_supply
    }

    fn underlying_for_lp(&self, lp: U256) -> Result<(U256, U256)> {
        V2Math::liquidity_redeemed(self, lp)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn pool_type(&self) -> PoolType {
        PoolType::ConstantProduct
    }
}

impl AmmPool for StableSwapState {
    fn get_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256> {
        if index_in > 1 {
            bail!("Invalid coin index {}", index_in);
        }
        StableSwapMath::get_dy(self, index_in, 1 - index_in, amount_in)
    }

    // pegged coins: 1:1 after decimal normalization
    fn spot_amount_out(&self, index_in: usize, amount_in: U256) -> Result<U256> {
        if index_in > 1 {
            bail!("Invalid coin index {}", index_in);
        }
        let normalized = amount_in
            .checked_mul(self.multipliers[index_in])
            .ok_or_else(|| anyhow::anyhow!("Spot quote overflow"))?;
        Ok(normalized / self.multipliers[1 - index_in])
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.balances[0], self.balances[1])
    }

    fn lp_supply(&self) -> U256 {
        self.total_supply
    }

    fn underlying_for_lp(&self, lp: U256) -> Result<(U256, U256)> {
        let out = StableSwapMath::remove_liquidity(self, lp)?;
        Ok((out[0], out[1]))
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn pool_type(&self) -> PoolType {
        PoolType::StableSwap
    }
}

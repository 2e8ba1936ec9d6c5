//! Venue records held by the ledger
//!
//! Each venue lives at its own address. Pools double as their LP token
//! (like a Uniswap pair), so LP balances sit in the ledger's token table and
//! pool reserves are the token balances held at the pool address.

use amm::{PoolType, RewardAccumulator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::{Address, U256};

/// Constant-product pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairVenue {
    pub token0: Address,
    pub token1: Address,
    pub fee_bps: u32,
}

/// Two-coin stable pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableVenue {
    pub coins: [Address; 2],
    pub decimals: [u8; 2],
    pub amp: u64,
    pub fee_bps: u32,
}

/// Single-asset bridge liquidity pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeVenue {
    pub token: Address,
    pub local_decimals: u8,
    pub shared_decimals: u8,
    /// Liquidity in shared decimals, grows with bridge fees
    pub total_liquidity: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmKind {
    MasterChef,
    Gauge,
    LpStaking,
}

/// One staker's position in a farm
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub amount: U256,
    pub reward_debt: U256,
    /// Rewards checkpointed on stake changes, paid on the next claim
    pub unclaimed: U256,
}

/// Staking contract emitting one reward token to LP stakers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    pub kind: FarmKind,
    pub lp_token: Address,
    pub reward_token: Address,
    pub rewards: RewardAccumulator,
    pub total_staked: U256,
    pub stakes: HashMap<Address, Stake>,
    pub paused: bool,
}

/// What lives at a venue address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    Pair(PairVenue),
    Stable(StableVenue),
    Bridge(BridgeVenue),
}

impl Venue {
    pub fn pool_type(&self) -> PoolType {
        match self {
            Venue::Pair(_) => PoolType::ConstantProduct,
            Venue::Stable(_) => PoolType::StableSwap,
            Venue::Bridge(_) => PoolType::BridgeLiquidity,
        }
    }

    /// Underlying tokens in pool order
    pub fn tokens(&self) -> Vec<Address> {
        match self {
            Venue::Pair(pair) => vec![pair.token0, pair.token1],
            Venue::Stable(pool) => pool.coins.to_vec(),
            Venue::Bridge(pool) => vec![pool.token],
        }
    }
}

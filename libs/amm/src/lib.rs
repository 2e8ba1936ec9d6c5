//! # Synthex AMM Library - Exact Venue Mathematics
//!
//! ## Purpose
//!
//! Integer-exact math for the liquidity venues that synthetic collateral is
//! deployed into: constant-product pairs, two-coin StableSwap pools, bridge
//! liquidity pools and MasterChef-style reward emission. Every function works
//! on raw `U256` token units so a preview computed here equals what the
//! venue returns on execution against the same state.
//!
//! ## Integration Points
//!
//! - **Input Sources**: venue state held by the in-process ledger
//! - **Output Destinations**: ledger venue operations, chef previews, swap routing
//! - **Protocol Support**: Uniswap V2-style pairs, Curve StableSwap, Stargate pools
//! - **Precision**: native token decimals preserved; stable pools normalize internally
//! - **Validation**: checked arithmetic, errors via `anyhow`
//!
//! ## Architecture Role
//!
//! The mathematical foundation under the ledger. It holds no balances and
//! knows nothing about synths; the ledger owns state and calls in here.

pub mod bridge_pool;
pub mod pool_traits;
pub mod rewards;
pub mod stable_swap;
pub mod v2_math;

pub use bridge_pool::{BridgePoolMath, BridgePoolState};
pub use pool_traits::{AmmPool, PoolType};
pub use rewards::{RewardAccumulator, ACC_PRECISION};
pub use stable_swap::{StableSwapMath, StableSwapState, N_COINS};
pub use v2_math::{V2Math, V2PoolState, MINIMUM_LIQUIDITY};

/// Common types for AMM calculations
pub use ethers_core::types::U256;

//! # Synth Chef - Yield Adapters
//!
//! ## Purpose
//!
//! Farms synth collateral in heterogeneous yield venues behind one
//! capability set: register a pool, deposit, withdraw to any token, move LP
//! in and out of the staking target, compound and harvest rewards, and
//! report the value locked in the chef's reference token.
//!
//! ## Integration Points
//!
//! - **Ledger**: executes against one network's [`ledger::Ledger`]
//! - **Swap**: converts rewards and exit proceeds through [`ledger::SwapCapability`]
//! - **Access**: entry points check capabilities through [`types::AccessControl`]
//! - **Reconciler**: reads [`YieldAdapter::get_balance_on_farm`] as the synth's TVL
//!
//! ## Architecture Role
//!
//! ```text
//! PoolConfig ──add_pool──▶ SynthChef<V: VenueAdapter> ──▶ Ledger venues + farms
//!                               │
//!                               └── swap ──▶ DexRouter
//! ```
//!
//! Families: [`StableGaugeVenue`] (stable pool + gauge),
//! [`ConstantProductVenue`] (pair + MasterChef), [`BridgeStakingVenue`]
//! (bridge pool + LP staking).

pub mod adapter;
pub mod chef;
pub mod config;
pub mod quote;
pub mod venues;

pub use adapter::{VenueAdapter, YieldAdapter};
pub use chef::{ChefSettings, ChefState, FarmPosition, SynthChef};
pub use config::{BridgeLiquidityConfig, ConstantProductConfig, PoolConfig, StableSwapConfig};
pub use quote::check_quote;
pub use venues::{BridgeStakingVenue, ConstantProductVenue, StableGaugeVenue};

pub type StableGaugeChef = SynthChef<StableGaugeVenue>;
pub type ConstantProductChef = SynthChef<ConstantProductVenue>;
pub type BridgeStakingChef = SynthChef<BridgeStakingVenue>;

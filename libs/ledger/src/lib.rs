//! # Synthex Network Ledger
//!
//! ## Purpose
//!
//! In-process model of one network: ERC-20 style balances, the liquidity
//! venues synth collateral is farmed in (constant-product pairs, stable
//! pools, bridge pools), the staking farms on top of them and a swap
//! dispatcher. Chefs and factories execute against a `Ledger` the way
//! contracts execute against chain state.
//!
//! ## Integration Points
//!
//! - **Math**: all pricing and LP accounting delegates to the `amm` crate
//! - **Chef**: snapshots the ledger around each call for revert semantics
//! - **Swap**: [`SwapCapability`] is the seam chefs use to convert tokens
//! - **Errors**: venue math failures surface as [`types::SynthError::Venue`]
//!
//! ## Architecture Role
//!
//! ```text
//! Chef ──deposit/withdraw──▶ Ledger ──math──▶ amm
//!   └──swap──▶ DexRouter ──────┘
//! ```

pub mod farms;
pub mod ledger;
pub mod pools;
pub mod swap;
pub mod token;
pub mod venues;

pub use ledger::Ledger;
pub use swap::{DexRouter, Hop, Route, RouteTable, SwapCapability};
pub use token::TokenState;
pub use venues::{BridgeVenue, Farm, FarmKind, PairVenue, Stake, StableVenue, Venue};

pub use amm::PoolType;

use types::{Result, SynthError};

/// Lift `amm` math errors into the shared taxonomy
pub(crate) trait VenueResultExt<T> {
    fn venue(self) -> Result<T>;
}

impl<T> VenueResultExt<T> for anyhow::Result<T> {
    fn venue(self) -> Result<T> {
        self.map_err(|e| SynthError::venue(e.to_string()))
    }
}

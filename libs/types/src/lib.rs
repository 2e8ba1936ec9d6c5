//! # Synthex Unified Types Library
//!
//! Shared vocabulary for the synthetic-asset core: the packed synthetic
//! identity, checked 256-bit unit arithmetic, the error taxonomy and the
//! capability-based access-control seam.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: amounts stay raw `U256` integers in native token decimals
//! - **Checked Everything**: scaling and price math fail with `Overflow`, never wrap
//! - **Pure Identifiers**: a [`Sid`] is data only, usable as a key on any network
//! - **Injected Authority**: who may mint or price is decided by an [`AccessControl`] collaborator
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Sid, units};
//! use ethers_core::types::U256;
//!
//! let sid = Sid::pack(10, 0x8000_0001, 0).unwrap();
//! assert!(sid.is_liquidity_staking_synth());
//! assert_eq!(sid.unpack(), (10, 0x8000_0001, 0));
//!
//! let usdc = units::parse_units("1000", 6).unwrap();
//! assert_eq!(units::normalize_to_18(usdc, 6).unwrap(), U256::exp10(21));
//! ```
//!
//! ## Integration Points
//!
//! - **Factory**: synth records keyed by [`Sid`], price math via [`units::mul_div`]
//! - **Chef**: pool ids, capability checks, [`SynthError`] variants
//! - **Reconciler**: SID grouping, decimal normalization, log formatting

pub mod access;
pub mod errors;
pub mod primitives;
pub mod sid;
pub mod units;

pub use access::{AccessControl, Capability, RoleTable};
pub use errors::{Result, SynthError};
pub use primitives::{ChainId, ConvertDirection, PoolId, TokenHandle};
pub use sid::{Sid, SidLabel, LIQUIDITY_STAKING_FLAG};
pub use units::{PRICE_DECIMALS, SENTINEL_MAX, SYNTH_DECIMALS};

pub use ethers_core::types::{Address, U256};

//! # Synth Reconciler
//!
//! ## Purpose
//!
//! Keeps every factory replica of a synth priced consistently. Each cycle
//! reads the collateral value locked at the synth's origin farm and the
//! circulation minted on every other network, computes
//! `tvl * 1e18 / circulation` and pushes it to all replicas.
//!
//! ## Integration Points
//!
//! - **Networks**: only through [`NetworkEndpoint`]; [`LocalNetwork`] is the in-process devnet
//! - **Ordering**: pushes go through the [`SubmissionQueue`] keyed by (network, operator)
//! - **Pricing**: [`synth_factory::price_for`]
//! - **Configuration**: [`seed::build_devnet`] turns a `SynthexConfig` into networks
//!
//! ## Architecture Role
//!
//! ```text
//!        ┌── origin_readings ── chain A (chef) ──┐
//! Reconciler ── circulation ─── chain B (factory) ── set_price ──▶ all replicas
//!        └── circulation ─────── chain C (factory) ┘
//! ```
//!
//! Consistency is eventual: replicas disagree between cycles and agree
//! after the next successful one.

pub mod devnet;
pub mod endpoint;
pub mod error;
pub mod queue;
pub mod reconciler;
pub mod seed;

pub use devnet::{LocalNetwork, NetworkSnapshot, NetworkState};
pub use endpoint::{NetworkEndpoint, OriginReading};
pub use error::{EndpointError, EndpointResult};
pub use queue::{SubmissionKey, SubmissionQueue};
pub use reconciler::{CycleReport, CycleSnapshot, Reconciler};
pub use seed::{build_devnet, DEVNET_ADMIN};

//! # Synth Factory - Issuance Ledger
//!
//! ## Purpose
//!
//! Per-network registry of synthetic assets keyed by [`types::Sid`]: deploys
//! the synth token at a CREATE2 address, mints and burns for authorized
//! principals, holds the price published by the reconciler and converts
//! between collateral and synth units.
//!
//! ## Integration Points
//!
//! - **Reconciler**: reads [`SynthFactory::circulating_supply`], pushes [`SynthFactory::set_price`]
//! - **Bridge**: remote supply arrives as [`BridgeNotification`]s
//! - **Router**: entry points `mint` / `burn` / `convert`
//!
//! ## Architecture Role
//!
//! ```text
//! Reconciler ──set_price──▶ SynthFactory (chain A)
//!            ──set_price──▶ SynthFactory (chain B) ◀── bridge notifications
//! ```
//!
//! Synth lifecycle is `Unregistered -> Active`; nothing is ever deleted.

pub mod factory;
pub mod notifications;
pub mod pricing;
pub mod record;

pub use factory::{synth_address, SynthFactory, SYNTH_INIT_CODE};
pub use notifications::{BridgeNotification, NotificationKind, RemoteSupply};
pub use pricing::{convert_amount, price_for, SUPPORTED_COLLATERAL_DECIMALS};
pub use record::{CollateralToken, FactoryState, SynthRecord};

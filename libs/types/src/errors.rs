//! Error taxonomy shared by the Factory, Chef and reconciliation layers
//!
//! Every variant is surfaced to the caller; nothing in the core retries a
//! failed mutating call on its own.

use crate::access::Capability;
use ethers_core::types::{Address, U256};
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Capability check failed for the calling principal
    #[error("principal {principal:?} lacks capability {capability:?}")]
    Unauthorized {
        principal: Address,
        capability: Capability,
    },

    /// Unknown SID, internal pool id, token or venue
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate registration or creation
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: U256, available: U256 },

    #[error("insufficient farm balance for pool {pool_id}: requested {requested}, staked {staked}")]
    InsufficientFarmBalance {
        pool_id: u32,
        requested: U256,
        staked: U256,
    },

    /// Checked arithmetic tripped; the operation is aborted, never truncated
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Value outside its representable or accepted range (RangeError)
    #[error("range error: {0}")]
    Range(String),

    /// Execution diverged from its preview beyond the accepted tolerance
    #[error("stale quote: previewed {previewed}, executed {executed}, tolerance {tolerance_bps} bps")]
    StaleQuote {
        previewed: U256,
        executed: U256,
        tolerance_bps: u32,
    },

    /// Failure raised by a venue primitive (empty pool, slippage, paused farm)
    #[error("venue error: {0}")]
    Venue(String),
}

impl SynthError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn venue(reason: impl Into<String>) -> Self {
        Self::Venue(reason.into())
    }
}

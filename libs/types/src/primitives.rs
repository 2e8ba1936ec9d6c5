//! Primitive identifiers shared across crates

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM chain id of a network
pub type ChainId = u64;

/// Internal pool id inside one Chef
pub type PoolId = u32;

/// Handle of a deployed synth token (its deterministic address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenHandle(pub Address);

impl TokenHandle {
    pub fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Display for TokenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Direction of a Factory conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertDirection {
    CollateralToSynth,
    SynthToCollateral,
}

//! Persistent factory tables

use crate::notifications::RemoteSupply;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use types::{Address, ChainId, Sid, TokenHandle, U256, SENTINEL_MAX, SYNTH_DECIMALS};

/// One synthetic asset issued by this factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthRecord {
    pub handle: TokenHandle,
    pub symbol: String,
    pub decimals: u8,
    /// 18-decimal collateral per whole synth
    pub price: U256,
    /// Supply minted on this network
    pub circulating_supply: U256,
    pub balances: BTreeMap<Address, U256>,
}

impl SynthRecord {
    pub fn new(handle: TokenHandle, symbol: String) -> Self {
        Self {
            handle,
            symbol,
            decimals: SYNTH_DECIMALS,
            price: SENTINEL_MAX,
            circulating_supply: U256::zero(),
            balances: BTreeMap::new(),
        }
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }
}

/// Reference collateral ("op token") prices are quoted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralToken {
    pub token: Address,
    pub decimals: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryState {
    pub synths: BTreeMap<Sid, SynthRecord>,
    pub collateral: Option<CollateralToken>,
    pub remote: BTreeMap<Sid, RemoteSupply>,
    /// `(source_chain, nonce)` of every applied bridge notification
    pub seen_notifications: BTreeSet<(ChainId, u64)>,
}

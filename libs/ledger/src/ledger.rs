//! Single-writer network ledger
//!
//! One `Ledger` models one network: token balances, liquidity venues,
//! staking farms and a block clock. It is `Clone` so callers can snapshot it
//! before a multi-step operation and restore it on failure, which gives the
//! all-or-nothing semantics of an on-chain transaction.

use crate::token::TokenState;
use crate::venues::{Farm, Venue};
use ethers_core::utils::get_contract_address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use types::{Address, ChainId, Result, SynthError, U256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    chain_id: ChainId,
    /// Block timestamp in seconds
    now: u64,
    /// Account that "deploys" every token and venue on this ledger
    deployer: Address,
    nonce: u64,
    pub(crate) tokens: HashMap<Address, TokenState>,
    pub(crate) venues: HashMap<Address, Venue>,
    pub(crate) farms: HashMap<Address, Farm>,
}

impl Ledger {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            now: 0,
            deployer: Address::from_low_u64_be(chain_id),
            nonce: 0,
            tokens: HashMap::new(),
            venues: HashMap::new(),
            farms: HashMap::new(),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the block clock forward
    pub fn advance_time(&mut self, secs: u64) {
        self.now = self.now.saturating_add(secs);
    }

    /// Next deployment address, derived like a CREATE from the deployer nonce
    pub(crate) fn next_address(&mut self) -> Address {
        let address = get_contract_address(self.deployer, self.nonce);
        self.nonce += 1;
        address
    }

    /// Allocate an address for a contract kept outside the ledger (factory, chef)
    pub fn reserve_address(&mut self) -> Address {
        self.next_address()
    }

    // ----- tokens -----

    /// Deploy a fresh token
    pub fn deploy_token(&mut self, symbol: &str, decimals: u8) -> Address {
        let address = self.next_address();
        self.tokens.insert(address, TokenState::new(symbol, decimals));
        debug!(chain = self.chain_id, %symbol, decimals, ?address, "token deployed");
        address
    }

    pub fn token(&self, token: &Address) -> Result<&TokenState> {
        self.tokens
            .get(token)
            .ok_or_else(|| SynthError::not_found(format!("token {token:?}")))
    }

    pub(crate) fn token_mut(&mut self, token: &Address) -> Result<&mut TokenState> {
        self.tokens
            .get_mut(token)
            .ok_or_else(|| SynthError::not_found(format!("token {token:?}")))
    }

    pub fn decimals(&self, token: &Address) -> Result<u8> {
        Ok(self.token(token)?.decimals)
    }

    pub fn symbol(&self, token: &Address) -> Result<&str> {
        Ok(self.token(token)?.symbol.as_str())
    }

    pub fn balance_of(&self, token: &Address, holder: &Address) -> U256 {
        self.tokens
            .get(token)
            .map(|t| t.balance_of(holder))
            .unwrap_or_default()
    }

    pub fn total_supply(&self, token: &Address) -> U256 {
        self.tokens
            .get(token)
            .map(|t| t.total_supply)
            .unwrap_or_default()
    }

    /// Credit freshly minted tokens; faucet for tests and devnet seeding
    pub fn mint(&mut self, token: &Address, to: Address, amount: U256) -> Result<()> {
        self.token_mut(token)?.mint(to, amount)
    }

    pub fn burn(&mut self, token: &Address, from: Address, amount: U256) -> Result<()> {
        self.token_mut(token)?.burn(from, amount)
    }

    pub fn transfer(&mut self, token: &Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.token_mut(token)?.transfer(from, to, amount)
    }

    // ----- venues -----

    pub fn venue(&self, address: &Address) -> Result<&Venue> {
        self.venues
            .get(address)
            .ok_or_else(|| SynthError::not_found(format!("venue {address:?}")))
    }

    /// Venue addresses holding both tokens
    pub fn venues_between(&self, a: &Address, b: &Address) -> Vec<Address> {
        let mut found: Vec<Address> = self
            .venues
            .iter()
            .filter(|(_, venue)| {
                let tokens = venue.tokens();
                tokens.contains(a) && tokens.contains(b)
            })
            .map(|(address, _)| *address)
            .collect();
        found.sort();
        found
    }

    pub fn farm(&self, address: &Address) -> Result<&Farm> {
        self.farms
            .get(address)
            .ok_or_else(|| SynthError::not_found(format!("farm {address:?}")))
    }

    pub(crate) fn farm_mut(&mut self, address: &Address) -> Result<&mut Farm> {
        self.farms
            .get_mut(address)
            .ok_or_else(|| SynthError::not_found(format!("farm {address:?}")))
    }
}

//! Adapter traits
//!
//! [`YieldAdapter`] is the object-safe capability set the rest of the
//! system calls. [`VenueAdapter`] is the narrow per-family seam: how to
//! decode a registration, provide and redeem liquidity, and where the LP is
//! staked. [`crate::SynthChef`] turns any `VenueAdapter` into a full
//! `YieldAdapter`; adding a venue family means adding one `VenueAdapter`.

use crate::config::PoolConfig;
use amm::PoolType;
use ledger::Ledger;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use types::{Address, PoolId, Result, U256};

/// Per-family primitives
pub trait VenueAdapter: Send + Sync + 'static {
    /// Decoded, family-specific registration
    type Config: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    fn family(&self) -> PoolType;

    /// Accept this family's variant of `config`; `Range` for any other
    fn decode_config(&self, config: PoolConfig) -> Result<Self::Config>;

    /// Check the registration against what is deployed on the ledger
    fn validate(&self, ledger: &Ledger, config: &Self::Config) -> Result<()>;

    /// Underlying collateral tokens in pool order
    fn pool_tokens(&self, config: &Self::Config) -> Vec<Address>;

    /// LP / receipt token
    fn lp_token(&self, config: &Self::Config) -> Address;

    /// Staking target the LP is deposited into
    fn farm(&self, config: &Self::Config) -> Address;

    /// Provide `amounts` from `owner` and return the LP minted
    fn provide(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        amounts: &[U256],
    ) -> Result<U256>;

    /// Burn `lp` held by `owner`, returning underlying amounts in pool order
    fn redeem(
        &self,
        ledger: &mut Ledger,
        owner: Address,
        config: &Self::Config,
        lp: U256,
    ) -> Result<Vec<U256>>;

    fn preview_redeem(&self, ledger: &Ledger, config: &Self::Config, lp: U256) -> Result<Vec<U256>>;
}

/// Capability set every chef exposes, independent of venue family
pub trait YieldAdapter: Send + Sync {
    fn family(&self) -> PoolType;

    /// Address the chef holds funds under
    fn address(&self) -> Address;

    /// Token balances are valued in
    fn reference_token(&self) -> Address;

    fn add_pool(
        &mut self,
        ledger: &Ledger,
        caller: &Address,
        pool_id: PoolId,
        config: PoolConfig,
    ) -> Result<()>;

    /// Provide the chef's own collateral and stake the LP; returns LP staked
    fn deposit(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        amounts: &[U256],
    ) -> Result<U256>;

    /// Unstake `lp_amount`, exit to `output_token` and pay `recipient`
    fn withdraw(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        output_token: Address,
        lp_amount: U256,
        recipient: Address,
    ) -> Result<U256>;

    /// Quote of [`YieldAdapter::withdraw`] at the current state
    fn preview_withdraw(
        &self,
        ledger: &Ledger,
        pool_id: PoolId,
        output_token: Address,
        lp_amount: U256,
    ) -> Result<U256>;

    /// Unstake LP into the chef's wallet without exiting liquidity
    fn withdraw_lp(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<()>;

    /// Stake LP from the chef's wallet
    fn deposit_lp(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<()>;

    /// Reinvest pending rewards; returns LP added.
    ///
    /// Zero, with rewards left pending, when nothing was pending or the
    /// claim is too small to swap into every pool token and mint LP.
    fn compound(&mut self, ledger: &mut Ledger, caller: &Address, pool_id: PoolId) -> Result<U256>;

    /// Claim rewards and pay them to the reward recipient
    fn harvest(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
    ) -> Result<(Vec<Address>, Vec<U256>)>;

    /// Value of the staked LP in the reference token at spot prices
    fn get_balance_on_farm(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256>;

    fn get_lp_amount_on_farm(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256>;

    fn get_total_lp_balance(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256> {
        self.get_lp_amount_on_farm(ledger, pool_id)
    }

    fn lp_tokens_to_pool_tokens(
        &self,
        ledger: &Ledger,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<Vec<U256>>;

    fn get_pool_tokens(&self, pool_id: PoolId) -> Result<Vec<Address>>;

    /// LP / receipt token of a registered pool
    fn lp_token(&self, pool_id: PoolId) -> Result<Address>;

    /// Rewards claimable right now
    fn pending_rewards(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256>;
}

//! Generic synth chef
//!
//! Holds the pool registry and farm positions for one network and one venue
//! family, and implements the full [`YieldAdapter`] capability set on top of
//! a [`VenueAdapter`]. Every mutating call runs inside [`SynthChef::transact`]:
//! on error the ledger and the chef state are restored to their exact
//! pre-call values.

use crate::adapter::{VenueAdapter, YieldAdapter};
use crate::config::PoolConfig;
use amm::PoolType;
use ledger::{Ledger, SwapCapability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::units::mul_div;
use types::{AccessControl, Address, Capability, PoolId, Result, SynthError, U256};

const BPS: u64 = 10_000;

/// Static chef parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefSettings {
    /// Account holding the chef's tokens and farm stakes
    pub address: Address,
    /// Token `get_balance_on_farm` is denominated in
    pub reference_token: Address,
    /// Share of compounded rewards paid to `fee_collector`
    pub fee_bps: u32,
    pub fee_collector: Address,
    /// Receives harvested rewards
    pub reward_recipient: Address,
}

/// Staked LP of one registered pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmPosition {
    pub lp_staked: U256,
}

/// Persistent chef tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefState<C> {
    pub registry: BTreeMap<PoolId, C>,
    pub positions: BTreeMap<PoolId, FarmPosition>,
}

impl<C> Default for ChefState<C> {
    fn default() -> Self {
        Self {
            registry: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }
}

pub struct SynthChef<V: VenueAdapter> {
    venue: V,
    settings: ChefSettings,
    access: Arc<dyn AccessControl>,
    swapper: Arc<dyn SwapCapability>,
    state: ChefState<V::Config>,
}

impl<V: VenueAdapter> SynthChef<V> {
    pub fn new(
        venue: V,
        settings: ChefSettings,
        access: Arc<dyn AccessControl>,
        swapper: Arc<dyn SwapCapability>,
    ) -> Result<Self> {
        if settings.fee_bps as u64 > BPS {
            return Err(SynthError::Range(format!(
                "chef fee {} bps exceeds 100%",
                settings.fee_bps
            )));
        }
        Ok(Self {
            venue,
            settings,
            access,
            swapper,
            state: ChefState::default(),
        })
    }

    /// Rebuild a chef from persisted tables
    pub fn with_state(mut self, state: ChefState<V::Config>) -> Self {
        self.state = state;
        self
    }

    pub fn settings(&self) -> &ChefSettings {
        &self.settings
    }

    pub fn state(&self) -> &ChefState<V::Config> {
        &self.state
    }

    pub fn registration(&self, pool_id: PoolId) -> Result<&V::Config> {
        self.state
            .registry
            .get(&pool_id)
            .ok_or_else(|| SynthError::not_found(format!("pool {pool_id}")))
    }

    fn position(&self, pool_id: PoolId) -> U256 {
        self.state
            .positions
            .get(&pool_id)
            .map(|p| p.lp_staked)
            .unwrap_or_default()
    }

    fn require_staked(&self, pool_id: PoolId, lp_amount: U256) -> Result<()> {
        let staked = self.position(pool_id);
        if lp_amount > staked {
            return Err(SynthError::InsufficientFarmBalance {
                pool_id,
                requested: lp_amount,
                staked,
            });
        }
        Ok(())
    }

    /// Run `op` with all-or-nothing semantics
    pub fn transact<T>(
        &mut self,
        ledger: &mut Ledger,
        label: &'static str,
        op: impl FnOnce(&mut Self, &mut Ledger) -> Result<T>,
    ) -> Result<T> {
        let ledger_before = ledger.clone();
        let state_before = self.state.clone();
        match op(self, ledger) {
            Ok(value) => Ok(value),
            Err(e) => {
                *ledger = ledger_before;
                self.state = state_before;
                warn!(chain = ledger.chain_id(), op = label, error = %e, "chef call reverted");
                Err(e)
            }
        }
    }

    fn stake(&mut self, ledger: &mut Ledger, pool_id: PoolId, lp: U256) -> Result<()> {
        let farm = self.venue.farm(self.registration(pool_id)?);
        ledger.farm_stake(&farm, self.settings.address, lp)?;
        let position = self.state.positions.entry(pool_id).or_default();
        position.lp_staked = position
            .lp_staked
            .checked_add(lp)
            .ok_or(SynthError::Overflow("farm position"))?;
        Ok(())
    }

    fn unstake(&mut self, ledger: &mut Ledger, pool_id: PoolId, lp: U256) -> Result<()> {
        self.require_staked(pool_id, lp)?;
        let farm = self.venue.farm(self.registration(pool_id)?);
        ledger.farm_unstake(&farm, self.settings.address, lp)?;
        let position = self.state.positions.entry(pool_id).or_default();
        position.lp_staked -= lp;
        Ok(())
    }

    /// Swap `reinvest` of `reward_token` into the pool tokens.
    ///
    /// `None` when any share, or what it would swap to, rounds to zero.
    fn reinvest(
        &self,
        ledger: &mut Ledger,
        config: &V::Config,
        reward_token: Address,
        reinvest: U256,
    ) -> Result<Option<Vec<U256>>> {
        if reinvest.is_zero() {
            return Ok(None);
        }
        let me = self.settings.address;
        let tokens = self.venue.pool_tokens(config);
        let legs = U256::from(tokens.len());
        let share = reinvest / legs;

        let mut portions = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            // last token takes the rounding remainder
            let portion = if i + 1 == tokens.len() {
                reinvest - share * (legs - U256::one())
            } else {
                share
            };
            let quoted = self.swapper.preview_swap(ledger, reward_token, *token, portion)?;
            if portion.is_zero() || quoted.is_zero() {
                return Ok(None);
            }
            portions.push((*token, portion));
        }

        let mut amounts = Vec::with_capacity(portions.len());
        for (token, portion) in portions {
            amounts.push(self.swapper.swap(ledger, me, reward_token, token, portion)?);
        }
        Ok(Some(amounts))
    }
}

impl<V: VenueAdapter> YieldAdapter for SynthChef<V> {
    fn family(&self) -> PoolType {
        self.venue.family()
    }

    fn address(&self) -> Address {
        self.settings.address
    }

    fn reference_token(&self) -> Address {
        self.settings.reference_token
    }

    fn add_pool(
        &mut self,
        ledger: &Ledger,
        caller: &Address,
        pool_id: PoolId,
        config: PoolConfig,
    ) -> Result<()> {
        self.access.require(caller, Capability::CanRegisterPool)?;
        if self.state.registry.contains_key(&pool_id) {
            return Err(SynthError::AlreadyExists(format!("pool {pool_id}")));
        }
        let decoded = self.venue.decode_config(config)?;
        self.venue.validate(ledger, &decoded)?;

        info!(
            chain = ledger.chain_id(),
            pool_id,
            family = ?self.venue.family(),
            tokens = ?self.venue.pool_tokens(&decoded),
            "pool registered"
        );
        self.state.registry.insert(pool_id, decoded);
        self.state.positions.insert(pool_id, FarmPosition::default());
        Ok(())
    }

    fn deposit(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        amounts: &[U256],
    ) -> Result<U256> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        let config = self.registration(pool_id)?.clone();

        let lp = self.transact(ledger, "deposit", |chef, ledger| {
            let lp = chef
                .venue
                .provide(ledger, chef.settings.address, &config, amounts)?;
            chef.stake(ledger, pool_id, lp)?;
            Ok(lp)
        })?;

        info!(
            chain = ledger.chain_id(),
            pool_id,
            amounts = ?amounts,
            lp = %lp,
            staked = %self.position(pool_id),
            "deposit"
        );
        Ok(lp)
    }

    fn withdraw(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        output_token: Address,
        lp_amount: U256,
        recipient: Address,
    ) -> Result<U256> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        let config = self.registration(pool_id)?.clone();
        self.require_staked(pool_id, lp_amount)?;

        let out = self.transact(ledger, "withdraw", |chef, ledger| {
            let me = chef.settings.address;
            chef.unstake(ledger, pool_id, lp_amount)?;
            let amounts = chef.venue.redeem(ledger, me, &config, lp_amount)?;

            let mut total = U256::zero();
            for (token, amount) in chef.venue.pool_tokens(&config).into_iter().zip(amounts) {
                let converted = chef.swapper.swap(ledger, me, token, output_token, amount)?;
                total = total
                    .checked_add(converted)
                    .ok_or(SynthError::Overflow("withdraw output"))?;
            }
            ledger.transfer(&output_token, me, recipient, total)?;
            Ok(total)
        })?;

        info!(
            chain = ledger.chain_id(),
            pool_id,
            lp = %lp_amount,
            output = %out,
            ?recipient,
            staked = %self.position(pool_id),
            "withdraw"
        );
        Ok(out)
    }

    fn preview_withdraw(
        &self,
        ledger: &Ledger,
        pool_id: PoolId,
        output_token: Address,
        lp_amount: U256,
    ) -> Result<U256> {
        let config = self.registration(pool_id)?;
        let amounts = self.lp_tokens_to_pool_tokens(ledger, pool_id, lp_amount)?;
        let mut total = U256::zero();
        for (token, amount) in self.venue.pool_tokens(config).into_iter().zip(amounts) {
            total = total
                .checked_add(self.swapper.preview_swap(ledger, token, output_token, amount)?)
                .ok_or(SynthError::Overflow("withdraw preview"))?;
        }
        Ok(total)
    }

    fn withdraw_lp(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<()> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        self.registration(pool_id)?;
        self.transact(ledger, "withdraw_lp", |chef, ledger| {
            chef.unstake(ledger, pool_id, lp_amount)
        })?;
        info!(
            chain = ledger.chain_id(),
            pool_id,
            lp = %lp_amount,
            staked = %self.position(pool_id),
            "withdraw_lp"
        );
        Ok(())
    }

    fn deposit_lp(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<()> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        self.registration(pool_id)?;
        self.transact(ledger, "deposit_lp", |chef, ledger| {
            chef.stake(ledger, pool_id, lp_amount)
        })?;
        info!(
            chain = ledger.chain_id(),
            pool_id,
            lp = %lp_amount,
            staked = %self.position(pool_id),
            "deposit_lp"
        );
        Ok(())
    }

    fn compound(&mut self, ledger: &mut Ledger, caller: &Address, pool_id: PoolId) -> Result<U256> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        let config = self.registration(pool_id)?.clone();

        if self.pending_rewards(ledger, pool_id)?.is_zero() {
            debug!(chain = ledger.chain_id(), pool_id, "compound skipped, nothing pending");
            return Ok(U256::zero());
        }

        let lp = self.transact(ledger, "compound", |chef, ledger| {
            let unclaimed = ledger.clone();
            let me = chef.settings.address;
            let farm = chef.venue.farm(&config);
            let (reward_token, claimed) = ledger.farm_claim(&farm, me)?;

            let fee = mul_div(claimed, U256::from(chef.settings.fee_bps), U256::from(BPS))?;
            if !fee.is_zero() {
                ledger.transfer(&reward_token, me, chef.settings.fee_collector, fee)?;
            }
            let reinvest = claimed - fee;

            let minted = chef
                .reinvest(ledger, &config, reward_token, reinvest)
                .and_then(|amounts| match amounts {
                    Some(amounts) => chef.venue.provide(ledger, me, &config, &amounts).map(Some),
                    None => Ok(None),
                });

            match minted {
                Ok(Some(lp)) if !lp.is_zero() => {
                    chef.stake(ledger, pool_id, lp)?;
                    Ok(lp)
                }
                Err(e) if !matches!(e, SynthError::Venue(_)) => Err(e),
                // too little to reinvest: rewards stay pending on the farm
                skipped => {
                    debug!(
                        chain = ledger.chain_id(),
                        pool_id,
                        claimed = %claimed,
                        error = ?skipped.err(),
                        "compound skipped, rewards below venue precision"
                    );
                    *ledger = unclaimed;
                    Ok(U256::zero())
                }
            }
        })?;

        info!(
            chain = ledger.chain_id(),
            pool_id,
            lp = %lp,
            staked = %self.position(pool_id),
            "compound"
        );
        Ok(lp)
    }

    fn harvest(
        &mut self,
        ledger: &mut Ledger,
        caller: &Address,
        pool_id: PoolId,
    ) -> Result<(Vec<Address>, Vec<U256>)> {
        self.access.require(caller, Capability::CanOperateFarm)?;
        let config = self.registration(pool_id)?.clone();

        let (token, amount) = self.transact(ledger, "harvest", |chef, ledger| {
            let me = chef.settings.address;
            let (token, amount) = ledger.farm_claim(&chef.venue.farm(&config), me)?;
            if !amount.is_zero() {
                ledger.transfer(&token, me, chef.settings.reward_recipient, amount)?;
            }
            Ok((token, amount))
        })?;

        info!(
            chain = ledger.chain_id(),
            pool_id,
            reward_token = ?token,
            amount = %amount,
            recipient = ?self.settings.reward_recipient,
            "harvest"
        );
        Ok((vec![token], vec![amount]))
    }

    fn get_balance_on_farm(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256> {
        let lp = self.get_lp_amount_on_farm(ledger, pool_id)?;
        if lp.is_zero() {
            return Ok(U256::zero());
        }
        let config = self.registration(pool_id)?;
        let amounts = self.lp_tokens_to_pool_tokens(ledger, pool_id, lp)?;
        let reference = self.settings.reference_token;
        let mut total = U256::zero();
        for (token, amount) in self.venue.pool_tokens(config).into_iter().zip(amounts) {
            total = total
                .checked_add(self.swapper.spot_quote(ledger, token, reference, amount)?)
                .ok_or(SynthError::Overflow("farm balance"))?;
        }
        Ok(total)
    }

    fn get_lp_amount_on_farm(&self, _ledger: &Ledger, pool_id: PoolId) -> Result<U256> {
        self.registration(pool_id)?;
        Ok(self.position(pool_id))
    }

    fn lp_tokens_to_pool_tokens(
        &self,
        ledger: &Ledger,
        pool_id: PoolId,
        lp_amount: U256,
    ) -> Result<Vec<U256>> {
        let config = self.registration(pool_id)?;
        if lp_amount.is_zero() {
            return Ok(vec![U256::zero(); self.venue.pool_tokens(config).len()]);
        }
        self.venue.preview_redeem(ledger, config, lp_amount)
    }

    fn get_pool_tokens(&self, pool_id: PoolId) -> Result<Vec<Address>> {
        Ok(self.venue.pool_tokens(self.registration(pool_id)?))
    }

    fn lp_token(&self, pool_id: PoolId) -> Result<Address> {
        Ok(self.venue.lp_token(self.registration(pool_id)?))
    }

    fn pending_rewards(&self, ledger: &Ledger, pool_id: PoolId) -> Result<U256> {
        let farm = self.venue.farm(self.registration(pool_id)?);
        ledger.farm_pending(&farm, &self.settings.address)
    }
}

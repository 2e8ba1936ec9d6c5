//! Staking farms: MasterChef pools, gauges and LP-staking contracts
//!
//! All three share one accrual model. Stake changes checkpoint pending
//! rewards into `unclaimed`, so moving LP in or out never forfeits rewards;
//! only `farm_claim` pays them out, minted fresh from the reward token.

use crate::ledger::Ledger;
use crate::venues::{Farm, FarmKind, Stake};
use crate::VenueResultExt;
use amm::RewardAccumulator;
use std::collections::HashMap;
use tracing::debug;
use types::{Address, Result, SynthError, U256};

impl Ledger {
    pub fn create_farm(
        &mut self,
        kind: FarmKind,
        lp_token: Address,
        reward_token: Address,
        rate_per_sec: U256,
    ) -> Result<Address> {
        self.token(&lp_token)?;
        self.token(&reward_token)?;
        let farm = self.next_address();
        let now = self.now();
        self.farms.insert(
            farm,
            Farm {
                kind,
                lp_token,
                reward_token,
                rewards: RewardAccumulator::new(rate_per_sec, now),
                total_staked: U256::zero(),
                stakes: HashMap::new(),
                paused: false,
            },
        );
        debug!(chain = self.chain_id(), ?farm, ?kind, %rate_per_sec, "farm created");
        Ok(farm)
    }

    /// Pause or resume deposits into a farm
    pub fn set_farm_paused(&mut self, farm: &Address, paused: bool) -> Result<()> {
        self.farm_mut(farm)?.paused = paused;
        Ok(())
    }

    /// Roll the farm accumulator to now and checkpoint `staker`
    fn checkpoint(&mut self, farm: &Address, staker: Address) -> Result<()> {
        let now = self.now();
        let entry = self.farm_mut(farm)?;
        let total = entry.total_staked;
        entry.rewards.update(now, total).venue()?;

        let stake = entry.stakes.entry(staker).or_default();
        let pending = entry.rewards.pending(stake.amount, stake.reward_debt).venue()?;
        stake.unclaimed = stake
            .unclaimed
            .checked_add(pending)
            .ok_or(SynthError::Overflow("farm rewards"))?;
        stake.reward_debt = entry.rewards.accrued(stake.amount).venue()?;
        Ok(())
    }

    fn reset_debt(&mut self, farm: &Address, staker: Address) -> Result<()> {
        let entry = self.farm_mut(farm)?;
        let stake = entry.stakes.entry(staker).or_default();
        stake.reward_debt = entry.rewards.accrued(stake.amount).venue()?;
        Ok(())
    }

    pub fn farm_stake(&mut self, farm: &Address, staker: Address, amount: U256) -> Result<()> {
        let (lp_token, paused) = {
            let entry = self.farm(farm)?;
            (entry.lp_token, entry.paused)
        };
        if paused {
            return Err(SynthError::venue(format!("farm {farm:?} is paused")));
        }
        self.checkpoint(farm, staker)?;
        self.transfer(&lp_token, staker, *farm, amount)?;

        let entry = self.farm_mut(farm)?;
        entry.total_staked += amount;
        entry.stakes.entry(staker).or_default().amount += amount;
        self.reset_debt(farm, staker)
    }

    pub fn farm_unstake(&mut self, farm: &Address, staker: Address, amount: U256) -> Result<()> {
        let staked = self.farm_staked(farm, &staker)?;
        if staked < amount {
            return Err(SynthError::InsufficientBalance {
                requested: amount,
                available: staked,
            });
        }
        self.checkpoint(farm, staker)?;

        let lp_token = {
            let entry = self.farm_mut(farm)?;
            entry.total_staked -= amount;
            entry.stakes.entry(staker).or_default().amount -= amount;
            entry.lp_token
        };
        self.reset_debt(farm, staker)?;
        self.transfer(&lp_token, *farm, staker, amount)
    }

    /// Pay out everything `staker` has earned; returns `(reward_token, amount)`
    pub fn farm_claim(&mut self, farm: &Address, staker: Address) -> Result<(Address, U256)> {
        self.checkpoint(farm, staker)?;
        let (reward_token, amount) = {
            let entry = self.farm_mut(farm)?;
            let stake = entry.stakes.entry(staker).or_default();
            let amount = std::mem::take(&mut stake.unclaimed);
            (entry.reward_token, amount)
        };
        if !amount.is_zero() {
            self.mint(&reward_token, staker, amount)?;
        }
        Ok((reward_token, amount))
    }

    /// Rewards `staker` could claim right now
    pub fn farm_pending(&self, farm: &Address, staker: &Address) -> Result<U256> {
        let entry = self.farm(farm)?;
        let stake = entry.stakes.get(staker).cloned().unwrap_or_else(Stake::default);
        let pending = entry
            .rewards
            .pending_at(self.now(), entry.total_staked, stake.amount, stake.reward_debt)
            .venue()?;
        pending
            .checked_add(stake.unclaimed)
            .ok_or(SynthError::Overflow("farm rewards"))
    }

    pub fn farm_staked(&self, farm: &Address, staker: &Address) -> Result<U256> {
        Ok(self
            .farm(farm)?
            .stakes
            .get(staker)
            .map(|s| s.amount)
            .unwrap_or_default())
    }
}

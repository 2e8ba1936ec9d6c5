//! MasterChef-style reward accrual
//!
//! A single accumulator tracks rewards per staked unit, scaled by
//! [`ACC_PRECISION`]. Each staker stores a reward debt equal to what they would
//! have earned had they staked since genesis; pending = stake·acc − debt.

use anyhow::{Context, Result};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Fixed-point scale for `acc_per_share`
pub const ACC_PRECISION: u64 = 1_000_000_000_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    /// Reward units emitted per second across all stakers
    pub rate_per_sec: U256,
    pub acc_per_share: U256,
    pub last_update: u64,
}

impl RewardAccumulator {
    pub fn new(rate_per_sec: U256, now: u64) -> Self {
        Self {
            rate_per_sec,
            acc_per_share: U256::zero(),
            last_update: now,
        }
    }

    /// Roll the accumulator forward to `now`.
    ///
    /// Time with nothing staked emits nothing.
    pub fn update(&mut self, now: u64, total_staked: U256) -> Result<()> {
        if now <= self.last_update {
            return Ok(());
        }
        if !total_staked.is_zero() {
            let elapsed = U256::from(now - self.last_update);
            let reward = elapsed
                .checked_mul(self.rate_per_sec)
                .context("reward overflow")?;
            let increment = reward
                .checked_mul(U256::from(ACC_PRECISION))
                .context("acc overflow")?
                / total_staked;
            self.acc_per_share = self
                .acc_per_share
                .checked_add(increment)
                .context("acc overflow")?;
        }
        self.last_update = now;
        Ok(())
    }

    /// Accrued-since-genesis value for `staked`, used for both debt and pending
    pub fn accrued(&self, staked: U256) -> Result<U256> {
        Ok(staked
            .checked_mul(self.acc_per_share)
            .context("accrued overflow")?
            / U256::from(ACC_PRECISION))
    }

    pub fn pending(&self, staked: U256, reward_debt: U256) -> Result<U256> {
        Ok(self.accrued(staked)?.saturating_sub(reward_debt))
    }

    /// Pending as of `now` without mutating the accumulator
    pub fn pending_at(
        &self,
        now: u64,
        total_staked: U256,
        staked: U256,
        reward_debt: U256,
    ) -> Result<U256> {
        let mut projected = self.clone();
        projected.update(now, total_staked)?;
        projected.pending(staked, reward_debt)
    }
}

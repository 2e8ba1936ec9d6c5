//! Bridge liquidity pool accounting (Stargate-style)
//!
//! Liquidity is tracked in "shared decimals" so the same pool can be mirrored
//! on networks where the token has different local decimals. Local amounts are
//! truncated to shared precision on the way in, and scaled back on the way out.

use anyhow::{bail, Context, Result};
use ethers_core::types::U256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePoolState {
    pub local_decimals: u8,
    pub shared_decimals: u8,
    /// Liquidity in shared decimals
    pub total_liquidity: U256,
    /// LP supply, minted in shared decimals
    pub total_supply: U256,
}

impl BridgePoolState {
    pub fn new(local_decimals: u8, shared_decimals: u8) -> Result<Self> {
        if shared_decimals > local_decimals {
            bail!(
                "Shared decimals {} exceed local decimals {}",
                shared_decimals,
                local_decimals
            );
        }
        Ok(Self {
            local_decimals,
            shared_decimals,
            total_liquidity: U256::zero(),
            total_supply: U256::zero(),
        })
    }

    /// `10^(local - shared)`
    pub fn convert_rate(&self) -> U256 {
        U256::exp10((self.local_decimals - self.shared_decimals) as usize)
    }

    pub fn amount_ld_to_sd(&self, amount_ld: U256) -> U256 {
        amount_ld / self.convert_rate()
    }

    pub fn amount_sd_to_ld(&self, amount_sd: U256) -> Result<U256> {
        amount_sd
            .checked_mul(self.convert_rate())
            .context("shared to local overflow")
    }
}

/// Bridge pool math functions
pub struct BridgePoolMath;

impl BridgePoolMath {
    /// LP minted for depositing `amount_ld` local units.
    ///
    /// Returns `(lp_minted, amount_sd)`; dust below shared precision stays with the caller.
    pub fn lp_for_deposit(state: &BridgePoolState, amount_ld: U256) -> Result<(U256, U256)> {
        let amount_sd = state.amount_ld_to_sd(amount_ld);
        if amount_sd.is_zero() {
            bail!("Deposit below shared precision");
        }
        let minted = if state.total_supply.is_zero() {
            amount_sd
        } else {
            if state.total_liquidity.is_zero() {
                bail!("Pool has supply but no liquidity");
            }
            amount_sd
                .checked_mul(state.total_supply)
                .context("mint overflow")?
                / state.total_liquidity
        };
        if minted.is_zero() {
            bail!("Deposit too small to mint LP");
        }
        Ok((minted, amount_sd))
    }

    /// Local amount returned for an instant redeem of `lp`.
    ///
    /// Returns `(amount_ld, amount_sd)`.
    pub fn redeem_for_lp(state: &BridgePoolState, lp: U256) -> Result<(U256, U256)> {
        if state.total_supply.is_zero() || lp > state.total_supply {
            bail!("Redeem exceeds LP supply");
        }
        let amount_sd = lp
            .checked_mul(state.total_liquidity)
            .context("redeem overflow")?
            / state.total_supply;
        Ok((state.amount_sd_to_ld(amount_sd)?, amount_sd))
    }

    /// Apply a deposit to the state
    pub fn deposit(state: &mut BridgePoolState, amount_ld: U256) -> Result<U256> {
        let (minted, amount_sd) = Self::lp_for_deposit(state, amount_ld)?;
        state.total_liquidity += amount_sd;
        state.total_supply += minted;
        Ok(minted)
    }

    /// Apply a redeem to the state, returning the local amount paid out
    pub fn redeem(state: &mut BridgePoolState, lp: U256) -> Result<U256> {
        let (amount_ld, amount_sd) = Self::redeem_for_lp(state, lp)?;
        state.total_liquidity -= amount_sd;
        state.total_supply -= lp;
        Ok(amount_ld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_rate() {
        let pool = BridgePoolState::new(18, 6).unwrap();
        assert_eq!(pool.convert_rate(), U256::exp10(12));
        assert!(BridgePoolState::new(6, 8).is_err());
    }

    #[test]
    fn test_first_deposit_mints_shared_amount() {
        let mut pool = BridgePoolState::new(18, 6).unwrap();
        let minted = BridgePoolMath::deposit(&mut pool, U256::exp10(18) * 5).unwrap();
        assert_eq!(minted, U256::from(5_000_000u64));
        assert_eq!(pool.total_liquidity, U256::from(5_000_000u64));
    }

    #[test]
    fn test_dust_below_shared_precision_rejected() {
        let pool = BridgePoolState::new(18, 6).unwrap();
        assert!(BridgePoolMath::lp_for_deposit(&pool, U256::from(999_999_999_999u64)).is_err());
    }

    #[test]
    fn test_redeem_returns_pro_rata_share() {
        let mut pool = BridgePoolState::new(6, 6).unwrap();
        BridgePoolMath::deposit(&mut pool, U256::from(1_000_000u64)).unwrap();
        // Fees accrued to the pool raise LP value
        pool.total_liquidity += U256::from(100_000u64);

        let out = BridgePoolMath::redeem(&mut pool, U256::from(500_000u64)).unwrap();
        assert_eq!(out, U256::from(550_000u64));
        assert_eq!(pool.total_supply, U256::from(500_000u64));
        assert!(BridgePoolMath::redeem(&mut pool, U256::from(500_001u64)).is_err());
    }
}

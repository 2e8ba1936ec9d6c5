//! Uniswap V2 constant-product math with exact integer calculations
//!
//! Mirrors the pair/router arithmetic on-chain so previews computed here equal
//! what an execution against the same reserves returns, wei for wei.

use anyhow::{bail, Context, Result};
use ethers_core::types::U256;

/// LP tokens permanently locked by the first mint of a pair
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Basis-point denominator for swap fees
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Pair reserves and fee structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
    pub fee_bps: u32, // Fee in basis points (30 = 0.3%)
}

/// V2 AMM math functions
pub struct V2Math;

impl V2Math {
    /// Exact output amount for an input using the x*y=k formula
    ///
    /// # Arguments
    /// * `amount_in` - Input token amount (raw units)
    /// * `reserve_in` - Input token reserve
    /// * `reserve_out` - Output token reserve
    /// * `fee_bps` - Fee in basis points (30 = 0.3%)
    pub fn calculate_output_amount(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<U256> {
        if amount_in.is_zero() {
            bail!("Input amount must be positive");
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            bail!("Reserves must be positive");
        }
        if fee_bps as u64 >= BPS_DENOMINATOR {
            bail!("Fee {} bps leaves nothing to swap", fee_bps);
        }

        let amount_in_with_fee = amount_in
            .checked_mul(U256::from(BPS_DENOMINATOR - fee_bps as u64))
            .context("amount_in * fee overflow")?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .context("numerator overflow")?;
        let denominator = reserve_in
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|r| r.checked_add(amount_in_with_fee))
            .context("denominator overflow")?;

        Ok(numerator / denominator)
    }

    /// Equivalent amount of the other asset at the current ratio (router `quote`)
    pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256> {
        if amount_a.is_zero() {
            bail!("Insufficient amount");
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            bail!("Insufficient liquidity");
        }
        Ok(amount_a
            .checked_mul(reserve_b)
            .context("quote overflow")?
            / reserve_a)
    }

    /// Amounts the router actually pulls for an add-liquidity request.
    ///
    /// The side that would overshoot the pool ratio is trimmed; the caller
    /// keeps the remainder.
    pub fn optimal_deposit(
        desired0: U256,
        desired1: U256,
        reserve0: U256,
        reserve1: U256,
    ) -> Result<(U256, U256)> {
        if reserve0.is_zero() && reserve1.is_zero() {
            return Ok((desired0, desired1));
        }
        let optimal1 = Self::quote(desired0, reserve0, reserve1)?;
        if optimal1 <= desired1 {
            return Ok((desired0, optimal1));
        }
        let optimal0 = Self::quote(desired1, reserve1, reserve0)?;
        if optimal0 > desired0 {
            bail!("Deposit amounts cannot match pool ratio");
        }
        Ok((optimal0, desired1))
    }

    /// LP tokens minted for a deposit of `(amount0, amount1)`.
    ///
    /// First mint burns [`MINIMUM_LIQUIDITY`] to the zero address, exactly as
    /// the pair contract does.
    pub fn liquidity_minted(state: &V2PoolState, amount0: U256, amount1: U256) -> Result<U256> {
        let liquidity = if state.total_supply.is_zero() {
            let product = amount0
                .checked_mul(amount1)
                .context("initial liquidity overflow")?;
            let root = product.integer_sqrt();
            let minimum = U256::from(MINIMUM_LIQUIDITY);
            if root <= minimum {
                bail!("Insufficient liquidity minted");
            }
            root - minimum
        } else {
            let by0 = amount0
                .checked_mul(state.total_supply)
                .context("liquidity overflow")?
                / state.reserve0;
            let by1 = amount1
                .checked_mul(state.total_supply)
                .context("liquidity overflow")?
                / state.reserve1;
            by0.min(by1)
        };

        if liquidity.is_zero() {
            bail!("Insufficient liquidity minted");
        }
        Ok(liquidity)
    }

    /// Underlying amounts returned for burning `liquidity` LP tokens
    pub fn liquidity_redeemed(state: &V2PoolState, liquidity: U256) -> Result<(U256, U256)> {
        if state.total_supply.is_zero() {
            bail!("Pool has no liquidity");
        }
        if liquidity > state.total_supply {
            bail!("Burn exceeds LP supply");
        }
        let amount0 = liquidity
            .checked_mul(state.reserve0)
            .context("redeem overflow")?
            / state.total_supply;
        let amount1 = liquidity
            .checked_mul(state.reserve1)
            .context("redeem overflow")?
            / state.total_supply;
        Ok((amount0, amount1))
    }
}

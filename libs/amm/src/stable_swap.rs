//! Curve-style StableSwap math for two-coin pools
//!
//! Balances are normalized to 18 decimals through per-coin precision
//! multipliers before entering the invariant, so a USDC(6)/DAI(18) pool
//! prices 1 USDC against 1 DAI.
//!
//! Invariant (n = 2):
//! `A·nⁿ·Σx + D = A·D·nⁿ + Dⁿ⁺¹ / (nⁿ·Πx)`

use anyhow::{bail, Context, Result};
use ethers_core::types::U256;

/// Number of coins handled by this implementation
pub const N_COINS: usize = 2;

/// Newton iterations before giving up
const MAX_ITERATIONS: usize = 255;

/// Basis-point denominator for pool fees
pub const FEE_DENOMINATOR: u64 = 10_000;

/// State of a two-coin stable pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableSwapState {
    /// Raw balances in native token decimals
    pub balances: [U256; N_COINS],
    /// `10^(18 - decimals)` per coin
    pub multipliers: [U256; N_COINS],
    /// Amplification coefficient
    pub amp: U256,
    /// Swap fee in basis points, also charged on imbalanced deposits
    pub fee_bps: u32,
    pub total_supply: U256,
}

impl StableSwapState {
    pub fn new(decimals: [u8; N_COINS], amp: u64, fee_bps: u32) -> Result<Self> {
        let mut multipliers = [U256::one(); N_COINS];
        for (slot, d) in multipliers.iter_mut().zip(decimals) {
            if d > 18 {
                bail!("Unsupported coin decimals {}", d);
            }
            *slot = U256::exp10((18 - d) as usize);
        }
        if amp == 0 {
            bail!("Amplification must be positive");
        }
        Ok(Self {
            balances: [U256::zero(); N_COINS],
            multipliers,
            amp: U256::from(amp),
            fee_bps,
            total_supply: U256::zero(),
        })
    }

    fn normalized(&self, balances: &[U256; N_COINS]) -> Result<[U256; N_COINS]> {
        let mut xp = [U256::zero(); N_COINS];
        for i in 0..N_COINS {
            xp[i] = balances[i]
                .checked_mul(self.multipliers[i])
                .context("normalize overflow")?;
        }
        Ok(xp)
    }
}

/// StableSwap math functions
pub struct StableSwapMath;

impl StableSwapMath {
    /// Invariant `D` for normalized balances
    pub fn get_d(xp: &[U256; N_COINS], amp: U256) -> Result<U256> {
        let n = U256::from(N_COINS);
        let sum = xp.iter().fold(U256::zero(), |acc, x| acc + *x);
        if sum.is_zero() {
            return Ok(U256::zero());
        }
        if xp.iter().any(|x| x.is_zero()) {
            bail!("Stable pool balance is empty on one side");
        }

        let ann = amp * n;
        let mut d = sum;
        for _ in 0..MAX_ITERATIONS {
            let mut d_p = d;
            for x in xp {
                d_p = d_p
                    .checked_mul(d)
                    .context("get_d overflow")?
                    / (*x * n);
            }
            let d_prev = d;
            let numerator = (ann * sum + d_p * n)
                .checked_mul(d)
                .context("get_d overflow")?;
            let denominator = (ann - U256::one()) * d + (n + 1) * d_p;
            d = numerator / denominator;

            if abs_diff(d, d_prev) <= U256::one() {
                return Ok(d);
            }
        }
        bail!("get_d did not converge")
    }

    /// New normalized balance of coin `j` when coin `i` moves to `x`
    pub fn get_y(i: usize, j: usize, x: U256, xp: &[U256; N_COINS], amp: U256) -> Result<U256> {
        if i == j || i >= N_COINS || j >= N_COINS {
            bail!("Invalid coin indices {} -> {}", i, j);
        }
        let n = U256::from(N_COINS);
        let d = Self::get_d(xp, amp)?;
        let ann = amp * n;

        let mut c = d;
        let mut s = U256::zero();
        for k in 0..N_COINS {
            if k == j {
                continue;
            }
            let x_k = if k == i { x } else { xp[k] };
            if x_k.is_zero() {
                bail!("Zero balance in get_y");
            }
            s += x_k;
            c = c.checked_mul(d).context("get_y overflow")? / (x_k * n);
        }
        c = c.checked_mul(d).context("get_y overflow")? / (ann * n);
        let b = s + d / ann;

        let mut y = d;
        for _ in 0..MAX_ITERATIONS {
            let y_prev = y;
            let numerator = y.checked_mul(y).context("get_y overflow")? + c;
            let denominator = (y * U256::from(2u8) + b)
                .checked_sub(d)
                .context("get_y denominator underflow")?;
            y = numerator / denominator;
            if abs_diff(y, y_prev) <= U256::one() {
                return Ok(y);
            }
        }
        bail!("get_y did not converge")
    }

    /// Output of swapping `dx` of coin `i` for coin `j`, after fee, raw units
    pub fn get_dy(state: &StableSwapState, i: usize, j: usize, dx: U256) -> Result<U256> {
        let xp = state.normalized(&state.balances)?;
        let x = xp[i] + dx.checked_mul(state.multipliers[i]).context("dx overflow")?;
        let y = Self::get_y(i, j, x, &xp, state.amp)?;
        let dy = xp[j]
            .checked_sub(y)
            .and_then(|v| v.checked_sub(U256::one()))
            .context("Swap output underflow")?;
        let fee = dy * U256::from(state.fee_bps) / U256::from(FEE_DENOMINATOR);
        Ok((dy - fee) / state.multipliers[j])
    }

    /// Apply a swap to the state, returning the raw output
    pub fn exchange(state: &mut StableSwapState, i: usize, j: usize, dx: U256) -> Result<U256> {
        let dy = Self::get_dy(state, i, j, dx)?;
        if dy.is_zero() {
            bail!("Swap output is zero");
        }
        state.balances[i] += dx;
        state.balances[j] = state.balances[j]
            .checked_sub(dy)
            .context("Insufficient pool balance")?;
        Ok(dy)
    }

    /// LP minted for depositing `amounts`; charges the imbalance fee like Curve.
    ///
    /// Returns `(lp_minted, new_balances)` without mutating the state.
    pub fn add_liquidity(
        state: &StableSwapState,
        amounts: [U256; N_COINS],
    ) -> Result<(U256, [U256; N_COINS])> {
        let old = state.balances;
        let d0 = if state.total_supply.is_zero() {
            U256::zero()
        } else {
            Self::get_d(&state.normalized(&old)?, state.amp)?
        };

        let mut new = old;
        for i in 0..N_COINS {
            if state.total_supply.is_zero() && amounts[i].is_zero() {
                bail!("Initial deposit requires all coins");
            }
            new[i] = new[i].checked_add(amounts[i]).context("balance overflow")?;
        }

        let d1 = Self::get_d(&state.normalized(&new)?, state.amp)?;
        if d1 <= d0 {
            bail!("Deposit does not increase invariant");
        }

        if state.total_supply.is_zero() {
            return Ok((d1, new));
        }

        // n / (4 * (n - 1)) share of the swap fee, on the distance from the ideal balance
        let fee_num = U256::from(state.fee_bps) * U256::from(N_COINS);
        let fee_den = U256::from(FEE_DENOMINATOR) * U256::from(4 * (N_COINS - 1));
        let mut adjusted = new;
        for i in 0..N_COINS {
            let ideal = d1.checked_mul(old[i]).context("ideal overflow")? / d0;
            let difference = abs_diff(ideal, new[i]);
            let fee = difference * fee_num / fee_den;
            adjusted[i] = new[i] - fee.min(new[i]);
        }
        let d2 = Self::get_d(&state.normalized(&adjusted)?, state.amp)?;
        let minted = state
            .total_supply
            .checked_mul(d2.saturating_sub(d0))
            .context("mint overflow")?
            / d0;
        if minted.is_zero() {
            bail!("Deposit too small to mint LP");
        }
        Ok((minted, new))
    }

    /// Balanced withdrawal: each coin in proportion to `lp / total_supply`
    pub fn remove_liquidity(state: &StableSwapState, lp: U256) -> Result<[U256; N_COINS]> {
        if state.total_supply.is_zero() || lp > state.total_supply {
            bail!("Burn exceeds LP supply");
        }
        let mut out = [U256::zero(); N_COINS];
        for i in 0..N_COINS {
            out[i] = state.balances[i]
                .checked_mul(lp)
                .context("remove overflow")?
                / state.total_supply;
        }
        Ok(out)
    }

    /// Value of one LP token in normalized (18-decimal) units
    pub fn virtual_price(state: &StableSwapState) -> Result<U256> {
        if state.total_supply.is_zero() {
            return Ok(U256::zero());
        }
        let d = Self::get_d(&state.normalized(&state.balances)?, state.amp)?;
        Ok(d.checked_mul(U256::exp10(18)).context("virtual price overflow")? / state.total_supply)
    }
}

fn abs_diff(a: U256, b: U256) -> U256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

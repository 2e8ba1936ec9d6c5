//! Synth price policy and collateral conversion
//!
//! Prices are 18-decimal fixed point: collateral (normalized to 18 decimals)
//! per whole synth. Every division rounds toward zero and every product is
//! taken at 512-bit width through [`mul_div`].

use types::units::{mul_div, normalize_to_18, pow10, wad};
use types::{ConvertDirection, Result, SynthError, U256, SENTINEL_MAX};

/// Collateral decimal counts a factory accepts
pub const SUPPORTED_COLLATERAL_DECIMALS: [u8; 2] = [6, 18];

pub fn check_collateral_decimals(decimals: u8) -> Result<()> {
    if SUPPORTED_COLLATERAL_DECIMALS.contains(&decimals) {
        Ok(())
    } else {
        Err(SynthError::Range(format!(
            "collateral decimals {decimals} not in {SUPPORTED_COLLATERAL_DECIMALS:?}"
        )))
    }
}

/// `tvl * 1e18 / circulation`, or [`SENTINEL_MAX`] while either side is zero.
///
/// `tvl` is raw collateral in `collateral_decimals`; `circulation` is raw
/// 18-decimal synth supply.
pub fn price_for(tvl: U256, collateral_decimals: u8, circulation: U256) -> Result<U256> {
    if tvl.is_zero() || circulation.is_zero() {
        return Ok(SENTINEL_MAX);
    }
    let price = mul_div(normalize_to_18(tvl, collateral_decimals)?, wad(), circulation)?;
    // a dust TVL over a huge supply would publish zero
    if price.is_zero() {
        return Ok(U256::one());
    }
    Ok(price)
}

/// Convert between collateral and synth units at `price`
pub fn convert_amount(
    amount: U256,
    collateral_decimals: u8,
    price: U256,
    direction: ConvertDirection,
) -> Result<U256> {
    check_collateral_decimals(collateral_decimals)?;
    if price.is_zero() {
        return Err(SynthError::Range("price is zero".to_string()));
    }
    let scale = pow10(18 - collateral_decimals);
    match direction {
        ConvertDirection::CollateralToSynth => {
            let normalized = amount
                .checked_mul(scale)
                .ok_or(SynthError::Overflow("collateral normalization"))?;
            mul_div(normalized, wad(), price)
        }
        ConvertDirection::SynthToCollateral => {
            let normalized = mul_div(amount, price, wad())?;
            Ok(normalized / scale)
        }
    }
}

//! Fixed-point unit helpers for 256-bit token amounts
//!
//! All on-ledger values are raw integers in the token's native decimals
//! (6 for USDC-style collateral, 18 for synths and prices). These helpers keep
//! every scaling step checked: a product that does not fit is an
//! [`SynthError::Overflow`], never a wrapped value.
//!
//! `rust_decimal` is only used at the display boundary (logs, config input).

use crate::errors::{Result, SynthError};
use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Decimals of every synth token
pub const SYNTH_DECIMALS: u8 = 18;

/// Decimals of the fixed-point price
pub const PRICE_DECIMALS: u8 = 18;

/// Price published while the backing of a synth is unproven
pub const SENTINEL_MAX: U256 = U256::MAX;

/// Largest decimal count the unit helpers accept
pub const MAX_DECIMALS: u8 = 18;

/// `10^exp` as U256
pub fn pow10(exp: u8) -> U256 {
    U256::exp10(exp as usize)
}

/// One whole unit in 18-decimal fixed point
pub fn wad() -> U256 {
    pow10(PRICE_DECIMALS)
}

/// `a * b / denominator` with a 512-bit intermediate, rounding toward zero.
///
/// Fails with `Overflow` only when the final quotient exceeds 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(SynthError::Range("division by zero".to_string()));
    }
    let product: U512 = a.full_mul(b);
    let quotient = product / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| SynthError::Overflow("mul_div"))
}

fn check_decimals(decimals: u8) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(SynthError::Range(format!(
            "{decimals} decimals exceeds supported maximum {MAX_DECIMALS}"
        )));
    }
    Ok(())
}

/// Scale an amount from `decimals` up to 18 decimals
pub fn normalize_to_18(amount: U256, decimals: u8) -> Result<U256> {
    check_decimals(decimals)?;
    amount
        .checked_mul(pow10(MAX_DECIMALS - decimals))
        .ok_or(SynthError::Overflow("normalize_to_18"))
}

/// Scale an 18-decimal amount down to `decimals`, truncating
pub fn denormalize_from_18(amount: U256, decimals: u8) -> Result<U256> {
    check_decimals(decimals)?;
    Ok(amount / pow10(MAX_DECIMALS - decimals))
}

/// Rescale between two decimal counts (truncating when scaling down)
pub fn rescale(amount: U256, from: u8, to: u8) -> Result<U256> {
    check_decimals(from)?;
    check_decimals(to)?;
    if from == to {
        Ok(amount)
    } else if from < to {
        amount
            .checked_mul(pow10(to - from))
            .ok_or(SynthError::Overflow("rescale"))
    } else {
        Ok(amount / pow10(from - to))
    }
}

/// Parse a human amount ("1000.5") into raw units
pub fn parse_units(value: &str, decimals: u8) -> Result<U256> {
    check_decimals(decimals)?;
    let parsed = Decimal::from_str(value)
        .map_err(|_| SynthError::Range(format!("invalid amount '{value}'")))?;
    if parsed.is_sign_negative() {
        return Err(SynthError::Range(format!("negative amount '{value}'")));
    }
    if parsed.scale() > decimals as u32 {
        return Err(SynthError::Range(format!(
            "'{value}' has more than {decimals} fractional digits"
        )));
    }
    let mantissa = U256::from(parsed.mantissa().unsigned_abs());
    let shift = decimals - parsed.scale() as u8;
    mantissa
        .checked_mul(pow10(shift))
        .ok_or(SynthError::Overflow("parse_units"))
}

/// Convert raw units to a `Decimal` for display; `None` when too wide
pub fn to_decimal(amount: U256, decimals: u8) -> Option<Decimal> {
    if amount > U256::from(u128::MAX) || decimals > 28 {
        return None;
    }
    let raw = i128::try_from(amount.as_u128()).ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals as u32).ok()
}

/// Human-readable amount for log lines
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount == SENTINEL_MAX {
        return "MAX".to_string();
    }
    match to_decimal(amount, decimals) {
        Some(value) => value.normalize().to_string(),
        None => format!("{amount}e-{decimals}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * 2 / 2 needs 257 bits in the middle
        assert_eq!(
            mul_div(U256::MAX, U256::from(2), U256::from(2)).unwrap(),
            U256::MAX
        );
        assert!(matches!(
            mul_div(U256::MAX, U256::from(2), U256::one()),
            Err(SynthError::Overflow(_))
        ));
        assert!(mul_div(U256::one(), U256::one(), U256::zero()).is_err());
        // Truncates toward zero
        assert_eq!(
            mul_div(U256::from(10), U256::one(), U256::from(3)).unwrap(),
            U256::from(3)
        );
    }

    #[test]
    fn test_normalization() {
        let usdc = U256::from(1_500_000u64); // 1.5 USDC
        let wide = normalize_to_18(usdc, 6).unwrap();
        assert_eq!(wide, U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(denormalize_from_18(wide, 6).unwrap(), usdc);
        assert_eq!(normalize_to_18(usdc, 18).unwrap(), usdc);
        assert!(normalize_to_18(usdc, 19).is_err());
        assert!(normalize_to_18(U256::MAX, 6).is_err());
        assert_eq!(rescale(U256::from(1234567u64), 6, 2).unwrap(), U256::from(123u64));
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_units("1000", 6).unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(parse_units("0.5", 18).unwrap(), pow10(17) * 5);
        assert!(parse_units("0.0000001", 6).is_err());
        assert!(parse_units("-1", 6).is_err());

        assert_eq!(format_units(U256::from(10_500_000u64), 6), "10.5");
        assert_eq!(format_units(SENTINEL_MAX, 18), "MAX");
    }
}

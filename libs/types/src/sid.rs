//! # Synthetic Identity (SID) - Packed 128-bit Asset Addressing
//!
//! ## Purpose
//!
//! Every synthetic asset is addressed by a single 128-bit value that embeds the
//! network where its collateral lives, the adapter family (plus family flags)
//! that farms it, and the pool inside that adapter. The value is pure data: no
//! owner, no registry lookup, and the same SID is used as the key on every
//! network that mirrors the asset.
//!
//! ## Bit Layout
//!
//! ```text
//!  127                 64 63          32 31           0
//! ┌───────────────────────┬──────────────┬──────────────┐
//! │      chain (64)       │ protocol(32) │   pool (32)  │
//! └───────────────────────┴──────────────┴──────────────┘
//!                          ▲
//!                          └─ high nibble carries adapter-family flags
//! ```
//!
//! ## Integration Points
//!
//! - **Factory**: synth records keyed by SID, CREATE2 salt derived from it
//! - **Reconciler**: groups mirrors of the same asset across networks
//! - **Chef**: `chain` names the origin network, `pool` the internal pool id
//!
//! ## Bijective Design Properties
//!
//! `unpack(pack(c, p, q)) == (c, p, q)` for every in-range triple, and `unpack`
//! is total over all 128-bit inputs. Packing an out-of-range field fails with
//! [`SynthError::Range`] instead of truncating.

use crate::errors::{Result, SynthError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width of the chain field in bits
pub const CHAIN_BITS: u32 = 64;
/// Width of the protocol field in bits
pub const PROTOCOL_BITS: u32 = 32;
/// Width of the pool field in bits
pub const POOL_BITS: u32 = 32;

/// Bit inside the protocol field marking a liquidity-staking synth.
///
/// Validated against the reference vector `0x1111222233334444D555666677778888`
/// whose protocol field `0xD5556666` carries the flag.
pub const LIQUIDITY_STAKING_FLAG: u32 = 1 << 31;

/// Mask of the flag nibble inside the protocol field
pub const PROTOCOL_FLAGS_MASK: u32 = 0xF000_0000;

const POOL_SHIFT: u32 = 0;
const PROTOCOL_SHIFT: u32 = POOL_BITS;
const CHAIN_SHIFT: u32 = POOL_BITS + PROTOCOL_BITS;

/// Packed synthetic asset identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sid(u128);

impl Sid {
    /// Pack the three fields, rejecting values wider than their slot.
    ///
    /// Fields are taken as `u128` so callers holding untrusted wide integers
    /// (config files, bridge payloads) get a `RangeError` instead of a silent
    /// truncation.
    pub fn pack(chain: u128, protocol: u128, pool: u128) -> Result<Self> {
        check_width("chain", chain, CHAIN_BITS)?;
        check_width("protocol", protocol, PROTOCOL_BITS)?;
        check_width("pool", pool, POOL_BITS)?;

        Ok(Self(
            (chain << CHAIN_SHIFT) | (protocol << PROTOCOL_SHIFT) | (pool << POOL_SHIFT),
        ))
    }

    /// Infallible constructor from already-typed fields
    pub const fn from_parts(chain: u64, protocol: u32, pool: u32) -> Self {
        Self(((chain as u128) << CHAIN_SHIFT) | ((protocol as u128) << PROTOCOL_SHIFT) | pool as u128)
    }

    /// Split into `(chain, protocol, pool)`. Total over all inputs.
    pub const fn unpack(self) -> (u64, u32, u32) {
        (self.chain(), self.protocol(), self.pool())
    }

    pub const fn chain(self) -> u64 {
        (self.0 >> CHAIN_SHIFT) as u64
    }

    pub const fn protocol(self) -> u32 {
        (self.0 >> PROTOCOL_SHIFT) as u32
    }

    pub const fn pool(self) -> u32 {
        (self.0 >> POOL_SHIFT) as u32
    }

    /// Adapter-family flags carried in the protocol high nibble
    pub const fn protocol_flags(self) -> u32 {
        self.protocol() & PROTOCOL_FLAGS_MASK
    }

    /// Whether this asset is backed by a liquidity-staking (bridge pool) farm
    pub const fn is_liquidity_staking_synth(self) -> bool {
        self.protocol() & LIQUIDITY_STAKING_FLAG != 0
    }

    pub const fn from_u128(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }

    /// 32-byte big-endian form, used as a CREATE2 salt
    pub fn to_salt(self) -> [u8; 32] {
        let mut salt = [0u8; 32];
        salt[16..].copy_from_slice(&self.0.to_be_bytes());
        salt
    }

    /// `chain_protocol_pool` label for log lines
    pub fn label(self) -> SidLabel {
        SidLabel(self)
    }
}

fn check_width(field: &'static str, value: u128, bits: u32) -> Result<()> {
    if value >> bits != 0 {
        return Err(SynthError::Range(format!(
            "{field} value {value:#x} exceeds {bits}-bit field"
        )));
    }
    Ok(())
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:032x}", self.0)
    }
}

impl FromStr for Sid {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        let hex_clean = s.strip_prefix("0x").unwrap_or(s);
        if hex_clean.is_empty() || hex_clean.len() > 32 {
            return Err(SynthError::Range(format!("invalid SID literal '{s}'")));
        }
        u128::from_str_radix(hex_clean, 16)
            .map(Self)
            .map_err(|_| SynthError::Range(format!("invalid SID literal '{s}'")))
    }
}

impl Serialize for Sid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Sid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Human-oriented rendering: `10_0x80000001_7`
pub struct SidLabel(Sid);

impl fmt::Display for SidLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (chain, protocol, pool) = self.0.unpack();
        write!(f, "{chain}_{protocol:#010x}_{pool}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        let sid: Sid = "0x1111222233334444D555666677778888".parse().unwrap();

        let (chain, protocol, pool) = sid.unpack();
        assert_eq!(chain, 0x1111222233334444);
        assert_eq!(protocol, 0xD5556666);
        assert_eq!(pool, 0x77778888);
        assert!(sid.is_liquidity_staking_synth());
    }

    #[test]
    fn test_flag_clear() {
        let sid = Sid::from_parts(10, 0x0000_0001, 0);
        assert!(!sid.is_liquidity_staking_synth());
        assert_eq!(sid.protocol_flags(), 0);

        let flagged = Sid::from_parts(10, LIQUIDITY_STAKING_FLAG | 1, 0);
        assert!(flagged.is_liquidity_staking_synth());
    }

    #[test]
    fn test_pack_matches_from_parts() {
        let packed = Sid::pack(42161, 0x8000_0002, 7).unwrap();
        assert_eq!(packed, Sid::from_parts(42161, 0x8000_0002, 7));
        assert_eq!(packed.unpack(), (42161, 0x8000_0002, 7));
    }

    #[test]
    fn test_out_of_range_fields() {
        assert!(matches!(
            Sid::pack(1u128 << 64, 0, 0),
            Err(SynthError::Range(_))
        ));
        assert!(matches!(
            Sid::pack(0, 1u128 << 32, 0),
            Err(SynthError::Range(_))
        ));
        assert!(matches!(
            Sid::pack(0, 0, u32::MAX as u128 + 1),
            Err(SynthError::Range(_))
        ));
        // Boundary values are fine
        assert!(Sid::pack(u64::MAX as u128, u32::MAX as u128, u32::MAX as u128).is_ok());
    }

    #[test]
    fn test_unpack_is_total() {
        for raw in [0u128, 1, u128::MAX, 1 << 127, 0xFFFF_FFFF] {
            let (c, p, q) = Sid::from_u128(raw).unpack();
            assert_eq!(Sid::from_parts(c, p, q).to_u128(), raw);
        }
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let sid = Sid::from_parts(56, 3, 7);
        let text = sid.to_string();
        assert_eq!(text.len(), 34);
        assert_eq!(text.parse::<Sid>().unwrap(), sid);
        assert_eq!(sid.label().to_string(), "56_0x00000003_7");

        assert!("0x".parse::<Sid>().is_err());
        assert!("zz".parse::<Sid>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let sid = Sid::from_parts(1, 2, 3);
        let json = serde_json::to_string(&sid).unwrap();
        assert_eq!(json, format!("\"{sid}\""));
        let back: Sid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sid);
    }

    #[test]
    fn test_salt_layout() {
        let sid = Sid::from_u128(0xABCD);
        let salt = sid.to_salt();
        assert_eq!(&salt[..16], &[0u8; 16]);
        assert_eq!(salt[30], 0xAB);
        assert_eq!(salt[31], 0xCD);
    }
}

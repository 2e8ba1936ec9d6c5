//! Pool registration configs
//!
//! One tagged variant per venue family, decoded once at `add_pool`. JSON
//! blobs carry the family in a `family` field:
//!
//! ```json
//! { "family": "constant_product", "pair": "0x..", "farm": "0x..",
//!   "tokens": ["0x..", "0x.."] }
//! ```

use amm::PoolType;
use serde::{Deserialize, Serialize};
use types::{Address, Result, SynthError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableSwapConfig {
    pub pool: Address,
    pub gauge: Address,
    pub coins: [Address; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductConfig {
    pub pair: Address,
    pub farm: Address,
    pub tokens: [Address; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeLiquidityConfig {
    pub pool: Address,
    pub staking: Address,
    pub token: Address,
}

/// Venue-specific registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum PoolConfig {
    StableSwap(StableSwapConfig),
    ConstantProduct(ConstantProductConfig),
    BridgeLiquidity(BridgeLiquidityConfig),
}

const FAMILIES: [&str; 3] = ["stable_swap", "constant_product", "bridge_liquidity"];

impl PoolConfig {
    pub fn family(&self) -> PoolType {
        match self {
            PoolConfig::StableSwap(_) => PoolType::StableSwap,
            PoolConfig::ConstantProduct(_) => PoolType::ConstantProduct,
            PoolConfig::BridgeLiquidity(_) => PoolType::BridgeLiquidity,
        }
    }

    /// Decode a JSON registration blob.
    ///
    /// Unknown family tags are `NotFound`; anything else malformed is `Range`.
    pub fn from_json(blob: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(blob)
            .map_err(|e| SynthError::Range(format!("pool config is not valid JSON: {e}")))?;
        let family = value
            .get("family")
            .and_then(|f| f.as_str())
            .ok_or_else(|| SynthError::Range("pool config has no family tag".to_string()))?
            .to_owned();
        if !FAMILIES.contains(&family.as_str()) {
            return Err(SynthError::not_found(format!("pool family '{family}'")));
        }
        serde_json::from_value(value)
            .map_err(|e| SynthError::Range(format!("malformed {family} pool config: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SynthError::Range(format!("pool config not serializable: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_decode_constant_product() {
        let config = PoolConfig::ConstantProduct(ConstantProductConfig {
            pair: addr(1),
            farm: addr(2),
            tokens: [addr(3), addr(4)],
        });
        let blob = config.to_json().unwrap();
        assert!(blob.contains("\"family\":\"constant_product\""));
        assert_eq!(PoolConfig::from_json(&blob).unwrap(), config);
        assert_eq!(config.family(), PoolType::ConstantProduct);
    }

    #[test]
    fn test_unknown_family_is_not_found() {
        let blob = r#"{"family":"concentrated","pool":"0x0000000000000000000000000000000000000001"}"#;
        assert!(matches!(
            PoolConfig::from_json(blob),
            Err(SynthError::NotFound(_))
        ));
    }

    #[test]
    fn test_malformed_fields_are_range_errors() {
        let missing_gauge = r#"{"family":"stable_swap","pool":"0x0000000000000000000000000000000000000001","coins":["0x0000000000000000000000000000000000000002","0x0000000000000000000000000000000000000003"]}"#;
        assert!(matches!(
            PoolConfig::from_json(missing_gauge),
            Err(SynthError::Range(_))
        ));
        assert!(matches!(
            PoolConfig::from_json("{\"pool\": 1}"),
            Err(SynthError::Range(_))
        ));
        assert!(matches!(
            PoolConfig::from_json("not json"),
            Err(SynthError::Range(_))
        ));
    }

    #[test]
    fn test_malformed_error_names_family() {
        let blob = r#"{"family":"bridge_liquidity","pool":"0x0000000000000000000000000000000000000001"}"#;
        match PoolConfig::from_json(blob) {
            Err(SynthError::Range(msg)) => assert!(msg.contains("bridge_liquidity")),
            other => panic!("expected range error, got {other:?}"),
        }
    }
}

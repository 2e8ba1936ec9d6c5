//! Concrete venue families

pub mod bridge_staking;
pub mod constant_product;
pub mod stable_gauge;

pub use bridge_staking::BridgeStakingVenue;
pub use constant_product::ConstantProductVenue;
pub use stable_gauge::StableGaugeVenue;

use ledger::{FarmKind, Ledger};
use types::{Address, Result, SynthError, U256};

/// Staking target must exist, be of `kind` and stake `lp_token`
pub(crate) fn check_farm(ledger: &Ledger, farm: &Address, kind: FarmKind, lp_token: &Address) -> Result<()> {
    let entry = ledger.farm(farm)?;
    if entry.kind != kind {
        return Err(SynthError::Range(format!(
            "farm {farm:?} is a {:?}, expected {kind:?}",
            entry.kind
        )));
    }
    if entry.lp_token != *lp_token {
        return Err(SynthError::Range(format!(
            "farm {farm:?} stakes {:?}, not {lp_token:?}",
            entry.lp_token
        )));
    }
    Ok(())
}

pub(crate) fn expect_amounts<const N: usize>(amounts: &[U256]) -> Result<[U256; N]> {
    <[U256; N]>::try_from(amounts).map_err(|_| {
        SynthError::Range(format!(
            "expected {N} collateral amounts, got {}",
            amounts.len()
        ))
    })
}

//! Advisory quote checks
//!
//! Previews are computed against a snapshot that may be stale by the time the
//! call executes. Callers that care compare the two with [`check_quote`].

use types::units::mul_div;
use types::{Result, SynthError, U256};

/// `StaleQuote` when `executed` differs from `previewed` by more than `tolerance_bps`
pub fn check_quote(previewed: U256, executed: U256, tolerance_bps: u32) -> Result<()> {
    let diff = if previewed > executed {
        previewed - executed
    } else {
        executed - previewed
    };
    let allowed = mul_div(previewed, U256::from(tolerance_bps), U256::from(10_000u64))?;
    if diff > allowed {
        return Err(SynthError::StaleQuote {
            previewed,
            executed,
            tolerance_bps,
        });
    }
    Ok(())
}

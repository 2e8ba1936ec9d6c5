//! Network endpoint seam
//!
//! The reconciler only ever talks to a network through [`NetworkEndpoint`].
//! The devnet implementation is [`crate::LocalNetwork`]; an RPC-backed
//! endpoint plugs into the same loop.

use crate::error::EndpointResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use types::{Address, ChainId, Sid, U256};

/// Collateral backing one synth at its pool of origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginReading {
    pub sid: Sid,
    /// Value of the staked LP in the chef's reference collateral
    pub tvl: U256,
    pub collateral_decimals: u8,
    pub lp_amount: U256,
    pub lp_decimals: u8,
}

#[async_trait]
pub trait NetworkEndpoint: Send + Sync {
    fn chain_id(&self) -> ChainId;

    fn name(&self) -> &str;

    /// Readings for every synth whose farm lives on this network
    async fn origin_readings(&self) -> EndpointResult<Vec<OriginReading>>;

    /// Local circulation of every synth this network's factory holds
    async fn circulation(&self) -> EndpointResult<Vec<(Sid, U256)>>;

    /// `set_price` on this network's factory, signed by `signer`
    async fn push_price(&self, signer: Address, sid: Sid, price: U256) -> EndpointResult<()>;
}

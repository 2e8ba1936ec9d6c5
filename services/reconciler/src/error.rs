//! Endpoint error type

use thiserror::Error;
use types::{ChainId, SynthError};

#[derive(Debug, Error)]
pub enum EndpointError {
    /// The network did not answer; the reconciler skips it for the cycle
    #[error("network {chain_id} unreachable")]
    Unreachable { chain_id: ChainId },

    /// The call reached the network and was rejected there
    #[error(transparent)]
    Core(#[from] SynthError),
}

pub type EndpointResult<T> = std::result::Result<T, EndpointError>;

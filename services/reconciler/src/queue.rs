//! Per-(network, signer) submission ordering
//!
//! Mutating calls signed by one identity on one network must never race.
//! [`SubmissionQueue`] keeps one FIFO lane per [`SubmissionKey`]: futures
//! submitted on the same lane run one at a time in arrival order, different
//! lanes run concurrently. Reads bypass the queue.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;
use types::{Address, ChainId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionKey {
    pub chain_id: ChainId,
    pub signer: Address,
}

impl SubmissionKey {
    pub fn new(chain_id: ChainId, signer: Address) -> Self {
        Self { chain_id, signer }
    }
}

#[derive(Debug, Default)]
pub struct SubmissionQueue {
    lanes: DashMap<SubmissionKey, Arc<Mutex<()>>>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` once every earlier submission on `key` has finished
    pub async fn submit<F>(&self, key: SubmissionKey, fut: F) -> F::Output
    where
        F: Future,
    {
        let lane = self
            .lanes
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // tokio's mutex hands the lock out in request order
        let _turn = lane.lock().await;
        trace!(chain = key.chain_id, signer = ?key.signer, "submission running");
        fut.await
    }

    /// Number of lanes opened so far
    pub fn lanes(&self) -> usize {
        self.lanes.len()
    }
}

//! In-process network endpoint
//!
//! A [`LocalNetwork`] owns one network's ledger, its factory and the chefs
//! farming synth collateral there. State sits behind a tokio `RwLock`:
//! reads share it, every mutation takes the write half. Operator calls go
//! through [`LocalNetwork::execute`] and are ordered by the injected
//! [`SubmissionQueue`]; price pushes arrive already ordered by the
//! reconciler's own submission.

use crate::endpoint::{NetworkEndpoint, OriginReading};
use crate::error::{EndpointError, EndpointResult};
use crate::queue::{SubmissionKey, SubmissionQueue};
use async_trait::async_trait;
use ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use synth_chef::YieldAdapter;
use synth_factory::{FactoryState, SynthFactory};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, warn};
use types::{Address, ChainId, Result, Sid, SynthError, U256};

/// Everything deployed on one network
pub struct NetworkState {
    pub ledger: Ledger,
    pub factory: SynthFactory,
    chefs: Vec<Box<dyn YieldAdapter>>,
    /// Synths farmed here -> index into `chefs`
    backing: BTreeMap<Sid, usize>,
}

impl NetworkState {
    pub fn new(ledger: Ledger, factory: SynthFactory) -> Self {
        Self {
            ledger,
            factory,
            chefs: Vec::new(),
            backing: BTreeMap::new(),
        }
    }

    pub fn add_chef(&mut self, chef: Box<dyn YieldAdapter>) -> usize {
        self.chefs.push(chef);
        self.chefs.len() - 1
    }

    /// Declare that `sid` is farmed in pool `sid.pool()` of chef `index`
    pub fn back_synth(&mut self, sid: Sid, index: usize) -> Result<()> {
        if sid.chain() != self.ledger.chain_id() {
            return Err(SynthError::Range(format!(
                "synth {sid} originates on chain {}, not {}",
                sid.chain(),
                self.ledger.chain_id()
            )));
        }
        let chef = self
            .chefs
            .get(index)
            .ok_or_else(|| SynthError::not_found(format!("chef #{index}")))?;
        chef.get_pool_tokens(sid.pool())?;
        self.backing.insert(sid, index);
        Ok(())
    }

    pub fn chef(&self, index: usize) -> Option<&dyn YieldAdapter> {
        self.chefs.get(index).map(|c| c.as_ref())
    }

    /// Chef backing `sid` on this network
    pub fn backing_chef(&self, sid: Sid) -> Option<&dyn YieldAdapter> {
        self.backing.get(&sid).and_then(|&i| self.chef(i))
    }

    /// Run `op` against chef `index` and the ledger it executes on
    pub fn with_chef<T>(
        &mut self,
        index: usize,
        op: impl FnOnce(&mut dyn YieldAdapter, &mut Ledger) -> Result<T>,
    ) -> Result<T> {
        let chef = self
            .chefs
            .get_mut(index)
            .ok_or_else(|| SynthError::not_found(format!("chef #{index}")))?;
        op(chef.as_mut(), &mut self.ledger)
    }

    pub fn origin_readings(&self) -> Result<Vec<OriginReading>> {
        self.backing
            .iter()
            .map(|(&sid, &index)| {
                let chef = self
                    .chef(index)
                    .ok_or_else(|| SynthError::not_found(format!("chef #{index}")))?;
                let pool_id = sid.pool();
                Ok(OriginReading {
                    sid,
                    tvl: chef.get_balance_on_farm(&self.ledger, pool_id)?,
                    collateral_decimals: self.ledger.decimals(&chef.reference_token())?,
                    lp_amount: chef.get_lp_amount_on_farm(&self.ledger, pool_id)?,
                    lp_decimals: self.ledger.decimals(&chef.lp_token(pool_id)?)?,
                })
            })
            .collect()
    }

    pub fn circulation(&self) -> Vec<(Sid, U256)> {
        self.factory
            .state()
            .synths
            .iter()
            .map(|(sid, record)| (*sid, record.circulating_supply))
            .collect()
    }

    pub fn snapshot(&self, name: &str) -> NetworkSnapshot {
        NetworkSnapshot {
            name: name.to_string(),
            chain_id: self.ledger.chain_id(),
            ledger: self.ledger.clone(),
            factory: self.factory.state().clone(),
        }
    }
}

/// Serializable image of a network written at shutdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub name: String,
    pub chain_id: ChainId,
    pub ledger: Ledger,
    pub factory: FactoryState,
}

pub struct LocalNetwork {
    name: String,
    chain_id: ChainId,
    state: RwLock<NetworkState>,
    queue: Arc<SubmissionQueue>,
    reachable: AtomicBool,
}

impl LocalNetwork {
    pub fn new(name: impl Into<String>, state: NetworkState, queue: Arc<SubmissionQueue>) -> Self {
        Self {
            name: name.into(),
            chain_id: state.ledger.chain_id(),
            state: RwLock::new(state),
            queue,
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: every endpoint call fails while unreachable
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> EndpointResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EndpointError::Unreachable {
                chain_id: self.chain_id,
            })
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, NetworkState> {
        self.state.read().await
    }

    /// Run a mutating operation signed by `signer`, ordered after every
    /// earlier submission of the same signer on this network
    pub async fn execute<T>(&self, signer: Address, op: impl FnOnce(&mut NetworkState) -> T) -> T {
        let key = SubmissionKey::new(self.chain_id, signer);
        self.queue
            .submit(key, async {
                let mut state = self.state.write().await;
                op(&mut *state)
            })
            .await
    }

    pub async fn snapshot(&self) -> NetworkSnapshot {
        self.state.read().await.snapshot(&self.name)
    }
}

#[async_trait]
impl NetworkEndpoint for LocalNetwork {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn origin_readings(&self) -> EndpointResult<Vec<OriginReading>> {
        self.check_reachable()?;
        let readings = self.state.read().await.origin_readings()?;
        debug!(network = %self.name, count = readings.len(), "origin readings");
        Ok(readings)
    }

    async fn circulation(&self) -> EndpointResult<Vec<(Sid, U256)>> {
        self.check_reachable()?;
        Ok(self.state.read().await.circulation())
    }

    async fn push_price(&self, signer: Address, sid: Sid, price: U256) -> EndpointResult<()> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        state.factory.set_price(&signer, sid, price).map_err(|e| {
            warn!(network = %self.name, sid = %sid.label(), error = %e, "set_price rejected");
            EndpointError::from(e)
        })
    }
}

//! Reconciliation loop
//!
//! One cycle:
//! 1. read every network concurrently into a [`CycleSnapshot`]
//! 2. price every synth from its origin TVL and its circulation on the
//!    other networks
//! 3. push the price to every factory holding the synth, ordered per
//!    (network, operator) through the [`SubmissionQueue`]
//!
//! Unreachable networks are skipped for the cycle, synths whose origin could
//! not be read keep their stale price, and failed pushes are retried on the
//! next cycle. Nothing short of shutdown stops the loop.

use crate::endpoint::{NetworkEndpoint, OriginReading};
use crate::queue::{SubmissionKey, SubmissionQueue};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use synth_factory::price_for;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use types::units::{format_units, normalize_to_18};
use types::{Address, ChainId, Result, Sid, SynthError, U256, PRICE_DECIMALS, SYNTH_DECIMALS};

/// Reads of one cycle, treated as a single logical snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSnapshot {
    pub origins: BTreeMap<Sid, OriginReading>,
    /// sid -> (chain -> local circulation) for every factory holding it
    pub circulation: BTreeMap<Sid, BTreeMap<ChainId, U256>>,
    /// Networks whose reads failed this cycle
    pub skipped: BTreeSet<ChainId>,
}

impl CycleSnapshot {
    /// Circulation of `sid` on every network except its origin
    pub fn remote_circulation(&self, sid: Sid) -> Result<U256> {
        let Some(per_chain) = self.circulation.get(&sid) else {
            return Ok(U256::zero());
        };
        per_chain
            .iter()
            .filter(|(chain, _)| **chain != sid.chain())
            .try_fold(U256::zero(), |acc, (_, supply)| {
                acc.checked_add(*supply)
                    .ok_or(SynthError::Overflow("remote circulation"))
            })
    }

    /// Price every synth that can be priced from this snapshot
    pub fn prices(&self) -> BTreeMap<Sid, U256> {
        let sids: BTreeSet<Sid> = self
            .circulation
            .keys()
            .chain(self.origins.keys())
            .copied()
            .collect();

        let mut prices = BTreeMap::new();
        for sid in sids {
            if self.skipped.contains(&sid.chain()) {
                debug!(sid = %sid.label(), "origin unreadable, keeping stale price");
                continue;
            }
            let circulation = match self.remote_circulation(sid) {
                Ok(circulation) => circulation,
                Err(e) => {
                    warn!(sid = %sid.label(), error = %e, "circulation unreadable, keeping stale price");
                    continue;
                }
            };
            // no reading at a readable origin means nothing backs the synth
            let (tvl, decimals) = self
                .origins
                .get(&sid)
                .map(|r| (r.tvl, r.collateral_decimals))
                .unwrap_or((U256::zero(), SYNTH_DECIMALS));

            match price_for(tvl, decimals, circulation) {
                Ok(price) => {
                    prices.insert(sid, price);
                }
                Err(e) => warn!(sid = %sid.label(), error = %e, "price computation failed"),
            }
        }
        prices
    }
}

/// Outcome of one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub prices: BTreeMap<Sid, U256>,
    pub pushed: usize,
    pub failed_pushes: Vec<(ChainId, Sid)>,
    pub skipped_networks: Vec<ChainId>,
}

pub struct Reconciler {
    endpoints: Vec<Arc<dyn NetworkEndpoint>>,
    queue: Arc<SubmissionQueue>,
    operator: Address,
    period: Duration,
}

impl Reconciler {
    pub fn new(
        endpoints: Vec<Arc<dyn NetworkEndpoint>>,
        queue: Arc<SubmissionQueue>,
        operator: Address,
        period: Duration,
    ) -> Self {
        Self {
            endpoints,
            queue,
            operator,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Read every network concurrently
    pub async fn snapshot(&self) -> CycleSnapshot {
        let reads = self.endpoints.iter().map(|endpoint| async move {
            let result = futures::try_join!(endpoint.origin_readings(), endpoint.circulation());
            (endpoint.chain_id(), endpoint.name().to_string(), result)
        });

        let mut snapshot = CycleSnapshot::default();
        for (chain_id, name, result) in join_all(reads).await {
            match result {
                Ok((origins, circulation)) => {
                    for reading in origins {
                        debug!(
                            network = %name,
                            sid = %reading.sid.label(),
                            tvl = %format_units(reading.tvl, reading.collateral_decimals),
                            lp_supply = %normalize_to_18(reading.lp_amount, reading.lp_decimals)
                                .map(|lp| format_units(lp, SYNTH_DECIMALS))
                                .unwrap_or_else(|_| reading.lp_amount.to_string()),
                            "origin read"
                        );
                        snapshot.origins.insert(reading.sid, reading);
                    }
                    for (sid, supply) in circulation {
                        snapshot
                            .circulation
                            .entry(sid)
                            .or_default()
                            .insert(chain_id, supply);
                    }
                }
                Err(e) => {
                    warn!(network = %name, chain = chain_id, error = %e, "network skipped this cycle");
                    snapshot.skipped.insert(chain_id);
                }
            }
        }
        snapshot
    }

    /// One full read-price-push pass
    pub async fn run_cycle(&self) -> CycleReport {
        let snapshot = self.snapshot().await;
        let prices = snapshot.prices();

        let mut pushes = Vec::new();
        for (sid, price) in &prices {
            let holders = snapshot.circulation.get(sid).into_iter().flat_map(|m| m.keys());
            for chain_id in holders {
                let Some(endpoint) = self.endpoints.iter().find(|e| e.chain_id() == *chain_id) else {
                    continue;
                };
                let (sid, price) = (*sid, *price);
                let key = SubmissionKey::new(*chain_id, self.operator);
                let operator = self.operator;
                let queue = &self.queue;
                pushes.push(async move {
                    let result = queue
                        .submit(key, endpoint.push_price(operator, sid, price))
                        .await;
                    (key.chain_id, sid, result)
                });
            }
        }

        let mut report = CycleReport {
            skipped_networks: snapshot.skipped.iter().copied().collect(),
            ..CycleReport::default()
        };
        for (chain_id, sid, result) in join_all(pushes).await {
            match result {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!(chain = chain_id, sid = %sid.label(), error = %e, "price push failed, retrying next cycle");
                    report.failed_pushes.push((chain_id, sid));
                }
            }
        }

        for (sid, price) in &prices {
            info!(
                sid = %sid.label(),
                price = %format_units(*price, PRICE_DECIMALS),
                circulation = %format_units(snapshot.remote_circulation(*sid).unwrap_or_default(), SYNTH_DECIMALS),
                "synth priced"
            );
        }
        report.prices = prices;
        report
    }

    /// Run cycles every period until `shutdown` flips to `true`; returns cycles run
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = 0u64;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    cycles += 1;
                    info!(
                        cycle = cycles,
                        priced = report.prices.len(),
                        pushed = report.pushed,
                        failed = report.failed_pushes.len(),
                        skipped = ?report.skipped_networks,
                        "reconciliation cycle complete"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!(cycles, "reconciler stopped");
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::units::parse_units;
    use types::SENTINEL_MAX;

    fn reading(sid: Sid, tvl: U256, decimals: u8) -> OriginReading {
        OriginReading {
            sid,
            tvl,
            collateral_decimals: decimals,
            lp_amount: U256::zero(),
            lp_decimals: 18,
        }
    }

    #[test]
    fn test_origin_circulation_is_excluded() {
        let sid = Sid::from_parts(10, 1, 0);
        let mut snapshot = CycleSnapshot::default();
        snapshot.origins.insert(sid, reading(sid, parse_units("3000", 6).unwrap(), 6));
        let per_chain = snapshot.circulation.entry(sid).or_default();
        per_chain.insert(10, parse_units("999", 18).unwrap());
        per_chain.insert(56, parse_units("1000", 18).unwrap());
        per_chain.insert(137, parse_units("500", 18).unwrap());

        assert_eq!(snapshot.remote_circulation(sid).unwrap(), parse_units("1500", 18).unwrap());
        assert_eq!(snapshot.prices()[&sid], parse_units("2", 18).unwrap());
    }

    #[test]
    fn test_unbacked_or_unminted_synth_gets_sentinel() {
        let backed = Sid::from_parts(10, 1, 0);
        let unbacked = Sid::from_parts(10, 1, 1);
        let mut snapshot = CycleSnapshot::default();
        snapshot.origins.insert(backed, reading(backed, U256::exp10(6), 6));
        snapshot.circulation.entry(unbacked).or_default().insert(56, U256::exp10(18));

        let prices = snapshot.prices();
        assert_eq!(prices[&backed], SENTINEL_MAX);
        assert_eq!(prices[&unbacked], SENTINEL_MAX);
    }

    #[test]
    fn test_unreadable_origin_is_not_repriced() {
        let sid = Sid::from_parts(10, 1, 0);
        let mut snapshot = CycleSnapshot::default();
        snapshot.circulation.entry(sid).or_default().insert(56, U256::exp10(18));
        snapshot.skipped.insert(10);
        assert!(snapshot.prices().is_empty());
    }

    #[test]
    fn test_overflowing_circulation_is_not_repriced() {
        let sid = Sid::from_parts(10, 1, 0);
        let mut snapshot = CycleSnapshot::default();
        snapshot.origins.insert(sid, reading(sid, U256::exp10(6), 6));
        let per_chain = snapshot.circulation.entry(sid).or_default();
        per_chain.insert(56, U256::MAX);
        per_chain.insert(137, U256::one());

        assert!(matches!(
            snapshot.remote_circulation(sid),
            Err(SynthError::Overflow(_))
        ));
        assert!(snapshot.prices().is_empty());
    }
}

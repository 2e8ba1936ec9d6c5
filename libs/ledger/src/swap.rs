//! Swap capability and route-table dispatcher
//!
//! Chefs never talk to a venue directly when they need to convert tokens;
//! they go through a [`SwapCapability`]. [`DexRouter`] is the in-process
//! implementation: an explicit route for a token pair when one is
//! configured, otherwise the first venue of the pair's default protocol.

use crate::ledger::Ledger;
use amm::PoolType;
use std::collections::HashMap;
use tracing::{debug, trace};
use types::{Address, Result, SynthError, U256};

/// `swap(tokenIn, tokenOut, amountIn) -> amountOut` and its preview
pub trait SwapCapability: Send + Sync {
    /// Execute a swap for `trader` against `ledger`
    fn swap(
        &self,
        ledger: &mut Ledger,
        trader: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256>;

    /// Quote the same swap without mutating anything
    fn preview_swap(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256>;

    /// Value `amount_in` along the same route at marginal prices
    fn spot_quote(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256>;
}

/// One leg of a multi-hop route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub protocol: PoolType,
    pub venue: Address,
    pub token_out: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Ordered hops ending in the requested output token
    Hops(Vec<Hop>),
    /// Use the first venue of this protocol that holds both tokens
    Default(PoolType),
}

/// (tokenIn, tokenOut) -> route; read-only once handed to the router
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<(Address, Address), Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, token_in: Address, token_out: Address, route: Route) -> Self {
        self.routes.insert((token_in, token_out), route);
        self
    }

    pub fn get(&self, token_in: &Address, token_out: &Address) -> Option<&Route> {
        self.routes.get(&(*token_in, *token_out))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Route-table swap dispatcher over the ledger's pairs and stable pools
#[derive(Debug, Clone)]
pub struct DexRouter {
    routes: RouteTable,
    fallback: PoolType,
}

impl DexRouter {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            fallback: PoolType::ConstantProduct,
        }
    }

    /// Protocol used for pairs without an explicit route
    pub fn with_fallback(mut self, protocol: PoolType) -> Self {
        self.fallback = protocol;
        self
    }

    /// Resolve the hops for a token pair against the current ledger
    pub fn resolve(&self, ledger: &Ledger, token_in: Address, token_out: Address) -> Result<Vec<Hop>> {
        let route = self
            .routes
            .get(&token_in, &token_out)
            .cloned()
            .unwrap_or(Route::Default(self.fallback));

        match route {
            Route::Hops(hops) => {
                if hops.last().map(|h| h.token_out) != Some(token_out) {
                    return Err(SynthError::Range(format!(
                        "route {token_in:?} -> {token_out:?} does not end in the output token"
                    )));
                }
                Ok(hops)
            }
            Route::Default(protocol) => {
                let venue = ledger
                    .venues_between(&token_in, &token_out)
                    .into_iter()
                    .find(|v| {
                        ledger
                            .venue(v)
                            .map(|venue| venue.pool_type() == protocol)
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| {
                        SynthError::not_found(format!(
                            "{protocol:?} venue for {token_in:?} -> {token_out:?}"
                        ))
                    })?;
                Ok(vec![Hop {
                    protocol,
                    venue,
                    token_out,
                }])
            }
        }
    }
}

impl SwapCapability for DexRouter {
    fn swap(
        &self,
        ledger: &mut Ledger,
        trader: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        if token_in == token_out || amount_in.is_zero() {
            return Ok(amount_in);
        }
        let hops = self.resolve(ledger, token_in, token_out)?;
        let mut current = token_in;
        let mut amount = amount_in;
        for hop in &hops {
            let (received, out) = ledger.swap_exact(&hop.venue, trader, &current, amount)?;
            if received != hop.token_out {
                return Err(SynthError::Range(format!(
                    "hop through {:?} yields {received:?}, route expects {:?}",
                    hop.venue, hop.token_out
                )));
            }
            trace!(venue = ?hop.venue, %amount, %out, "hop executed");
            current = received;
            amount = out;
        }
        debug!(?token_in, ?token_out, %amount_in, amount_out = %amount, hops = hops.len(), "routed swap");
        Ok(amount)
    }

    fn preview_swap(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        self.walk(ledger, token_in, token_out, amount_in, Ledger::preview_swap_exact)
    }

    fn spot_quote(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        self.walk(ledger, token_in, token_out, amount_in, Ledger::spot_quote_exact)
    }
}

impl DexRouter {
    /// Fold a read-only per-hop quote along the resolved route
    fn walk(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        quote: fn(&Ledger, &Address, &Address, U256) -> Result<(Address, U256)>,
    ) -> Result<U256> {
        if token_in == token_out || amount_in.is_zero() {
            return Ok(amount_in);
        }
        let hops = self.resolve(ledger, token_in, token_out)?;
        let mut current = token_in;
        let mut amount = amount_in;
        for hop in &hops {
            let (received, out) = quote(ledger, &hop.venue, &current, amount)?;
            if received != hop.token_out {
                return Err(SynthError::Range(format!(
                    "hop through {:?} yields {received:?}, route expects {:?}",
                    hop.venue, hop.token_out
                )));
            }
            current = received;
            amount = out;
        }
        Ok(amount)
    }
}

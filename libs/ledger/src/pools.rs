//! Liquidity venue operations
//!
//! Pool state is never cached: reserves are read from the token table at the
//! pool address and LP supply from the pool's own token entry, then handed to
//! the `amm` math. Every mutation moves real balances.

use crate::ledger::Ledger;
use crate::token::TokenState;
use crate::venues::{BridgeVenue, PairVenue, StableVenue, Venue};
use crate::VenueResultExt;
use amm::{
    AmmPool, BridgePoolMath, BridgePoolState, StableSwapMath, StableSwapState, V2Math,
    V2PoolState, MINIMUM_LIQUIDITY,
};
use tracing::debug;
use types::{Address, Result, SynthError, U256};

impl Ledger {
    // ----- constant-product pairs -----

    pub fn create_pair(&mut self, token0: Address, token1: Address, fee_bps: u32) -> Result<Address> {
        if token0 == token1 {
            return Err(SynthError::Range("pair tokens must differ".to_string()));
        }
        let symbol = format!("{}-{} LP", self.symbol(&token0)?, self.symbol(&token1)?);
        let pair = self.next_address();
        self.tokens.insert(pair, TokenState::new(symbol, 18));
        self.venues.insert(
            pair,
            Venue::Pair(PairVenue {
                token0,
                token1,
                fee_bps,
            }),
        );
        debug!(chain = self.chain_id(), ?pair, fee_bps, "pair created");
        Ok(pair)
    }

    fn pair(&self, pair: &Address) -> Result<&PairVenue> {
        match self.venue(pair)? {
            Venue::Pair(venue) => Ok(venue),
            other => Err(SynthError::Range(format!(
                "{pair:?} is a {:?} venue, not a pair",
                other.pool_type()
            ))),
        }
    }

    /// Math view of a pair
    pub fn pair_state(&self, pair: &Address) -> Result<V2PoolState> {
        let venue = self.pair(pair)?;
        Ok(V2PoolState {
            reserve0: self.balance_of(&venue.token0, pair),
            reserve1: self.balance_of(&venue.token1, pair),
            total_supply: self.total_supply(pair),
            fee_bps: venue.fee_bps,
        })
    }

    /// Router-style add: trims the side that overshoots the pool ratio.
    ///
    /// Returns `(used0, used1, lp_minted)`.
    pub fn pair_add_liquidity(
        &mut self,
        pair: &Address,
        provider: Address,
        desired0: U256,
        desired1: U256,
    ) -> Result<(U256, U256, U256)> {
        let venue = self.pair(pair)?.clone();
        let state = self.pair_state(pair)?;
        let (used0, used1) =
            V2Math::optimal_deposit(desired0, desired1, state.reserve0, state.reserve1).venue()?;
        let minted = V2Math::liquidity_minted(&state, used0, used1).venue()?;

        self.transfer(&venue.token0, provider, *pair, used0)?;
        self.transfer(&venue.token1, provider, *pair, used1)?;
        if state.total_supply.is_zero() {
            self.mint(pair, Address::zero(), U256::from(MINIMUM_LIQUIDITY))?;
        }
        self.mint(pair, provider, minted)?;
        Ok((used0, used1, minted))
    }

    /// Burn LP and return both underlying amounts to `provider`
    pub fn pair_remove_liquidity(
        &mut self,
        pair: &Address,
        provider: Address,
        lp: U256,
    ) -> Result<(U256, U256)> {
        let venue = self.pair(pair)?.clone();
        let (amount0, amount1) = self.pair_preview_remove(pair, lp)?;
        self.burn(pair, provider, lp)?;
        self.transfer(&venue.token0, *pair, provider, amount0)?;
        self.transfer(&venue.token1, *pair, provider, amount1)?;
        Ok((amount0, amount1))
    }

    pub fn pair_preview_remove(&self, pair: &Address, lp: U256) -> Result<(U256, U256)> {
        V2Math::liquidity_redeemed(&self.pair_state(pair)?, lp).venue()
    }

    // ----- stable pools -----

    pub fn create_stable_pool(&mut self, coins: [Address; 2], amp: u64, fee_bps: u32) -> Result<Address> {
        if coins[0] == coins[1] {
            return Err(SynthError::Range("stable pool coins must differ".to_string()));
        }
        let decimals = [self.decimals(&coins[0])?, self.decimals(&coins[1])?];
        // validate parameters up front
        StableSwapState::new(decimals, amp, fee_bps).venue()?;

        let symbol = format!("{}/{} stable LP", self.symbol(&coins[0])?, self.symbol(&coins[1])?);
        let pool = self.next_address();
        self.tokens.insert(pool, TokenState::new(symbol, 18));
        self.venues.insert(
            pool,
            Venue::Stable(StableVenue {
                coins,
                decimals,
                amp,
                fee_bps,
            }),
        );
        debug!(chain = self.chain_id(), ?pool, amp, fee_bps, "stable pool created");
        Ok(pool)
    }

    fn stable(&self, pool: &Address) -> Result<&StableVenue> {
        match self.venue(pool)? {
            Venue::Stable(venue) => Ok(venue),
            other => Err(SynthError::Range(format!(
                "{pool:?} is a {:?} venue, not a stable pool",
                other.pool_type()
            ))),
        }
    }

    /// Math view of a stable pool
    pub fn stable_state(&self, pool: &Address) -> Result<StableSwapState> {
        let venue = self.stable(pool)?;
        let mut state = StableSwapState::new(venue.decimals, venue.amp, venue.fee_bps).venue()?;
        state.balances = [
            self.balance_of(&venue.coins[0], pool),
            self.balance_of(&venue.coins[1], pool),
        ];
        state.total_supply = self.total_supply(pool);
        Ok(state)
    }

    pub fn stable_preview_add(&self, pool: &Address, amounts: [U256; 2]) -> Result<U256> {
        let (minted, _) = StableSwapMath::add_liquidity(&self.stable_state(pool)?, amounts).venue()?;
        Ok(minted)
    }

    pub fn stable_add_liquidity(
        &mut self,
        pool: &Address,
        provider: Address,
        amounts: [U256; 2],
    ) -> Result<U256> {
        let coins = self.stable(pool)?.coins;
        let minted = self.stable_preview_add(pool, amounts)?;
        for (coin, amount) in coins.iter().zip(amounts) {
            self.transfer(coin, provider, *pool, amount)?;
        }
        self.mint(pool, provider, minted)?;
        Ok(minted)
    }

    pub fn stable_preview_remove(&self, pool: &Address, lp: U256) -> Result<[U256; 2]> {
        StableSwapMath::remove_liquidity(&self.stable_state(pool)?, lp).venue()
    }

    pub fn stable_remove_liquidity(
        &mut self,
        pool: &Address,
        provider: Address,
        lp: U256,
    ) -> Result<[U256; 2]> {
        let coins = self.stable(pool)?.coins;
        let amounts = self.stable_preview_remove(pool, lp)?;
        self.burn(pool, provider, lp)?;
        for (coin, amount) in coins.iter().zip(amounts) {
            self.transfer(coin, *pool, provider, amount)?;
        }
        Ok(amounts)
    }

    // ----- bridge pools -----

    pub fn create_bridge_pool(&mut self, token: Address, shared_decimals: u8) -> Result<Address> {
        let local_decimals = self.decimals(&token)?;
        BridgePoolState::new(local_decimals, shared_decimals).venue()?;

        let symbol = format!("S*{}", self.symbol(&token)?);
        let pool = self.next_address();
        self.tokens.insert(pool, TokenState::new(symbol, shared_decimals));
        self.venues.insert(
            pool,
            Venue::Bridge(BridgeVenue {
                token,
                local_decimals,
                shared_decimals,
                total_liquidity: U256::zero(),
            }),
        );
        debug!(chain = self.chain_id(), ?pool, shared_decimals, "bridge pool created");
        Ok(pool)
    }

    fn bridge(&self, pool: &Address) -> Result<&BridgeVenue> {
        match self.venue(pool)? {
            Venue::Bridge(venue) => Ok(venue),
            other => Err(SynthError::Range(format!(
                "{pool:?} is a {:?} venue, not a bridge pool",
                other.pool_type()
            ))),
        }
    }

    /// Math view of a bridge pool
    pub fn bridge_state(&self, pool: &Address) -> Result<BridgePoolState> {
        let venue = self.bridge(pool)?;
        let mut state = BridgePoolState::new(venue.local_decimals, venue.shared_decimals).venue()?;
        state.total_liquidity = venue.total_liquidity;
        state.total_supply = self.total_supply(pool);
        Ok(state)
    }

    /// Deposit `amount_ld`; only the shared-precision part leaves the provider
    pub fn bridge_deposit(&mut self, pool: &Address, provider: Address, amount_ld: U256) -> Result<U256> {
        let token = self.bridge(pool)?.token;
        let mut state = self.bridge_state(pool)?;
        let credited_sd = state.amount_ld_to_sd(amount_ld);
        let minted = BridgePoolMath::deposit(&mut state, amount_ld).venue()?;
        let pulled = state.amount_sd_to_ld(credited_sd).venue()?;

        self.transfer(&token, provider, *pool, pulled)?;
        self.mint(pool, provider, minted)?;
        self.set_bridge_liquidity(pool, state.total_liquidity)?;
        Ok(minted)
    }

    pub fn bridge_preview_redeem(&self, pool: &Address, lp: U256) -> Result<U256> {
        let (amount_ld, _) = BridgePoolMath::redeem_for_lp(&self.bridge_state(pool)?, lp).venue()?;
        Ok(amount_ld)
    }

    /// Instant local redeem of `lp`
    pub fn bridge_redeem(&mut self, pool: &Address, provider: Address, lp: U256) -> Result<U256> {
        let token = self.bridge(pool)?.token;
        let mut state = self.bridge_state(pool)?;
        let amount_ld = BridgePoolMath::redeem(&mut state, lp).venue()?;

        self.burn(pool, provider, lp)?;
        self.transfer(&token, *pool, provider, amount_ld)?;
        self.set_bridge_liquidity(pool, state.total_liquidity)?;
        Ok(amount_ld)
    }

    /// Credit bridge fees to LPs (raises the value of every LP token)
    pub fn bridge_accrue_fees(&mut self, pool: &Address, amount_ld: U256) -> Result<()> {
        let venue = self.bridge(pool)?.clone();
        let state = self.bridge_state(pool)?;
        let amount_sd = state.amount_ld_to_sd(amount_ld);
        let credited = state.amount_sd_to_ld(amount_sd).venue()?;
        self.mint(&venue.token, *pool, credited)?;
        self.set_bridge_liquidity(pool, venue.total_liquidity + amount_sd)
    }

    fn set_bridge_liquidity(&mut self, pool: &Address, total_liquidity: U256) -> Result<()> {
        match self.venues.get_mut(pool) {
            Some(Venue::Bridge(venue)) => {
                venue.total_liquidity = total_liquidity;
                Ok(())
            }
            _ => Err(SynthError::not_found(format!("bridge pool {pool:?}"))),
        }
    }

    // ----- swaps -----

    /// Swap math for a pool venue, with its coins in pool order
    pub fn swap_pool(&self, venue: &Address) -> Result<(Box<dyn AmmPool>, [Address; 2])> {
        match self.venue(venue)? {
            Venue::Pair(pair) => Ok((Box::new(self.pair_state(venue)?), [pair.token0, pair.token1])),
            Venue::Stable(pool) => Ok((Box::new(self.stable_state(venue)?), pool.coins)),
            Venue::Bridge(_) => Err(SynthError::Range(format!(
                "bridge pool {venue:?} does not support swaps"
            ))),
        }
    }

    /// Quote a single-venue swap
    pub fn preview_swap_exact(&self, venue: &Address, token_in: &Address, amount_in: U256) -> Result<(Address, U256)> {
        let (pool, coins) = self.swap_pool(venue)?;
        let index_in = coins
            .iter()
            .position(|c| c == token_in)
            .ok_or_else(|| SynthError::not_found(format!("token {token_in:?} in venue {venue:?}")))?;
        let out = pool.get_amount_out(index_in, amount_in).venue()?;
        Ok((coins[1 - index_in], out))
    }

    /// Value `amount_in` at a venue's marginal price
    pub fn spot_quote_exact(&self, venue: &Address, token_in: &Address, amount_in: U256) -> Result<(Address, U256)> {
        let (pool, coins) = self.swap_pool(venue)?;
        let index_in = coins
            .iter()
            .position(|c| c == token_in)
            .ok_or_else(|| SynthError::not_found(format!("token {token_in:?} in venue {venue:?}")))?;
        let out = pool.spot_amount_out(index_in, amount_in).venue()?;
        Ok((coins[1 - index_in], out))
    }

    /// Execute a single-venue swap for `trader`
    pub fn swap_exact(
        &mut self,
        venue: &Address,
        trader: Address,
        token_in: &Address,
        amount_in: U256,
    ) -> Result<(Address, U256)> {
        let (token_out, out) = self.preview_swap_exact(venue, token_in, amount_in)?;
        if out.is_zero() {
            return Err(SynthError::venue("swap output is zero"));
        }
        self.transfer(token_in, trader, *venue, amount_in)?;
        self.transfer(&token_out, *venue, trader, out)?;
        debug!(chain = self.chain_id(), ?venue, %amount_in, %out, "swap");
        Ok((token_out, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: u64, decimals: u8) -> U256 {
        U256::from(n) * U256::exp10(decimals as usize)
    }

    #[test]
    fn test_pair_liquidity_lifecycle() {
        let mut ledger = Ledger::new(56);
        let a = ledger.deploy_token("A", 18);
        let b = ledger.deploy_token("B", 18);
        let lp_holder = Address::from_low_u64_be(7);
        ledger.mint(&a, lp_holder, units(5_000, 18)).unwrap();
        ledger.mint(&b, lp_holder, units(5_000, 18)).unwrap();

        let pair = ledger.create_pair(a, b, 25).unwrap();
        let (u0, u1, lp) = ledger
            .pair_add_liquidity(&pair, lp_holder, units(1_000, 18), units(1_000, 18))
            .unwrap();
        assert_eq!((u0, u1), (units(1_000, 18), units(1_000, 18)));
        assert_eq!(lp, units(1_000, 18) - U256::from(MINIMUM_LIQUIDITY));
        assert_eq!(ledger.balance_of(&pair, &lp_holder), lp);

        let (r0, r1) = ledger.pair_remove_liquidity(&pair, lp_holder, lp / 2).unwrap();
        assert!(r0 > U256::zero() && r1 > U256::zero());
        assert_eq!(ledger.balance_of(&pair, &lp_holder), lp - lp / 2);
    }

    #[test]
    fn test_swap_moves_balances() {
        let mut ledger = Ledger::new(56);
        let a = ledger.deploy_token("A", 18);
        let b = ledger.deploy_token("B", 18);
        let whale = Address::from_low_u64_be(1);
        let trader = Address::from_low_u64_be(2);
        ledger.mint(&a, whale, units(10_000, 18)).unwrap();
        ledger.mint(&b, whale, units(10_000, 18)).unwrap();
        ledger.mint(&a, trader, units(10, 18)).unwrap();
        let pair = ledger.create_pair(a, b, 30).unwrap();
        ledger
            .pair_add_liquidity(&pair, whale, units(10_000, 18), units(10_000, 18))
            .unwrap();

        let (_, quoted) = ledger.preview_swap_exact(&pair, &a, units(10, 18)).unwrap();
        let (token_out, out) = ledger.swap_exact(&pair, trader, &a, units(10, 18)).unwrap();
        assert_eq!(token_out, b);
        assert_eq!(out, quoted);
        assert_eq!(ledger.balance_of(&b, &trader), out);
        assert_eq!(ledger.balance_of(&a, &trader), U256::zero());
    }

    #[test]
    fn test_stable_pool_mixed_decimals() {
        let mut ledger = Ledger::new(10);
        let usdc = ledger.deploy_token("USDC", 6);
        let dai = ledger.deploy_token("DAI", 18);
        let lp_holder = Address::from_low_u64_be(9);
        ledger.mint(&usdc, lp_holder, units(1_000, 6)).unwrap();
        ledger.mint(&dai, lp_holder, units(1_000, 18)).unwrap();

        let pool = ledger.create_stable_pool([usdc, dai], 200, 4).unwrap();
        let lp = ledger
            .stable_add_liquidity(&pool, lp_holder, [units(1_000, 6), units(1_000, 18)])
            .unwrap();
        assert_eq!(lp, units(2_000, 18));

        let out = ledger.stable_remove_liquidity(&pool, lp_holder, lp).unwrap();
        assert_eq!(out, [units(1_000, 6), units(1_000, 18)]);
        assert_eq!(ledger.total_supply(&pool), U256::zero());
    }

    #[test]
    fn test_bridge_pool_keeps_dust_with_provider() {
        let mut ledger = Ledger::new(10);
        let weth = ledger.deploy_token("WETH", 18);
        let lp_holder = Address::from_low_u64_be(3);
        let deposit = units(1, 18) + U256::from(123u64);
        ledger.mint(&weth, lp_holder, deposit).unwrap();

        let pool = ledger.create_bridge_pool(weth, 6).unwrap();
        let lp = ledger.bridge_deposit(&pool, lp_holder, deposit).unwrap();
        assert_eq!(lp, U256::from(1_000_000u64));
        assert_eq!(ledger.balance_of(&weth, &lp_holder), U256::from(123u64));

        ledger.bridge_accrue_fees(&pool, units(1, 17)).unwrap();
        let out = ledger.bridge_redeem(&pool, lp_holder, lp).unwrap();
        assert_eq!(out, units(11, 17));
    }

    #[test]
    fn test_bridge_pool_rejects_swaps() {
        let mut ledger = Ledger::new(10);
        let weth = ledger.deploy_token("WETH", 18);
        let pool = ledger.create_bridge_pool(weth, 6).unwrap();
        assert!(matches!(
            ledger.preview_swap_exact(&pool, &weth, U256::one()),
            Err(SynthError::Range(_))
        ));
    }
}

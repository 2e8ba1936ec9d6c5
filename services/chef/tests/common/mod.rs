//! Shared devnet fixture for chef integration tests

#![allow(dead_code)]

use amm::PoolType;
use ledger::{DexRouter, FarmKind, Ledger, Route, RouteTable};
use std::sync::Arc;
use synth_chef::{
    BridgeLiquidityConfig, BridgeStakingVenue, ChefSettings, ConstantProductConfig,
    ConstantProductVenue, PoolConfig, StableGaugeVenue, StableSwapConfig, SynthChef,
    YieldAdapter,
};
use types::{Address, Capability, RoleTable, U256};

pub const POOL_ID: u32 = 1;

pub fn units(n: u64, decimals: u8) -> U256 {
    U256::from(n) * U256::exp10(decimals as usize)
}

pub fn admin() -> Address {
    Address::from_low_u64_be(0xad)
}

pub fn operator() -> Address {
    Address::from_low_u64_be(0x0b)
}

pub fn chef_address() -> Address {
    Address::from_low_u64_be(0xc4ef)
}

pub fn fee_collector() -> Address {
    Address::from_low_u64_be(0xfee)
}

pub fn reward_recipient() -> Address {
    Address::from_low_u64_be(0x4e7)
}

pub fn whale() -> Address {
    Address::from_low_u64_be(0xbeef)
}

pub fn roles() -> Arc<RoleTable> {
    let roles = RoleTable::new();
    roles.grant(admin(), Capability::CanRegisterPool);
    roles.grant(operator(), Capability::CanOperateFarm);
    Arc::new(roles)
}

pub fn settings(reference_token: Address, fee_bps: u32) -> ChefSettings {
    ChefSettings {
        address: chef_address(),
        reference_token,
        fee_bps,
        fee_collector: fee_collector(),
        reward_recipient: reward_recipient(),
    }
}

/// Seed a 1:1 constant-product market between two tokens
pub fn seed_pair(ledger: &mut Ledger, a: Address, b: Address, depth: u64) -> Address {
    let (da, db) = (ledger.decimals(&a).unwrap(), ledger.decimals(&b).unwrap());
    ledger.mint(&a, whale(), units(depth, da)).unwrap();
    ledger.mint(&b, whale(), units(depth, db)).unwrap();
    let pair = ledger.create_pair(a, b, 30).unwrap();
    ledger
        .pair_add_liquidity(&pair, whale(), units(depth, da), units(depth, db))
        .unwrap();
    pair
}

/// USDC/sUSD pair farmed in a VELO MasterChef
pub struct PairDevnet {
    pub ledger: Ledger,
    pub chef: SynthChef<ConstantProductVenue>,
    pub usdc: Address,
    pub susd: Address,
    pub velo: Address,
    pub pair: Address,
    pub farm: Address,
}

impl PairDevnet {
    pub fn new(fee_bps: u32) -> Self {
        let mut ledger = Ledger::new(10);
        let usdc = ledger.deploy_token("USDC", 6);
        let susd = ledger.deploy_token("sUSD", 18);
        let velo = ledger.deploy_token("VELO", 18);

        let pair = seed_pair(&mut ledger, usdc, susd, 1_000_000);
        seed_pair(&mut ledger, velo, usdc, 1_000_000);
        seed_pair(&mut ledger, velo, susd, 1_000_000);
        let farm = ledger
            .create_farm(FarmKind::MasterChef, pair, velo, U256::exp10(16))
            .unwrap();

        ledger.mint(&usdc, chef_address(), units(10_000, 6)).unwrap();
        ledger.mint(&susd, chef_address(), units(10_000, 18)).unwrap();

        let router = Arc::new(DexRouter::new(RouteTable::new()));
        let mut chef = SynthChef::new(
            ConstantProductVenue,
            settings(usdc, fee_bps),
            roles(),
            router,
        )
        .unwrap();
        chef.add_pool(&ledger, &admin(), POOL_ID, Self::config(pair, farm, usdc, susd))
            .unwrap();

        Self {
            ledger,
            chef,
            usdc,
            susd,
            velo,
            pair,
            farm,
        }
    }

    pub fn config(pair: Address, farm: Address, usdc: Address, susd: Address) -> PoolConfig {
        PoolConfig::ConstantProduct(ConstantProductConfig {
            pair,
            farm,
            tokens: [usdc, susd],
        })
    }
}

/// USDC/DAI stable pool farmed in a CRV gauge
pub struct StableDevnet {
    pub ledger: Ledger,
    pub chef: SynthChef<StableGaugeVenue>,
    pub usdc: Address,
    pub dai: Address,
    pub crv: Address,
    pub pool: Address,
    pub gauge: Address,
}

impl StableDevnet {
    pub fn new() -> Self {
        let mut ledger = Ledger::new(42161);
        let usdc = ledger.deploy_token("USDC", 6);
        let dai = ledger.deploy_token("DAI", 18);
        let crv = ledger.deploy_token("CRV", 18);

        ledger.mint(&usdc, whale(), units(1_000_000, 6)).unwrap();
        ledger.mint(&dai, whale(), units(1_000_000, 18)).unwrap();
        let pool = ledger.create_stable_pool([usdc, dai], 200, 4).unwrap();
        ledger
            .stable_add_liquidity(&pool, whale(), [units(1_000_000, 6), units(1_000_000, 18)])
            .unwrap();
        seed_pair(&mut ledger, crv, usdc, 1_000_000);
        seed_pair(&mut ledger, crv, dai, 1_000_000);
        let gauge = ledger
            .create_farm(FarmKind::Gauge, pool, crv, U256::exp10(16))
            .unwrap();

        ledger.mint(&usdc, chef_address(), units(10_000, 6)).unwrap();
        ledger.mint(&dai, chef_address(), units(10_000, 18)).unwrap();

        let routes = RouteTable::new()
            .with_route(dai, usdc, Route::Default(PoolType::StableSwap))
            .with_route(usdc, dai, Route::Default(PoolType::StableSwap));
        let router = Arc::new(DexRouter::new(routes));
        let mut chef = SynthChef::new(StableGaugeVenue, settings(usdc, 0), roles(), router).unwrap();
        chef.add_pool(
            &ledger,
            &admin(),
            POOL_ID,
            PoolConfig::StableSwap(StableSwapConfig {
                pool,
                gauge,
                coins: [usdc, dai],
            }),
        )
        .unwrap();

        Self {
            ledger,
            chef,
            usdc,
            dai,
            crv,
            pool,
            gauge,
        }
    }
}

/// USDC bridge pool staked for STG
pub struct BridgeDevnet {
    pub ledger: Ledger,
    pub chef: SynthChef<BridgeStakingVenue>,
    pub usdc: Address,
    pub stg: Address,
    pub pool: Address,
    pub staking: Address,
}

impl BridgeDevnet {
    pub fn new() -> Self {
        let mut ledger = Ledger::new(56);
        let usdc = ledger.deploy_token("USDC", 18);
        let stg = ledger.deploy_token("STG", 18);
        let pool = ledger.create_bridge_pool(usdc, 6).unwrap();
        seed_pair(&mut ledger, stg, usdc, 1_000_000);
        let staking = ledger
            .create_farm(FarmKind::LpStaking, pool, stg, U256::exp10(16))
            .unwrap();
        ledger.mint(&usdc, chef_address(), units(10_000, 18)).unwrap();

        let router = Arc::new(DexRouter::new(RouteTable::new()));
        let mut chef = SynthChef::new(BridgeStakingVenue, settings(usdc, 0), roles(), router).unwrap();
        chef.add_pool(
            &ledger,
            &admin(),
            POOL_ID,
            PoolConfig::BridgeLiquidity(BridgeLiquidityConfig {
                pool,
                staking,
                token: usdc,
            }),
        )
        .unwrap();

        Self {
            ledger,
            chef,
            usdc,
            stg,
            pool,
            staking,
        }
    }
}

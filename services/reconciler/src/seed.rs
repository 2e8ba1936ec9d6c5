//! Devnet bootstrap from configuration
//!
//! Every configured network gets a ledger, a reference collateral token and a
//! factory. Each synth is farmed on its origin network by a dedicated chef,
//! constant-product for plain SIDs and bridge-liquidity staking for SIDs
//! carrying the liquidity-staking flag, and mirrored with some circulation on
//! every other network.

use crate::devnet::{LocalNetwork, NetworkState};
use crate::queue::SubmissionQueue;
use anyhow::{Context, Result};
use ledger::{DexRouter, FarmKind, Ledger, RouteTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use synth_chef::{
    BridgeLiquidityConfig, BridgeStakingChef, BridgeStakingVenue, ChefSettings,
    ConstantProductChef, ConstantProductConfig, ConstantProductVenue, PoolConfig, YieldAdapter,
};
use synth_factory::SynthFactory;
use synthex_config::{NetworkSettings, SynthSettings, SynthexConfig};
use tracing::info;
use types::units::{parse_units, pow10};
use types::{AccessControl, Address, Capability, RoleTable, Sid, U256};

/// Principal that deploys and operates every devnet contract
pub const DEVNET_ADMIN: Address = Address::repeat_byte(0xad);

/// Market depth of every seeded venue, whole units per side
const MARKET_DEPTH: u64 = 1_000_000;

/// Reward emission of every seeded farm, 0.01 token per second
const REWARD_RATE_EXP: usize = 16;

fn whole(amount: u64, decimals: u8) -> U256 {
    U256::from(amount) * pow10(decimals)
}

/// Build one [`LocalNetwork`] per configured network
pub fn build_devnet(config: &SynthexConfig, queue: Arc<SubmissionQueue>) -> Result<Vec<Arc<LocalNetwork>>> {
    let roles = RoleTable::with_admin(DEVNET_ADMIN);
    roles.grant(config.reconciler.operator, Capability::CanSetPrice);
    let roles: Arc<dyn AccessControl> = Arc::new(roles);

    let mut states = BTreeMap::new();
    for network in &config.networks {
        let state = seed_network(network, roles.clone())
            .with_context(|| format!("Failed to seed network '{}'", network.name))?;
        states.insert(network.chain_id, state);
    }

    for synth in &config.synths {
        let origin_chain = synth.sid.chain();
        for (chain_id, state) in states.iter_mut() {
            let network = config
                .network(*chain_id)
                .context("network missing from config")?;
            if *chain_id == origin_chain {
                seed_origin(state, network, synth, roles.clone())
                    .with_context(|| format!("Failed to seed origin of {}", synth.symbol))?;
            } else {
                seed_mirror(state, synth)
                    .with_context(|| format!("Failed to mirror {} on {}", synth.symbol, network.name))?;
            }
        }
    }

    config
        .networks
        .iter()
        .map(|network| {
            let state = states
                .remove(&network.chain_id)
                .context("seeded network state missing")?;
            Ok(Arc::new(LocalNetwork::new(network.name.clone(), state, queue.clone())))
        })
        .collect()
}

fn seed_network(network: &NetworkSettings, roles: Arc<dyn AccessControl>) -> Result<NetworkState> {
    let mut ledger = Ledger::new(network.chain_id);
    let collateral = ledger.deploy_token("USDC", network.collateral_decimals);

    let mut factory = SynthFactory::new(ledger.reserve_address(), network.chain_id, roles);
    factory.set_collateral_token(&DEVNET_ADMIN, collateral, network.collateral_decimals)?;

    info!(
        network = %network.name,
        chain = network.chain_id,
        factory = ?factory.address(),
        ?collateral,
        "network seeded"
    );
    Ok(NetworkState::new(ledger, factory))
}

/// 1:1 constant-product market between two ledger tokens
fn seed_pair(ledger: &mut Ledger, a: Address, b: Address) -> Result<Address> {
    let (da, db) = (ledger.decimals(&a)?, ledger.decimals(&b)?);
    ledger.mint(&a, DEVNET_ADMIN, whole(MARKET_DEPTH, da))?;
    ledger.mint(&b, DEVNET_ADMIN, whole(MARKET_DEPTH, db))?;
    let pair = ledger.create_pair(a, b, 30)?;
    ledger.pair_add_liquidity(&pair, DEVNET_ADMIN, whole(MARKET_DEPTH, da), whole(MARKET_DEPTH, db))?;
    Ok(pair)
}

fn chef_settings(ledger: &mut Ledger, reference_token: Address, fee_bps: u32) -> ChefSettings {
    ChefSettings {
        address: ledger.reserve_address(),
        reference_token,
        fee_bps,
        fee_collector: DEVNET_ADMIN,
        reward_recipient: DEVNET_ADMIN,
    }
}

fn seed_origin(
    state: &mut NetworkState,
    network: &NetworkSettings,
    synth: &SynthSettings,
    roles: Arc<dyn AccessControl>,
) -> Result<()> {
    let sid = synth.sid;
    let ledger = &mut state.ledger;
    let collateral = state
        .factory
        .collateral_token()
        .context("factory has no collateral token")?
        .token;
    let decimals = network.collateral_decimals;
    let router = Arc::new(DexRouter::new(RouteTable::new()));
    let reward = ledger.deploy_token("RWD", 18);
    seed_pair(ledger, reward, collateral)?;
    let seed = parse_units(&synth.seed_deposit, decimals)?;

    let (chef, amounts): (Box<dyn YieldAdapter>, Vec<U256>) = if sid.is_liquidity_staking_synth() {
        let pool = ledger.create_bridge_pool(collateral, 6)?;
        let staking = ledger.create_farm(FarmKind::LpStaking, pool, reward, U256::exp10(REWARD_RATE_EXP))?;
        let settings = chef_settings(ledger, collateral, network.chef_fee_bps);
        let mut chef = BridgeStakingChef::new(BridgeStakingVenue, settings, roles, router)?;
        chef.add_pool(
            ledger,
            &DEVNET_ADMIN,
            sid.pool(),
            PoolConfig::BridgeLiquidity(BridgeLiquidityConfig {
                pool,
                staking,
                token: collateral,
            }),
        )?;
        (Box::new(chef), vec![seed])
    } else {
        let partner = ledger.deploy_token("DAI", 18);
        let pair = seed_pair(ledger, collateral, partner)?;
        seed_pair(ledger, reward, partner)?;
        let farm = ledger.create_farm(FarmKind::MasterChef, pair, reward, U256::exp10(REWARD_RATE_EXP))?;
        let settings = chef_settings(ledger, collateral, network.chef_fee_bps);
        let mut chef = ConstantProductChef::new(ConstantProductVenue, settings, roles, router)?;
        chef.add_pool(
            ledger,
            &DEVNET_ADMIN,
            sid.pool(),
            PoolConfig::ConstantProduct(ConstantProductConfig {
                pair,
                farm,
                tokens: [collateral, partner],
            }),
        )?;
        let partner_seed = parse_units(&synth.seed_deposit, 18)?;
        (Box::new(chef), vec![seed, partner_seed])
    };

    let pool_tokens = chef.get_pool_tokens(sid.pool())?;
    for (token, amount) in pool_tokens.iter().zip(&amounts) {
        ledger.mint(token, chef.address(), *amount)?;
    }
    let index = state.add_chef(chef);
    let lp = state.with_chef(index, |chef, ledger| {
        chef.deposit(ledger, &DEVNET_ADMIN, sid.pool(), &amounts)
    })?;
    state.back_synth(sid, index)?;

    info!(
        network = %network.name,
        sid = %sid.label(),
        symbol = %synth.symbol,
        %lp,
        "synth collateral farmed"
    );
    Ok(())
}

fn seed_mirror(state: &mut NetworkState, synth: &SynthSettings) -> Result<()> {
    let sid: Sid = synth.sid;
    state.factory.create_synth(&DEVNET_ADMIN, sid, &synth.symbol)?;
    let circulation = parse_units(&synth.seed_deposit, types::SYNTH_DECIMALS)?;
    state
        .factory
        .mint(&DEVNET_ADMIN, sid, circulation, DEVNET_ADMIN)?;
    Ok(())
}

//! Factory issuance, conversion and bridge notification behaviour

use proptest::prelude::*;
use std::sync::Arc;
use synth_factory::{convert_amount, BridgeNotification, FactoryState, SynthFactory};
use types::units::parse_units;
use types::{Address, Capability, ConvertDirection, RoleTable, Sid, SynthError, U256};

const SID: Sid = Sid::from_parts(10, 1, 0);

fn admin() -> Address {
    Address::from_low_u64_be(0xad)
}

fn relayer() -> Address {
    Address::from_low_u64_be(0xb41d)
}

fn factory_with_collateral(decimals: u8) -> SynthFactory {
    let roles = RoleTable::with_admin(admin());
    roles.grant(relayer(), Capability::CanMint);
    roles.grant(relayer(), Capability::CanBurn);
    let mut factory = SynthFactory::new(Address::from_low_u64_be(0xfac), 56, Arc::new(roles));
    factory.create_synth(&admin(), SID, "sVELO-USDC").unwrap();
    factory
        .set_collateral_token(&admin(), Address::from_low_u64_be(0xc011), decimals)
        .unwrap();
    factory
}

#[test]
fn test_convert_at_published_price() {
    for decimals in [6u8, 18] {
        let mut factory = factory_with_collateral(decimals);
        factory
            .set_price(&admin(), SID, parse_units("10", 18).unwrap())
            .unwrap();

        let ten = parse_units("10", decimals).unwrap();
        assert_eq!(
            factory.convert(SID, ten, ConvertDirection::CollateralToSynth).unwrap(),
            U256::exp10(18)
        );
        assert_eq!(
            factory
                .convert(SID, U256::exp10(18), ConvertDirection::SynthToCollateral)
                .unwrap(),
            ten
        );
    }
}

#[test]
fn test_unpriced_synth_buys_nothing() {
    let factory = factory_with_collateral(6);
    let out = factory
        .convert(SID, parse_units("1000000", 6).unwrap(), ConvertDirection::CollateralToSynth)
        .unwrap();
    assert_eq!(out, U256::zero());
}

#[test]
fn test_notifications_converge_regardless_of_order() {
    let notes = vec![
        BridgeNotification::mint(10, 1, SID, U256::from(100u64)),
        BridgeNotification::mint(10, 2, SID, U256::from(50u64)),
        BridgeNotification::burn(10, 3, SID, U256::from(30u64)),
        BridgeNotification::mint(42161, 1, SID, U256::from(5u64)),
    ];

    let mut in_order = factory_with_collateral(6);
    for note in &notes {
        assert!(in_order.apply_notification(&relayer(), note).unwrap());
    }

    // reversed, with every message delivered twice
    let mut shuffled = factory_with_collateral(6);
    for note in notes.iter().rev().chain(notes.iter()) {
        shuffled.apply_notification(&relayer(), note).unwrap();
    }

    assert_eq!(in_order.global_circulation(SID).unwrap(), U256::from(125u64));
    assert_eq!(shuffled.global_circulation(SID).unwrap(), U256::from(125u64));
    assert_eq!(in_order.state(), shuffled.state());
}

#[test]
fn test_replayed_notification_is_ignored() {
    let mut factory = factory_with_collateral(6);
    let note = BridgeNotification::mint(10, 9, SID, U256::from(7u64));
    assert!(factory.apply_notification(&relayer(), &note).unwrap());
    assert!(!factory.apply_notification(&relayer(), &note).unwrap());
    assert_eq!(factory.global_circulation(SID).unwrap(), U256::from(7u64));
}

#[test]
fn test_global_circulation_adds_local_supply() {
    let mut factory = factory_with_collateral(6);
    factory
        .mint(&relayer(), SID, U256::from(40u64), Address::from_low_u64_be(1))
        .unwrap();
    factory
        .apply_notification(&relayer(), &BridgeNotification::burn(10, 1, SID, U256::from(10u64)))
        .unwrap();
    // burn seen before its mint saturates the remote part at zero
    assert_eq!(factory.global_circulation(SID).unwrap(), U256::from(40u64));

    factory
        .apply_notification(&relayer(), &BridgeNotification::mint(10, 0, SID, U256::from(25u64)))
        .unwrap();
    assert_eq!(factory.global_circulation(SID).unwrap(), U256::from(55u64));
}

#[test]
fn test_notification_for_unknown_synth() {
    let mut factory = factory_with_collateral(6);
    let note = BridgeNotification::mint(10, 1, Sid::from_parts(1, 2, 3), U256::one());
    assert!(matches!(
        factory.apply_notification(&relayer(), &note),
        Err(SynthError::NotFound(_))
    ));
    assert!(matches!(
        factory.apply_notification(&Address::from_low_u64_be(0x666), &note),
        Err(SynthError::Unauthorized { .. })
    ));
}

#[test]
fn test_mint_requires_capability_and_active_synth() {
    let mut factory = factory_with_collateral(6);
    let holder = Address::from_low_u64_be(1);
    assert!(matches!(
        factory.mint(&holder, SID, U256::one(), holder),
        Err(SynthError::Unauthorized { .. })
    ));
    assert!(matches!(
        factory.mint(&admin(), Sid::from_parts(1, 1, 1), U256::one(), holder),
        Err(SynthError::NotFound(_))
    ));
    factory.mint(&admin(), SID, U256::MAX, holder).unwrap();
    assert!(matches!(
        factory.mint(&admin(), SID, U256::one(), holder),
        Err(SynthError::Overflow(_))
    ));
}

#[test]
fn test_state_snapshot_round_trip() {
    let mut factory = factory_with_collateral(18);
    factory
        .mint(&admin(), SID, U256::exp10(18), Address::from_low_u64_be(1))
        .unwrap();
    factory
        .apply_notification(&relayer(), &BridgeNotification::mint(10, 1, SID, U256::from(3u64)))
        .unwrap();

    let bytes = bincode::serialize(factory.state()).unwrap();
    let decoded: FactoryState = bincode::deserialize(&bytes).unwrap();
    assert_eq!(&decoded, factory.state());

    let json = serde_json::to_string(factory.state()).unwrap();
    let decoded: FactoryState = serde_json::from_str(&json).unwrap();
    assert_eq!(&decoded, factory.state());

    let restored = SynthFactory::new(factory.address(), 56, Arc::new(RoleTable::new())).with_state(decoded);
    assert_eq!(restored.synths().collect::<Vec<_>>(), vec![SID]);
    assert_eq!(restored.global_circulation(SID).unwrap(), U256::exp10(18) + 3);
}

#[test]
fn test_burn_against_inconsistent_snapshot_is_rejected() {
    let mut factory = factory_with_collateral(18);
    let holder = Address::from_low_u64_be(1);
    factory.mint(&admin(), SID, U256::from(10u64), holder).unwrap();

    // a hand-edited snapshot whose supply no longer covers the balances
    let mut state = factory.state().clone();
    state.synths.get_mut(&SID).unwrap().circulating_supply = U256::from(5u64);
    let mut restored = SynthFactory::new(factory.address(), 56, Arc::new(RoleTable::with_admin(admin())))
        .with_state(state.clone());

    assert!(matches!(
        restored.burn(&admin(), SID, U256::from(8u64), holder),
        Err(SynthError::Overflow(_))
    ));
    assert_eq!(restored.state(), &state);
    assert_eq!(restored.balance_of(SID, &holder).unwrap(), U256::from(10u64));
}

proptest! {
    #[test]
    fn prop_convert_round_trip(
        decimals in prop_oneof![Just(6u8), Just(18u8)],
        whole in 0u64..1_000_000_000,
        frac in 0u64..1_000_000,
        price_milli in 1u64..1_000_000,
    ) {
        let amount = U256::from(whole) * U256::exp10(decimals as usize) + U256::from(frac);
        let price = U256::from(price_milli) * U256::exp10(15);

        let synth = convert_amount(amount, decimals, price, ConvertDirection::CollateralToSynth).unwrap();
        let back = convert_amount(synth, decimals, price, ConvertDirection::SynthToCollateral).unwrap();

        prop_assert!(back <= amount);
        // one unit of the 6-decimal representation
        let tolerance = U256::exp10(decimals as usize - 6);
        prop_assert!(amount - back <= tolerance, "amount {} back {}", amount, back);
    }

    #[test]
    fn prop_mint_burn_restores_supply(a in 1u64..u64::MAX, b in 0u64..u64::MAX) {
        let mut factory = factory_with_collateral(6);
        let holder = Address::from_low_u64_be(1);
        factory.mint(&admin(), SID, U256::from(b), holder).unwrap();
        let before = factory.circulating_supply(SID).unwrap();

        factory.mint(&admin(), SID, U256::from(a), holder).unwrap();
        factory.burn(&admin(), SID, U256::from(a), holder).unwrap();
        prop_assert_eq!(factory.circulating_supply(SID).unwrap(), before);
    }
}

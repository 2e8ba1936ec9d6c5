//! Identity codec property tests
//!
//! The rest of the system addresses synths purely by SID, so the packing must
//! be a bijection over in-range fields and must refuse anything wider.

use proptest::prelude::*;
use types::{Sid, SynthError};

proptest! {
    #[test]
    fn prop_pack_unpack_roundtrip(chain in any::<u64>(), protocol in any::<u32>(), pool in any::<u32>()) {
        let sid = Sid::pack(chain as u128, protocol as u128, pool as u128).unwrap();
        prop_assert_eq!(sid.unpack(), (chain, protocol, pool));
        prop_assert_eq!(sid, Sid::from_parts(chain, protocol, pool));
    }

    #[test]
    fn prop_distinct_fields_distinct_sids(
        a in (any::<u64>(), any::<u32>(), any::<u32>()),
        b in (any::<u64>(), any::<u32>(), any::<u32>()),
    ) {
        let sid_a = Sid::from_parts(a.0, a.1, a.2);
        let sid_b = Sid::from_parts(b.0, b.1, b.2);
        prop_assert_eq!(sid_a == sid_b, a == b);
    }

    #[test]
    fn prop_wide_chain_rejected(extra in 1u128..=u64::MAX as u128, chain in any::<u64>()) {
        let wide = (extra << 64) | chain as u128;
        prop_assert!(matches!(Sid::pack(wide, 0, 0), Err(SynthError::Range(_))));
    }

    #[test]
    fn prop_wide_pool_rejected(pool in (u32::MAX as u128 + 1)..u128::MAX) {
        prop_assert!(matches!(Sid::pack(1, 1, pool), Err(SynthError::Range(_))));
    }

    #[test]
    fn prop_display_parse_roundtrip(raw in any::<u128>()) {
        let sid = Sid::from_u128(raw);
        prop_assert_eq!(sid.to_string().parse::<Sid>().unwrap(), sid);
    }
}

use proptest::prelude::*;

use passport_types::{Address, AppId, BlockNumber};

proptest! {
    /// AppId survives hex display and parse.
    #[test]
    fn app_id_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = AppId::new(bytes);
        prop_assert_eq!(AppId::from_hex(&id.to_string()), Some(id));
    }

    /// BlockNumber ordering follows the inner integer.
    #[test]
    fn block_number_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(BlockNumber::new(a) <= BlockNumber::new(b), a <= b);
    }

    /// elapsed_until saturates to zero when `now` precedes the block.
    #[test]
    fn block_elapsed_saturates(base in 1u64..1_000_000, delta in 1u64..1_000_000) {
        let later = BlockNumber::new(base + delta);
        let earlier = BlockNumber::new(base);
        prop_assert_eq!(earlier.elapsed_until(later), delta);
        prop_assert_eq!(later.elapsed_until(earlier), 0);
    }

    /// Any non-empty body after the prefix parses.
    #[test]
    fn address_parse_accepts_prefixed(body in "[a-z0-9]{1,60}") {
        let raw = format!("psp_{body}");
        let parsed = Address::parse(&raw).unwrap();
        prop_assert_eq!(parsed.as_str(), raw.as_str());
    }
}

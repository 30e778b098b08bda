use proptest::prelude::*;

use quorum_core::Digest;

proptest! {
    #[test]
    fn hex_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let digest = Digest::of(&bytes);
        let parsed: Digest = digest.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, digest);
        prop_assert_eq!(digest.to_hex().len(), 64);
    }

    #[test]
    fn json_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let digest = Digest::of(&bytes);
        let json = serde_json::to_string(&digest).unwrap();
        let back: Digest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, digest);
    }

    #[test]
    fn combine_is_order_sensitive(a in prop::collection::vec(any::<u8>(), 1..32), b in prop::collection::vec(any::<u8>(), 1..32)) {
        prop_assume!(a != b);
        let (da, db) = (Digest::of(&a), Digest::of(&b));
        prop_assert_ne!(Digest::combine([&da, &db]), Digest::combine([&db, &da]));
    }

    #[test]
    fn content_digests_are_never_genesis(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assert!(!Digest::of(&bytes).is_genesis());
    }
}

use ghoststring::{DerivedKey, GhostError, GhostString, Ghostifyer, KeyStore, Registry};
use proptest::prelude::*;

fn registry_with(namespace: &str, key_byte: u8) -> Registry {
    let key = DerivedKey::from_slice(&[key_byte; 32]).unwrap();
    let store = KeyStore::from_derived(vec![(0, key)]).unwrap();
    let registry = Registry::new();
    registry
        .register(Ghostifyer::multi_key(namespace, store).unwrap())
        .unwrap();
    registry
}

proptest! {
    #[test]
    fn any_valid_value_round_trips(
        namespace in "[a-zA-Z][-._a-zA-Z0-9]{1,40}[a-zA-Z0-9]",
        plaintext in ".{1,256}",
    ) {
        let registry = registry_with(&namespace, 3);
        let value = GhostString::new(namespace, plaintext);
        let token = registry.serialize(&value).unwrap();
        prop_assert_eq!(registry.parse(&token).unwrap(), value);
    }

    #[test]
    fn distinct_keys_never_cross_decode(plaintext in ".{1,64}", a in 0u8..128, b in 128u8..=255) {
        let left = registry_with("shared.ns", a);
        let right = registry_with("shared.ns", b);
        let token = left.serialize(&GhostString::new("shared.ns", plaintext)).unwrap();
        prop_assert_eq!(right.parse(&token), Err(GhostError::DecryptionFailed));
    }
}

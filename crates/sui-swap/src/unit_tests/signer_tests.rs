// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bech32::{ToBase32, Variant};
use sui_types::crypto::{SignatureScheme, SuiKeyPair};

use super::*;

fn encode_key(hrp: &str, flag: u8, key: &[u8]) -> String {
    let mut payload = vec![flag];
    payload.extend_from_slice(key);
    bech32::encode(hrp, payload.to_base32(), Variant::Bech32).unwrap()
}

#[test]
fn loads_ed25519_key() {
    let seed = [7u8; SEED_LENGTH];
    let encoded = encode_key(SUI_PRIV_KEY_PREFIX, SignatureScheme::ED25519.flag(), &seed);

    let identity = load_signer(&encoded).unwrap();
    assert_eq!(identity.seed(), &seed);

    let mut flagged = vec![SignatureScheme::ED25519.flag()];
    flagged.extend_from_slice(&seed);
    let expected = SuiKeyPair::from_bytes(&flagged).unwrap();
    assert_eq!(identity.address(), SuiAddress::from(&expected.public()));
}

#[test]
fn address_is_deterministic() {
    let encoded = encode_key(
        SUI_PRIV_KEY_PREFIX,
        SignatureScheme::ED25519.flag(),
        &[42u8; SEED_LENGTH],
    );
    let first = load_signer(&encoded).unwrap();
    let second = load_signer(&encoded).unwrap();
    assert_eq!(first.address(), second.address());
    assert_eq!(first.seed(), second.seed());
}

#[test]
fn different_seeds_give_different_addresses() {
    let a = encode_key(SUI_PRIV_KEY_PREFIX, 0, &[1u8; SEED_LENGTH]);
    let b = encode_key(SUI_PRIV_KEY_PREFIX, 0, &[2u8; SEED_LENGTH]);
    assert_ne!(
        load_signer(&a).unwrap().address(),
        load_signer(&b).unwrap().address()
    );
}

#[test]
fn rejects_wrong_prefix() {
    let encoded = encode_key("suipubkey", 0, &[7u8; SEED_LENGTH]);
    let err = load_signer(&encoded).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)), "{err}");
}

#[test]
fn rejects_wrong_prefix_even_with_bad_payload_length() {
    // The prefix check comes first, so the short payload is never looked at.
    let encoded = encode_key("notakey", 0, &[7u8; 5]);
    let err = load_signer(&encoded).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)), "{err}");
}

#[test]
fn rejects_short_seed() {
    let encoded = encode_key(SUI_PRIV_KEY_PREFIX, 0, &[7u8; 31]);
    let err = load_signer(&encoded).unwrap_err();
    assert!(
        matches!(
            err,
            Error::InvalidLength {
                expected: 32,
                actual: 31
            }
        ),
        "{err}"
    );
}

#[test]
fn rejects_long_seed() {
    let encoded = encode_key(SUI_PRIV_KEY_PREFIX, 0, &[7u8; 33]);
    assert!(matches!(
        load_signer(&encoded).unwrap_err(),
        Error::InvalidLength { actual: 33, .. }
    ));
}

#[test]
fn rejects_non_ed25519_scheme() {
    let encoded = encode_key(
        SUI_PRIV_KEY_PREFIX,
        SignatureScheme::Secp256k1.flag(),
        &[7u8; SEED_LENGTH],
    );
    assert!(matches!(
        load_signer(&encoded).unwrap_err(),
        Error::InvalidFormat(_)
    ));
}

#[test]
fn rejects_corrupted_checksum() {
    let mut encoded = encode_key(SUI_PRIV_KEY_PREFIX, 0, &[7u8; SEED_LENGTH]);
    let last = encoded.pop().unwrap();
    encoded.push(if last == 'q' { 'p' } else { 'q' });
    assert!(matches!(
        load_signer(&encoded).unwrap_err(),
        Error::InvalidFormat(_)
    ));
}

#[test]
fn rejects_empty_input() {
    assert!(matches!(
        load_signer("").unwrap_err(),
        Error::InvalidFormat(_)
    ));
}

#[test]
fn debug_output_hides_secret() {
    let identity = load_signer(&encode_key(SUI_PRIV_KEY_PREFIX, 0, &[9u8; SEED_LENGTH])).unwrap();
    let rendered = format!("{identity:?}");
    assert!(rendered.contains("address"));
    assert!(!rendered.contains("seed"));
}

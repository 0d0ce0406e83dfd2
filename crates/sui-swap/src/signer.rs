// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Loading a signing identity from a Bech32 encoded `suiprivkey` string.

use bech32::{FromBase32, Variant};
use shared_crypto::intent::{Intent, IntentMessage};
use sui_types::base_types::SuiAddress;
use sui_types::crypto::{Signature, SignatureScheme, SuiKeyPair};
use sui_types::transaction::{Transaction, TransactionData};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, SwapResult};

#[cfg(test)]
#[path = "unit_tests/signer_tests.rs"]
mod signer_tests;

/// Human readable part of a Bech32 encoded Sui private key.
pub const SUI_PRIV_KEY_PREFIX: &str = "suiprivkey";

/// Length of an Ed25519 seed, in bytes.
pub const SEED_LENGTH: usize = 32;

/// The raw Ed25519 seed. Overwritten with zeroes when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
struct SigningSeed([u8; SEED_LENGTH]);

pub struct SigningIdentity {
    address: SuiAddress,
    seed: SigningSeed,
    keypair: SuiKeyPair,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl SigningIdentity {
    pub fn address(&self) -> SuiAddress {
        self.address
    }

    pub fn seed(&self) -> &[u8; SEED_LENGTH] {
        &self.seed.0
    }

    pub fn keypair(&self) -> &SuiKeyPair {
        &self.keypair
    }

    /// Sign `tx_data` over its `TransactionData` intent message.
    pub fn sign_transaction(&self, tx_data: &TransactionData) -> Signature {
        let intent_msg = IntentMessage::new(Intent::sui_transaction(), tx_data.clone());
        Signature::new_secure(&intent_msg, &self.keypair)
    }

    pub fn sign_and_wrap(&self, tx_data: TransactionData) -> (Transaction, Signature) {
        let signature = self.sign_transaction(&tx_data);
        (
            Transaction::from_data(tx_data, vec![signature.clone()]),
            signature,
        )
    }
}

/// Decode a `suiprivkey1...` string into its Ed25519 seed and derive the signer address.
///
/// The Bech32 payload is a signature scheme flag byte followed by the private key. Only the
/// Ed25519 scheme is accepted.
pub fn load_signer(encoded_key: &str) -> SwapResult<SigningIdentity> {
    let seed = decode_sui_private_key(encoded_key)?;

    let mut flagged = Vec::with_capacity(SEED_LENGTH + 1);
    flagged.push(SignatureScheme::ED25519.flag());
    flagged.extend_from_slice(&seed.0);
    let keypair = SuiKeyPair::from_bytes(&flagged);
    flagged.zeroize();
    let keypair = keypair.map_err(|e| Error::InvalidFormat(e.to_string()))?;

    Ok(SigningIdentity {
        address: SuiAddress::from(&keypair.public()),
        seed,
        keypair,
    })
}

fn decode_sui_private_key(encoded_key: &str) -> SwapResult<SigningSeed> {
    let (hrp, data, variant) = bech32::decode(encoded_key.trim())
        .map_err(|e| Error::InvalidFormat(format!("failed to decode bech32: {e}")))?;
    if hrp != SUI_PRIV_KEY_PREFIX {
        return Err(Error::InvalidFormat(format!(
            "unexpected prefix: got {hrp}, want {SUI_PRIV_KEY_PREFIX}"
        )));
    }
    if variant != Variant::Bech32 {
        return Err(Error::InvalidFormat(
            "expected bech32, found bech32m".to_string(),
        ));
    }

    let mut payload = Vec::<u8>::from_base32(&data)
        .map_err(|e| Error::InvalidFormat(format!("failed to convert bits: {e}")))?;
    let result = split_seed(&payload);
    payload.zeroize();
    result
}

fn split_seed(payload: &[u8]) -> SwapResult<SigningSeed> {
    let Some((flag, key)) = payload.split_first() else {
        return Err(Error::InvalidFormat("empty key payload".to_string()));
    };
    if *flag != SignatureScheme::ED25519.flag() {
        return Err(Error::InvalidFormat(format!(
            "unsupported signature scheme flag {flag:#04x}, only ed25519 keys are supported"
        )));
    }
    let seed: [u8; SEED_LENGTH] = key.try_into().map_err(|_| Error::InvalidLength {
        expected: SEED_LENGTH,
        actual: key.len(),
    })?;
    Ok(SigningSeed(seed))
}

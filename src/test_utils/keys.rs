// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::{HashMap, HashMapExt};
use anyhow::Context as _;
use fvm_shared4::address::{BLS_PUB_LEN, SECP_PUB_LEN};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shim::{address::Address, crypto::Signature};
use crate::state::KeyManager;
use crate::utils::encoding::blake2b_256;

/// Deterministic keys and fake signatures: a signature commits to the key and
/// the signed bytes but is not verifiable cryptographically.
pub struct FakeKeyManager {
    rng: ChaCha8Rng,
    keys: HashMap<Address, Vec<u8>>,
}

impl FakeKeyManager {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            keys: HashMap::new(),
        }
    }

    fn fresh_key(&mut self, len: usize) -> Vec<u8> {
        let mut key = vec![0; len];
        self.rng.fill_bytes(&mut key);
        key
    }

    /// The bytes a signature by `addr` over `data` carries.
    pub fn signature_bytes(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut preimage = key.to_vec();
        preimage.extend_from_slice(data);
        blake2b_256(&preimage).to_vec()
    }
}

impl KeyManager for FakeKeyManager {
    fn new_secp256k1_account_address(&mut self) -> Address {
        let mut key = self.fresh_key(SECP_PUB_LEN);
        key[0] = 0x04;
        let addr = Address::new_secp256k1(&key).expect("uncompressed key has the right length");
        self.keys.insert(addr, key);
        addr
    }

    fn new_bls_account_address(&mut self) -> Address {
        let key = self.fresh_key(BLS_PUB_LEN);
        let addr = Address::new_bls(&key).expect("bls key has the right length");
        self.keys.insert(addr, key);
        addr
    }

    fn sign(&self, addr: &Address, data: &[u8]) -> anyhow::Result<Signature> {
        let key = self
            .keys
            .get(addr)
            .with_context(|| format!("no key for {addr}"))?;
        let bytes = Self::signature_bytes(key, data);
        Ok(match addr.protocol() {
            crate::shim::address::Protocol::BLS => Signature::new_bls(bytes),
            _ => Signature::new_secp256k1(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::crypto::{SignatureType, signature_type_of};

    #[test]
    fn keys_are_deterministic_per_seed() {
        let (mut a, mut b) = (FakeKeyManager::new(7), FakeKeyManager::new(7));
        assert_eq!(
            a.new_secp256k1_account_address(),
            b.new_secp256k1_account_address()
        );
        assert_eq!(a.new_bls_account_address(), b.new_bls_account_address());
    }

    #[test]
    fn signs_with_matching_scheme() {
        let mut km = FakeKeyManager::new(1);
        let bls = km.new_bls_account_address();
        let sig = km.sign(&bls, b"hello").unwrap();
        assert_eq!(Some(sig.signature_type()), signature_type_of(&bls));
        assert_eq!(sig.signature_type(), SignatureType::BLS);
        assert!(km.sign(&Address::new_id(5), b"hello").is_err());
    }
}

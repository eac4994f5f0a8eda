// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Deterministic addresses for actors that are never created.

use fvm_shared4::address::{BLS_PUB_LEN, SECP_PUB_LEN};

use crate::drivers::test_driver::OrFatal;
use crate::shim::address::{ActorID, Address};

/// Public key bytes of the given length expanded from `seed`.
fn key_material(seed: &[u8], len: usize) -> Vec<u8> {
    blake2b_simd::Params::new()
        .hash_length(len)
        .hash(seed)
        .as_bytes()
        .to_vec()
}

pub fn new_id_addr(id: ActorID) -> Address {
    Address::new_id(id)
}

/// SECP256K1 address of an uncompressed public key derived from `seed`.
pub fn new_secp256k1_addr(seed: &str) -> Address {
    let mut key = vec![0x04];
    key.extend(key_material(seed.as_bytes(), SECP_PUB_LEN - 1));
    Address::new_secp256k1(&key).or_fatal()
}

pub fn new_bls_addr(seed: u64) -> Address {
    let key = key_material(&seed.to_be_bytes(), BLS_PUB_LEN);
    Address::new_bls(&key).or_fatal()
}

pub fn new_actor_addr(seed: &str) -> Address {
    Address::new_actor(seed.as_bytes())
}

/// The ID of an ID address.
pub fn id_from_address(addr: &Address) -> ActorID {
    addr.id().or_fatal()
}

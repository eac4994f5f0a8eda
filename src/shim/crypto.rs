// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::address::{Address, Protocol};
pub use fvm_shared4::crypto::signature::{Signature, SignatureType};

/// Signature scheme a key address signs with, `None` for non-key addresses.
pub fn signature_type_of(addr: &Address) -> Option<SignatureType> {
    match addr.protocol() {
        Protocol::BLS => Some(SignatureType::BLS),
        Protocol::Secp256k1 => Some(SignatureType::Secp256k1),
        _ => None,
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use fvm_shared4::ActorID;
pub use fvm_shared4::address::{Address, Protocol};

/// Returns `true` for addresses that carry a public key (`SECP256K1` or `BLS`).
pub fn is_key_address(addr: &Address) -> bool {
    matches!(addr.protocol(), Protocol::Secp256k1 | Protocol::BLS)
}

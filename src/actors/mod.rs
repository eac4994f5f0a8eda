// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Builtin actor addresses, code identifiers, method numbers and the state
//! shapes the harness seeds at genesis or decodes in assertions.

pub mod account;
pub mod cron;
pub mod init;
pub mod market;
pub mod miner;
pub mod multisig;
pub mod paych;
pub mod power;
pub mod reward;
pub mod system;

use std::sync::LazyLock;

use cid::Cid;
use fvm_ipld_encoding::BytesSer;

use crate::shim::address::{ActorID, Address};
use crate::utils::cid::CidCborExt;

pub const SYSTEM_ACTOR_ADDR: Address = Address::new_id(0);
pub const INIT_ACTOR_ADDR: Address = Address::new_id(1);
pub const REWARD_ACTOR_ADDR: Address = Address::new_id(2);
pub const CRON_ACTOR_ADDR: Address = Address::new_id(3);
pub const STORAGE_POWER_ACTOR_ADDR: Address = Address::new_id(4);
pub const STORAGE_MARKET_ACTOR_ADDR: Address = Address::new_id(5);
pub const BURNT_FUNDS_ACTOR_ADDR: Address = Address::new_id(99);

/// First ID handed out by the init actor.
pub const FIRST_NON_SINGLETON_ADDR: ActorID = 100;

pub const EXPECTED_LEADERS_PER_EPOCH: u64 = 5;

fn builtin_code(name: &str) -> Cid {
    Cid::from_raw_blake2b256(format!("fil/1/{name}").as_bytes())
}

pub static SYSTEM_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("system"));
pub static INIT_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("init"));
pub static CRON_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("cron"));
pub static ACCOUNT_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("account"));
pub static POWER_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("storagepower"));
pub static MINER_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("storageminer"));
pub static MARKET_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("storagemarket"));
pub static PAYCH_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("paymentchannel"));
pub static MULTISIG_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("multisig"));
pub static REWARD_ACTOR_CODE_ID: LazyLock<Cid> = LazyLock::new(|| builtin_code("reward"));

/// Returns true if the code belongs to an account actor, the only kind of
/// actor allowed to originate top-level messages.
pub fn is_account_actor(code: &Cid) -> bool {
    code == &*ACCOUNT_ACTOR_CODE_ID
}

/// Serialized root node of an empty HAMT.
pub static EMPTY_MAP_BYTES: LazyLock<Vec<u8>> = LazyLock::new(|| {
    fvm_ipld_encoding::to_vec(&(BytesSer(&[]), Vec::<()>::new()))
        .expect("empty map node always encodes")
});

/// Serialized root of an empty AMT: bit width, height, count and an empty node.
pub static EMPTY_ARRAY_BYTES: LazyLock<Vec<u8>> = LazyLock::new(|| {
    fvm_ipld_encoding::to_vec(&(
        3u64,
        0u64,
        0u64,
        (BytesSer(&[0]), Vec::<()>::new(), Vec::<()>::new()),
    ))
    .expect("empty array root always encodes")
});

pub static EMPTY_MAP_CID: LazyLock<Cid> =
    LazyLock::new(|| Cid::from_encoded_cbor(&EMPTY_MAP_BYTES));

pub static EMPTY_ARRAY_CID: LazyLock<Cid> =
    LazyLock::new(|| Cid::from_encoded_cbor(&EMPTY_ARRAY_BYTES));

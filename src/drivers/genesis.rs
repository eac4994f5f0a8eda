// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Actors seeded into the state tree before a test runs.

use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use serde::Serialize;

use crate::actors::{self, account, cron, init, market, power, reward, system};
use crate::chain::must_serialize;
use crate::shim::{address::Address, econ::TokenAmount};
use crate::state::VmWrapper;

/// Total FIL held by the reward actor at genesis.
pub const TOTAL_NETWORK_BALANCE_FIL: u64 = 2_000_000_000;

/// A genesis actor: address, balance, code and DAG-CBOR encoded state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorState {
    pub addr: Address,
    pub balance: TokenAmount,
    pub code: Cid,
    pub state: RawBytes,
}

impl ActorState {
    pub fn new<S: Serialize>(addr: Address, balance: TokenAmount, code: Cid, state: &S) -> Self {
        Self {
            addr,
            balance,
            code,
            state: must_serialize(state),
        }
    }
}

/// Addresses every genesis must contain.
pub const REQUIRED_ACTORS: [Address; 3] = [
    actors::INIT_ACTOR_ADDR,
    actors::REWARD_ACTOR_ADDR,
    actors::BURNT_FUNDS_ACTOR_ADDR,
];

pub fn total_network_balance() -> TokenAmount {
    TokenAmount::from_whole(TOTAL_NETWORK_BALANCE_FIL)
}

pub fn init_actor(network_name: &str) -> ActorState {
    ActorState::new(
        actors::INIT_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::INIT_ACTOR_CODE_ID,
        &init::State::new(*actors::EMPTY_MAP_CID, network_name),
    )
}

pub fn reward_actor() -> ActorState {
    ActorState::new(
        actors::REWARD_ACTOR_ADDR,
        total_network_balance(),
        *actors::REWARD_ACTOR_CODE_ID,
        &reward::State::new(TokenAmount::from_atto(reward::GENESIS_EPOCH_REWARD)),
    )
}

pub fn burnt_funds_actor() -> ActorState {
    ActorState::new(
        actors::BURNT_FUNDS_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::ACCOUNT_ACTOR_CODE_ID,
        &account::State {
            address: actors::BURNT_FUNDS_ACTOR_ADDR,
        },
    )
}

pub fn storage_power_actor() -> ActorState {
    ActorState::new(
        actors::STORAGE_POWER_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::POWER_ACTOR_CODE_ID,
        &power::State::new(*actors::EMPTY_MAP_CID, *actors::EMPTY_MAP_CID),
    )
}

pub fn storage_market_actor() -> ActorState {
    ActorState::new(
        actors::STORAGE_MARKET_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::MARKET_ACTOR_CODE_ID,
        &market::State::new(
            *actors::EMPTY_ARRAY_CID,
            *actors::EMPTY_MAP_CID,
            *actors::EMPTY_MAP_CID,
        ),
    )
}

pub fn system_actor() -> ActorState {
    ActorState::new(
        actors::SYSTEM_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::SYSTEM_ACTOR_CODE_ID,
        &system::State {
            builtin_actors: *actors::EMPTY_MAP_CID,
        },
    )
}

pub fn cron_actor() -> ActorState {
    ActorState::new(
        actors::CRON_ACTOR_ADDR,
        TokenAmount::default(),
        *actors::CRON_ACTOR_CODE_ID,
        &cron::State {
            entries: vec![cron::Entry {
                receiver: actors::STORAGE_POWER_ACTOR_ADDR,
                method_num: cron::POWER_ON_EPOCH_TICK_END,
            }],
        },
    )
}

/// The builtin singletons every test starts from.
pub fn default_builtin_actors(network_name: &str) -> Vec<ActorState> {
    vec![
        init_actor(network_name),
        reward_actor(),
        burnt_funds_actor(),
        storage_power_actor(),
        storage_market_actor(),
        system_actor(),
        cron_actor(),
    ]
}

/// Puts the empty collection roots referenced by genesis states into the
/// implementation's store.
pub fn put_empty_roots(vm: &mut dyn VmWrapper) -> anyhow::Result<()> {
    for (bytes, expected) in [
        (&*actors::EMPTY_MAP_BYTES, *actors::EMPTY_MAP_CID),
        (&*actors::EMPTY_ARRAY_BYTES, *actors::EMPTY_ARRAY_CID),
    ] {
        let cid = vm.store_put(bytes)?;
        anyhow::ensure!(
            cid == expected,
            "store returned {cid} for an empty root, expected {expected}"
        );
    }
    Ok(())
}

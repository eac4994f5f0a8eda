// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::tuple::*;

use crate::shim::{clock::ChainEpoch, econ::TokenAmount};

/// Reward paid for the first epochs of the test network, in attoFIL.
pub const GENESIS_EPOCH_REWARD: u64 = 100_000_000_000_000_000;

/// Reward actor state. The actor balance is the treasury the block rewards
/// are drawn from.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub this_epoch_reward: TokenAmount,
    pub epoch: ChainEpoch,
    pub total_mined: TokenAmount,
}

impl State {
    pub fn new(this_epoch_reward: TokenAmount) -> Self {
        Self {
            this_epoch_reward,
            epoch: 0,
            total_mined: TokenAmount::default(),
        }
    }
}

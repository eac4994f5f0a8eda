// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_encoding::strict_bytes;

use crate::shim::{address::Address, clock::ChainEpoch, econ::TokenAmount, message::MethodNum};

pub const METHOD_CONTROL_ADDRESSES: MethodNum = 2;

/// Sector size of the test miner, 2KiB.
pub const TEST_SECTOR_SIZE: u64 = 2 << 10;

/// Registered seal proof of the test miner (`StackedDrg2KiBV1`).
pub const TEST_SEAL_PROOF_TYPE: i64 = 0;

/// Static information about a miner.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct MinerInfo {
    /// Account that owns this miner.
    pub owner: Address,
    /// Worker account for this miner.
    pub worker: Address,
    /// Additional addresses that are permitted to submit messages controlling this actor.
    pub control_addresses: Vec<Address>,
    /// Libp2p identity that should be used when connecting to this miner.
    #[serde(with = "strict_bytes")]
    pub peer_id: Vec<u8>,
    pub seal_proof_type: i64,
    pub sector_size: u64,
}

/// Miner actor state, as seeded for the test miner.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Contains static info about this miner
    pub info: Cid,
    pub pre_commit_deposits: TokenAmount,
    pub locked_funds: TokenAmount,
    pub pre_committed_sectors: Cid,
    pub sectors: Cid,
    pub proving_period_start: ChainEpoch,
}

#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct GetControlAddressesReturn {
    pub owner: Address,
    pub worker: Address,
    pub control_addresses: Vec<Address>,
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared4::bigint::{BigInt, bigint_ser};

use crate::shim::econ::TokenAmount;

/// Storage power actor state, as constructed at genesis.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    #[serde(with = "bigint_ser")]
    pub total_raw_byte_power: BigInt,
    #[serde(with = "bigint_ser")]
    pub total_quality_adj_power: BigInt,
    pub total_pledge_collateral: TokenAmount,
    pub miner_count: i64,
    pub cron_event_queue: Cid,
    pub claims: Cid,
}

impl State {
    pub fn new(empty_map: Cid, empty_multimap: Cid) -> Self {
        Self {
            total_raw_byte_power: BigInt::default(),
            total_quality_adj_power: BigInt::default(),
            total_pledge_collateral: TokenAmount::default(),
            miner_count: 0,
            cron_event_queue: empty_multimap,
            claims: empty_map,
        }
    }
}

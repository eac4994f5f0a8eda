// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;

use crate::shim::clock::ChainEpoch;

/// Storage market actor state, as constructed at genesis.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub proposals: Cid,
    pub states: Cid,
    pub pending_proposals: Cid,
    pub escrow_table: Cid,
    pub locked_table: Cid,
    pub next_id: u64,
    pub deal_ops_by_epoch: Cid,
    pub last_cron: ChainEpoch,
}

impl State {
    pub fn new(empty_array: Cid, empty_map: Cid, empty_multimap: Cid) -> Self {
        Self {
            proposals: empty_array,
            states: empty_array,
            pending_proposals: empty_map,
            escrow_table: empty_map,
            locked_table: empty_map,
            next_id: 0,
            deal_ops_by_epoch: empty_multimap,
            last_cron: 0,
        }
    }
}

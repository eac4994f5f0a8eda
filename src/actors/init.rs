// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::bail;
use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;

use crate::shim::address::{ActorID, Address, Protocol};
use crate::shim::message::MethodNum;
use crate::utils::encoding::be_u64;

pub const METHOD_EXEC: MethodNum = 2;

/// Init actor state: the robust-to-ID address map and the next ID to hand out.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub address_map: Cid,
    pub next_id: ActorID,
    pub network_name: String,
}

impl State {
    pub fn new(address_map: Cid, network_name: impl Into<String>) -> Self {
        Self {
            address_map,
            next_id: super::FIRST_NON_SINGLETON_ADDR,
            network_name: network_name.into(),
        }
    }
}

/// Init actor Exec Params
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ExecParams {
    pub code_cid: Cid,
    pub constructor_params: RawBytes,
}

/// Init actor Exec Return value
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ExecReturn {
    /// ID based address for created actor
    pub id_address: Address,
    /// Reorg safe address for actor
    pub robust_address: Address,
}

/// Robust address the init actor assigns to the `count`-th actor created by
/// the message with call sequence `call_seq` from `creator`.
///
/// The creator must be a key or actor address; ID addresses are not stable
/// across reorgs and are rejected.
pub fn robust_address(creator: &Address, call_seq: u64, count: u64) -> anyhow::Result<Address> {
    if creator.protocol() == Protocol::ID {
        bail!("cannot derive a robust address from ID address {creator}");
    }
    let mut seed = fvm_ipld_encoding::to_vec(creator)?;
    seed.extend_from_slice(&be_u64(call_seq));
    seed.extend_from_slice(&be_u64(count));
    Ok(Address::new_actor(&seed))
}

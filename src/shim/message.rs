// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;
pub use fvm_shared4::{METHOD_CONSTRUCTOR, METHOD_SEND};

use crate::shim::{address::Address, econ::TokenAmount};
use crate::utils::cid::CidCborExt;

/// Method number indicator for calling actor methods.
pub type MethodNum = u64;

/// An unsigned chain message, serialized in the canonical Filecoin tuple order.
#[derive(Clone, PartialEq, Eq, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Message {
    pub version: u64,
    pub to: Address,
    pub from: Address,
    pub sequence: u64,
    pub value: TokenAmount,
    pub gas_limit: u64,
    pub gas_fee_cap: TokenAmount,
    pub gas_premium: TokenAmount,
    pub method_num: MethodNum,
    pub params: RawBytes,
}

impl Message {
    /// Creates a new Message to transfer an amount of FIL specified in the `value` field.
    pub fn transfer(from: Address, to: Address, value: TokenAmount) -> Self {
        Message {
            version: 0,
            to,
            from,
            sequence: 0,
            value,
            gas_limit: 0,
            gas_fee_cap: TokenAmount::default(),
            gas_premium: TokenAmount::default(),
            method_num: METHOD_SEND,
            params: RawBytes::default(),
        }
    }

    /// The serialized message, as signed by the sender's key.
    pub fn signing_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(fvm_ipld_encoding::to_vec(self)?)
    }

    pub fn cid(&self) -> Cid {
        Cid::from_cbor_blake2b256(self).expect("message serialization is infallible")
    }
}

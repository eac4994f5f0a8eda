// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Message construction and the pass-through to the implementation under test.

pub mod producer;
pub mod validator;

pub use producer::{MessageProducer, MsgOpt};
pub use validator::Validator;

use crate::message::SignedMessage;
use crate::shim::{
    address::Address, clock::ChainEpoch, econ::TokenAmount, error::ExitCode, message::Message,
};
use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use serde::Serialize;

/// Where the next application happens: the epoch and the miner that authors
/// the block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    pub epoch: ChainEpoch,
    pub miner: Address,
}

impl ExecutionContext {
    pub fn new(epoch: ChainEpoch, miner: Address) -> Self {
        Self { epoch, miner }
    }
}

/// Result of a message execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageReceipt {
    pub exit_code: ExitCode,
    pub return_value: RawBytes,
    pub gas_used: u64,
}

#[derive(Clone, Debug)]
pub struct ApplyMessageResult {
    pub msg: Message,
    pub receipt: MessageReceipt,
    pub penalty: TokenAmount,
    pub reward: TokenAmount,
    pub root: Cid,
}

/// Receipts of a whole tipset, one per distinct message in application order.
#[derive(Clone, Debug)]
pub struct ApplyTipSetResult {
    pub receipts: Vec<MessageReceipt>,
    pub root: Cid,
}

/// The messages of one block as handed to the implementation.
#[derive(Clone, Debug)]
pub struct BlockMessagesInfo {
    pub miner: Address,
    pub bls_messages: Vec<Message>,
    pub secp_messages: Vec<SignedMessage>,
}

/// Serializes a harness-defined value into method parameters or an expected
/// return value.
///
/// # Panics
/// If the value cannot be encoded, which cannot happen for the tuple types
/// in [`crate::actors`].
pub fn must_serialize<T: Serialize + ?Sized>(value: &T) -> RawBytes {
    RawBytes::serialize(value).expect("harness types always encode")
}

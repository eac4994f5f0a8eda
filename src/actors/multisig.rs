// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::RawBytes;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_hamt::{BytesKey, Hamt};
use fvm_shared4::HAMT_BIT_WIDTH;

use crate::shim::{
    address::Address, clock::ChainEpoch, econ::TokenAmount, error::ExitCode, message::MethodNum,
};

pub const METHOD_PROPOSE: MethodNum = 2;

/// Identifier of a pending multisig transaction.
pub type TxnId = i64;

/// Pending transactions of a multisig, keyed by [`txn_key`].
pub type PendingTxnMap<BS> = Hamt<BS, Transaction, BytesKey>;

/// Constructor parameters for multisig actor.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ConstructorParams {
    pub signers: Vec<Address>,
    pub num_approvals_threshold: u64,
    pub unlock_duration: ChainEpoch,
}

/// Multisig actor state.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub signers: Vec<Address>,
    pub num_approvals_threshold: u64,
    pub next_tx_id: TxnId,

    // Linear unlock
    pub initial_balance: TokenAmount,
    pub start_epoch: ChainEpoch,
    pub unlock_duration: ChainEpoch,

    pub pending_txs: Cid,
}

/// A proposed transaction and the signers that approved it so far.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub to: Address,
    pub value: TokenAmount,
    pub method: MethodNum,
    pub params: RawBytes,
    pub approved: Vec<Address>,
}

/// Parameters of `Propose`.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ProposeParams {
    pub to: Address,
    pub value: TokenAmount,
    pub method: MethodNum,
    pub params: RawBytes,
}

#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct ProposeReturn {
    pub txn_id: TxnId,
    /// Whether the proposal was executed right away.
    pub applied: bool,
    pub code: ExitCode,
    pub ret: RawBytes,
}

/// HAMT key of a transaction: the zigzag varint of its ID.
pub fn txn_key(id: TxnId) -> BytesKey {
    let zigzag = ((id << 1) ^ (id >> 63)) as u64;
    let mut bz = unsigned_varint::encode::u64_buffer();
    let slice = unsigned_varint::encode::u64(zigzag, &mut bz);
    slice.into()
}

/// Loads the pending transaction map rooted at `root`.
pub fn load_pending_txns<BS: Blockstore>(
    root: &Cid,
    store: BS,
) -> Result<PendingTxnMap<BS>, fvm_ipld_hamt::Error> {
    PendingTxnMap::load_with_bit_width(root, store, HAMT_BIT_WIDTH)
}

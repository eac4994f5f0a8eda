// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Capabilities an implementation under test hands to the harness.

use cid::Cid;

use crate::chain::{ApplyMessageResult, ApplyTipSetResult, BlockMessagesInfo};
use crate::message::SignedMessage;
use crate::shim::{
    address::Address, clock::ChainEpoch, crypto::Signature, econ::TokenAmount, message::Message,
};

/// View of an actor in the state tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub code: Cid,
    pub head: Cid,
    pub call_seq_num: u64,
    pub balance: TokenAmount,
}

/// Access to the state tree and block store of the implementation.
pub trait VmWrapper {
    /// Root of the state tree as of the last flush.
    fn root(&self) -> Cid;

    /// Raw bytes stored under `cid`, if any.
    fn store_get(&self, cid: &Cid) -> anyhow::Result<Option<Vec<u8>>>;

    /// Stores DAG-CBOR encoded bytes and returns their CID.
    fn store_put(&mut self, data: &[u8]) -> anyhow::Result<Cid>;

    /// Looks up an actor by ID or key address; `None` if it does not exist.
    fn actor(&self, addr: &Address) -> anyhow::Result<Option<Actor>>;

    /// Creates an actor with the given code, balance and DAG-CBOR encoded
    /// state. Singleton actors keep their ID address; any other address is
    /// mapped to a freshly allocated ID. Fails if the address already exists.
    fn create_actor(
        &mut self,
        code: Cid,
        addr: Address,
        balance: TokenAmount,
        state: &[u8],
    ) -> anyhow::Result<(Actor, Address)>;

    /// Replaces the balance and state of an existing actor.
    fn set_actor_state(
        &mut self,
        addr: &Address,
        balance: TokenAmount,
        state: &[u8],
    ) -> anyhow::Result<Actor>;
}

/// Message application entry points of the implementation.
pub trait Applier {
    fn apply_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &Message,
    ) -> anyhow::Result<ApplyMessageResult>;

    fn apply_signed_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &SignedMessage,
    ) -> anyhow::Result<ApplyMessageResult>;

    /// Applies every block in order and settles one block reward for the
    /// tipset, awarded to the miner of the first block.
    fn apply_tipset_messages(
        &mut self,
        epoch: ChainEpoch,
        blocks: &[BlockMessagesInfo],
    ) -> anyhow::Result<ApplyTipSetResult>;
}

/// Key generation and signing.
pub trait KeyManager {
    fn new_secp256k1_account_address(&mut self) -> Address;

    fn new_bls_account_address(&mut self) -> Address;

    fn sign(&self, addr: &Address, data: &[u8]) -> anyhow::Result<Signature>;
}

/// Which classes of results the implementation wants checked.
pub trait ValidationConfig {
    fn validate_exit_code(&self) -> bool;
    fn validate_return_value(&self) -> bool;
    fn validate_gas(&self) -> bool;
    fn validate_state_root(&self) -> bool;

    /// Reward, penalty and burn settlement checks after each tipset.
    fn validate_settlement(&self) -> bool {
        true
    }
}

/// Builds the capabilities of the implementation, once per test.
pub trait Factories {
    fn new_state_and_applier(&self) -> (Box<dyn VmWrapper>, Box<dyn Applier>);
    fn new_key_manager(&self) -> Box<dyn KeyManager>;
    fn new_validation_config(&self) -> Box<dyn ValidationConfig>;
}

/// A [`ValidationConfig`] with fixed answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, smart_default::SmartDefault)]
pub struct StaticValidationConfig {
    #[default(true)]
    pub exit_code: bool,
    #[default(true)]
    pub return_value: bool,
    pub gas: bool,
    pub state_root: bool,
    #[default(true)]
    pub settlement: bool,
}

impl ValidationConfig for StaticValidationConfig {
    fn validate_exit_code(&self) -> bool {
        self.exit_code
    }

    fn validate_return_value(&self) -> bool {
        self.return_value
    }

    fn validate_gas(&self) -> bool {
        self.gas
    }

    fn validate_state_root(&self) -> bool {
        self.state_root
    }

    fn validate_settlement(&self) -> bool {
        self.settlement
    }
}

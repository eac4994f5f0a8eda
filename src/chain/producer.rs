// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::{HashMap, HashMapExt};
use fvm_ipld_encoding::RawBytes;

use super::must_serialize;
use crate::actors::{self, init, miner, multisig, paych};
use crate::shim::{
    address::Address,
    clock::ChainEpoch,
    econ::TokenAmount,
    message::{METHOD_SEND, Message, MethodNum},
};

/// Per-message override of a producer default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MsgOpt {
    Value(TokenAmount),
    Nonce(u64),
    GasLimit(u64),
    GasFeeCap(TokenAmount),
    GasPremium(TokenAmount),
    Method(MethodNum),
    Params(RawBytes),
}

/// Builds messages from gas defaults, per-sender call sequence counters and
/// the overrides given for each message.
#[derive(Debug)]
pub struct MessageProducer {
    default_gas_limit: u64,
    default_gas_fee_cap: TokenAmount,
    default_gas_premium: TokenAmount,
    nonces: HashMap<Address, u64>,
}

impl MessageProducer {
    pub fn new(gas_limit: u64, gas_fee_cap: TokenAmount, gas_premium: TokenAmount) -> Self {
        Self {
            default_gas_limit: gas_limit,
            default_gas_fee_cap: gas_fee_cap,
            default_gas_premium: gas_premium,
            nonces: HashMap::new(),
        }
    }

    pub fn default_gas_limit(&self) -> u64 {
        self.default_gas_limit
    }

    /// Generic method call.
    pub fn build(
        &mut self,
        from: Address,
        to: Address,
        method_num: MethodNum,
        params: RawBytes,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        let mut msg = Message {
            version: 0,
            to,
            from,
            sequence: 0,
            value: TokenAmount::default(),
            gas_limit: self.default_gas_limit,
            gas_fee_cap: self.default_gas_fee_cap.clone(),
            gas_premium: self.default_gas_premium.clone(),
            method_num,
            params,
        };
        let mut nonce = None;
        for opt in opts {
            match opt {
                MsgOpt::Value(v) => msg.value = v,
                MsgOpt::Nonce(n) => nonce = Some(n),
                MsgOpt::GasLimit(l) => msg.gas_limit = l,
                MsgOpt::GasFeeCap(c) => msg.gas_fee_cap = c,
                MsgOpt::GasPremium(p) => msg.gas_premium = p,
                MsgOpt::Method(m) => msg.method_num = m,
                MsgOpt::Params(p) => msg.params = p,
            }
        }
        let counter = self.nonces.entry(from).or_default();
        msg.sequence = nonce.unwrap_or(*counter);
        *counter = (*counter).max(msg.sequence.saturating_add(1));
        msg
    }

    /// Plain value transfer.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        self.build(from, to, METHOD_SEND, RawBytes::default(), opts)
    }

    /// Init actor `Exec` creating a payment channel from `from` to `to`.
    pub fn create_payment_channel_actor(
        &mut self,
        from: Address,
        to: Address,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        let params = init::ExecParams {
            code_cid: *actors::PAYCH_ACTOR_CODE_ID,
            constructor_params: must_serialize(&paych::ConstructorParams { from, to }),
        };
        self.build(
            from,
            actors::INIT_ACTOR_ADDR,
            init::METHOD_EXEC,
            must_serialize(&params),
            opts,
        )
    }

    /// Init actor `Exec` creating a multisig wallet.
    pub fn create_multisig_actor(
        &mut self,
        from: Address,
        signers: Vec<Address>,
        unlock_duration: ChainEpoch,
        num_approvals_threshold: u64,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        let ctor = multisig::ConstructorParams {
            signers,
            num_approvals_threshold,
            unlock_duration,
        };
        let params = init::ExecParams {
            code_cid: *actors::MULTISIG_ACTOR_CODE_ID,
            constructor_params: must_serialize(&ctor),
        };
        self.build(
            from,
            actors::INIT_ACTOR_ADDR,
            init::METHOD_EXEC,
            must_serialize(&params),
            opts,
        )
    }

    /// Multisig `Propose` of a transaction, sent by one of the signers.
    pub fn multisig_propose(
        &mut self,
        from: Address,
        multisig: Address,
        params: &multisig::ProposeParams,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        self.build(
            from,
            multisig,
            multisig::METHOD_PROPOSE,
            must_serialize(params),
            opts,
        )
    }

    /// Miner `ControlAddresses` query.
    pub fn miner_control_addresses(
        &mut self,
        from: Address,
        miner: Address,
        opts: impl IntoIterator<Item = MsgOpt>,
    ) -> Message {
        self.build(
            from,
            miner,
            miner::METHOD_CONTROL_ADDRESSES,
            RawBytes::default(),
            opts,
        )
    }
}

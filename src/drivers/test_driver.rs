// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Error;
use super::economics::{GasPolicy, RewardSummary};
use super::state_driver::{KeyType, MinerInfo, StateDriver};
use crate::actors::{self, init, multisig};
use crate::chain::{
    ApplyMessageResult, ExecutionContext, MessageProducer, MessageReceipt, MsgOpt, Validator,
};
use crate::message::SignedMessage;
use crate::shim::{
    address::Address, econ::TokenAmount, error::ExitCode, message::Message,
};
use crate::state::ValidationConfig;
use crate::tracker::StateTracker;

/// Unwraps results of harness infrastructure. A failure here is not a
/// conformance failure but a broken test setup or implementation fault.
pub(crate) trait OrFatal<T> {
    fn or_fatal(self) -> T;
}

impl<T, E: Into<anyhow::Error>> OrFatal<T> for Result<T, E> {
    #[track_caller]
    fn or_fatal(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("fatal: {:#}", e.into()),
        }
    }
}

/// The assertion surface a scenario drives: applies messages through the
/// implementation and checks the results.
///
/// Every method panics on a mismatch, with the expected and actual values,
/// and on infrastructure faults, with a `fatal:` message.
pub struct TestDriver {
    name: String,
    state_driver: StateDriver,
    pub producer: MessageProducer,
    pub(super) validator: Validator,
    pub exe_ctx: ExecutionContext,
    pub(super) config: Box<dyn ValidationConfig>,
    pub(super) tracker: StateTracker,
    gas_policy: GasPolicy,
    miner_info: MinerInfo,
}

impl TestDriver {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        name: String,
        state_driver: StateDriver,
        producer: MessageProducer,
        validator: Validator,
        exe_ctx: ExecutionContext,
        config: Box<dyn ValidationConfig>,
        tracker: StateTracker,
        gas_policy: GasPolicy,
        miner_info: MinerInfo,
    ) -> Self {
        Self {
            name,
            state_driver,
            producer,
            validator,
            exe_ctx,
            config,
            tracker,
            gas_policy,
            miner_info,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_driver(&self) -> &StateDriver {
        &self.state_driver
    }

    pub fn state_driver_mut(&mut self) -> &mut StateDriver {
        &mut self.state_driver
    }

    pub fn gas_policy(&self) -> &GasPolicy {
        &self.gas_policy
    }

    /// Owner, worker and ID of the miner created at build time.
    pub fn builtin_miner_info(&self) -> &MinerInfo {
        &self.miner_info
    }

    /// Persists the tracked results when the driver records fixtures.
    pub fn complete(&self) {
        if self.tracker.is_recording() {
            self.tracker.record().or_fatal();
        }
    }

    pub fn new_account_actor(
        &mut self,
        key_type: KeyType,
        balance: TokenAmount,
    ) -> (Address, Address) {
        self.state_driver
            .new_account_actor(key_type, balance)
            .or_fatal()
    }

    pub fn get_actor_state<T: DeserializeOwned>(&self, addr: &Address) -> T {
        self.state_driver.get_actor_state(addr).or_fatal()
    }

    //
    // Unsigned message appliers
    //

    pub fn apply_message(&mut self, msg: &Message) -> ApplyMessageResult {
        let result = self.apply_unsigned(msg);
        self.validate_state(msg, &result);
        result
    }

    pub fn apply_ok(&mut self, msg: &Message) -> ApplyMessageResult {
        self.apply_expect(msg, RawBytes::default())
    }

    pub fn apply_expect(&mut self, msg: &Message, retval: RawBytes) -> ApplyMessageResult {
        self.apply_expect_code_and_return(msg, ExitCode::OK, retval)
    }

    pub fn apply_failure(&mut self, msg: &Message, code: ExitCode) -> ApplyMessageResult {
        self.apply_expect_code_and_return(msg, code, RawBytes::default())
    }

    fn apply_expect_code_and_return(
        &mut self,
        msg: &Message,
        code: ExitCode,
        retval: RawBytes,
    ) -> ApplyMessageResult {
        let result = self.apply_unsigned(msg);
        self.validate_result(&result.receipt, code, &retval);
        self.validate_state(msg, &result);
        result
    }

    fn apply_unsigned(&mut self, msg: &Message) -> ApplyMessageResult {
        let result = self
            .validator
            .apply_message(self.exe_ctx.epoch, msg)
            .or_fatal();
        self.tracker.track_result(result.receipt.gas_used, result.root);
        result
    }

    //
    // Signed message appliers
    //

    pub fn apply_signed(&mut self, msg: &Message) -> ApplyMessageResult {
        let result = self.apply_signed_message(msg);
        self.validate_state(msg, &result);
        result
    }

    pub fn apply_signed_ok(&mut self, msg: &Message) -> ApplyMessageResult {
        self.apply_signed_expect(msg, RawBytes::default())
    }

    pub fn apply_signed_expect(&mut self, msg: &Message, retval: RawBytes) -> ApplyMessageResult {
        self.apply_signed_expect_code_and_return(msg, ExitCode::OK, retval)
    }

    pub fn apply_signed_failure(&mut self, msg: &Message, code: ExitCode) -> ApplyMessageResult {
        self.apply_signed_expect_code_and_return(msg, code, RawBytes::default())
    }

    fn apply_signed_expect_code_and_return(
        &mut self,
        msg: &Message,
        code: ExitCode,
        retval: RawBytes,
    ) -> ApplyMessageResult {
        let result = self.apply_signed_message(msg);
        self.validate_result(&result.receipt, code, &retval);
        self.validate_state(msg, &result);
        result
    }

    fn apply_signed_message(&mut self, msg: &Message) -> ApplyMessageResult {
        let signed = self.sign(msg);
        let result = self
            .validator
            .apply_signed_message(self.exe_ctx.epoch, &signed)
            .or_fatal();
        self.tracker.track_result(result.receipt.gas_used, result.root);
        result
    }

    /// Signs `msg` with the key of its sender. An ID sender created through
    /// the driver signs with its key address.
    pub fn sign(&self, msg: &Message) -> SignedMessage {
        let signer = self.state_driver.key_address(&msg.from);
        let bytes = msg.signing_bytes().or_fatal();
        let signature = self.state_driver.wallet().sign(&signer, &bytes).or_fatal();
        SignedMessage::new_unchecked(msg.clone(), signature)
    }

    //
    // Result validation
    //

    pub(super) fn validate_result(
        &self,
        receipt: &MessageReceipt,
        code: ExitCode,
        retval: &RawBytes,
    ) {
        if self.config.validate_exit_code() {
            assert_eq!(
                code, receipt.exit_code,
                "Expected ExitCode: {code} Actual ExitCode: {}",
                receipt.exit_code
            );
        }
        if self.config.validate_return_value() {
            assert_eq!(
                retval, &receipt.return_value,
                "Expected ReturnValue: {retval:?} Actual ReturnValue: {:?}",
                receipt.return_value
            );
        }
    }

    pub(super) fn validate_state(&mut self, msg: &Message, result: &ApplyMessageResult) {
        self.validate_tracked(&msg.cid(), result.receipt.gas_used, result.root);
    }

    /// Compares gas used and state root with the next recorded expectation.
    pub(super) fn validate_tracked(&mut self, subject: &Cid, gas_used: u64, root: Cid) {
        if self.config.validate_gas() {
            if let Some(expected) = self.tracker.next_expected_gas() {
                assert_eq!(
                    expected, gas_used,
                    "Expected GasUsed: {expected} Actual GasUsed: {gas_used} (message {subject})"
                );
            }
        }
        if self.config.validate_state_root() {
            if let Some(expected) = self.tracker.next_expected_state_root() {
                assert_eq!(
                    expected, root,
                    "Expected StateRoot: {expected} Actual StateRoot: {root} (message {subject})"
                );
            }
        }
    }

    //
    // State assertions
    //

    pub fn assert_no_actor(&self, addr: &Address) {
        let actor = self.state_driver.actor(addr).or_fatal();
        assert!(actor.is_none(), "expected no such actor {addr}");
    }

    pub fn get_balance(&self, addr: &Address) -> TokenAmount {
        self.state_driver.must_actor(addr).or_fatal().balance
    }

    pub fn get_head(&self, addr: &Address) -> Cid {
        self.state_driver.must_actor(addr).or_fatal().head
    }

    /// Checks an actor has an expected balance.
    pub fn assert_balance(&self, addr: &Address, expected: &TokenAmount) {
        let actual = self.get_balance(addr);
        assert_eq!(
            expected, &actual,
            "expected actor {addr} balance: {}, actual balance: {}",
            expected.atto(),
            actual.atto()
        );
    }

    pub fn assert_balance_callback(&self, addr: &Address, check: impl FnOnce(&TokenAmount) -> bool) {
        let balance = self.get_balance(addr);
        assert!(
            check(&balance),
            "balance {} of actor {addr} rejected by callback",
            balance.atto()
        );
    }

    pub fn assert_head(&self, addr: &Address, expected: &Cid) {
        let head = self.get_head(addr);
        assert_eq!(expected, &head, "expected actor {addr} head {expected}, actual {head}");
    }

    /// Checks that after executing a message the sender's balance dropped by
    /// the message cost and its call sequence number is `call_seq_num`.
    pub fn assert_actor_change(
        &self,
        addr: &Address,
        prev_balance: &TokenAmount,
        gas_limit: u64,
        gas_premium: &TokenAmount,
        transferred: &TokenAmount,
        receipt: &MessageReceipt,
        call_seq_num: u64,
    ) {
        let actor = self.state_driver.must_actor(addr).or_fatal();
        let cost = self.calc_message_cost(gas_limit, gas_premium, transferred, receipt);
        let expected = prev_balance - &cost;
        assert_eq!(
            expected,
            actor.balance,
            "expected actor {addr} balance: {}, actual balance: {}",
            expected.atto(),
            actor.balance.atto()
        );
        assert_eq!(
            call_seq_num, actor.call_seq_num,
            "expected actor {addr} callSeqNum: {call_seq_num}, actual : {}",
            actor.call_seq_num
        );
    }

    pub fn assert_multisig_state(&self, multisig_addr: &Address, expected: &multisig::State) {
        let actual: multisig::State = self.get_actor_state(multisig_addr);
        assert_eq!(
            expected.initial_balance, actual.initial_balance,
            "expected InitialBalance: {:?}, actual InitialBalance: {:?}",
            expected.initial_balance, actual.initial_balance
        );
        assert_eq!(
            expected.next_tx_id, actual.next_tx_id,
            "expected NextTxnID: {}, actual NextTxnID: {}",
            expected.next_tx_id, actual.next_tx_id
        );
        assert_eq!(
            expected.num_approvals_threshold, actual.num_approvals_threshold,
            "expected NumApprovalsThreshold: {}, actual NumApprovalsThreshold: {}",
            expected.num_approvals_threshold, actual.num_approvals_threshold
        );
        assert_eq!(
            expected.start_epoch, actual.start_epoch,
            "expected StartEpoch: {}, actual StartEpoch: {}",
            expected.start_epoch, actual.start_epoch
        );
        assert_eq!(
            expected.unlock_duration, actual.unlock_duration,
            "expected UnlockDuration: {}, actual UnlockDuration: {}",
            expected.unlock_duration, actual.unlock_duration
        );
        for signer in &expected.signers {
            assert!(
                actual.signers.contains(signer),
                "expected Signer: {signer}, actual Signers: {:?}",
                actual.signers
            );
        }
    }

    /// Asserts that the multisig at `multisig_addr` holds `expected` as
    /// pending transaction `txn_id`.
    pub fn assert_multisig_transaction(
        &self,
        multisig_addr: &Address,
        txn_id: multisig::TxnId,
        expected: &multisig::Transaction,
    ) {
        let actual = self
            .state_driver
            .multisig_transaction(multisig_addr, txn_id)
            .or_fatal();
        let Some(actual) = actual else {
            panic!("multisig {multisig_addr} has no pending transaction {txn_id}");
        };
        assert_eq!(
            expected, &actual,
            "expected multisig {multisig_addr} transaction {txn_id}: {expected:?}, actual: {actual:?}"
        );
    }

    pub fn assert_multisig_contains_transaction(
        &self,
        multisig_addr: &Address,
        txn_id: multisig::TxnId,
        contains: bool,
    ) {
        let found = self
            .state_driver
            .multisig_transaction(multisig_addr, txn_id)
            .or_fatal()
            .is_some();
        assert_eq!(
            contains, found,
            "expected multisig {multisig_addr} to contain transaction {txn_id}: {contains}, actual: {found}"
        );
    }

    /// The return value of an init actor `Exec` sent by `from`.
    pub fn compute_init_actor_exec_return(
        &self,
        from: &Address,
        originator_call_seq: u64,
        new_actor_address_count: u64,
        expected_new_addr: Address,
    ) -> init::ExecReturn {
        let robust_address =
            init::robust_address(from, originator_call_seq, new_actor_address_count).or_fatal();
        init::ExecReturn {
            id_address: expected_new_addr,
            robust_address,
        }
    }

    /// Creates a multisig actor from `from` and checks its initial state.
    #[allow(clippy::too_many_arguments)]
    pub fn must_create_and_verify_multisig_actor(
        &mut self,
        nonce: u64,
        value: TokenAmount,
        multisig_addr: &Address,
        from: Address,
        params: &multisig::ConstructorParams,
        code: ExitCode,
        retval: RawBytes,
    ) {
        let msg = self.producer.create_multisig_actor(
            from,
            params.signers.clone(),
            params.unlock_duration,
            params.num_approvals_threshold,
            [MsgOpt::Nonce(nonce), MsgOpt::Value(value.clone())],
        );
        self.apply_expect_code_and_return(&msg, code, retval);

        let (initial_balance, start_epoch) = if params.unlock_duration > 0 {
            (value.clone(), self.exe_ctx.epoch)
        } else {
            (TokenAmount::default(), 0)
        };
        self.assert_multisig_state(
            multisig_addr,
            &multisig::State {
                signers: params.signers.clone(),
                num_approvals_threshold: params.num_approvals_threshold,
                next_tx_id: 0,
                initial_balance,
                start_epoch,
                unlock_duration: params.unlock_duration,
                pending_txs: *actors::EMPTY_MAP_CID,
            },
        );
        self.assert_balance(multisig_addr, &value);
    }

    pub fn get_reward_summary(&self) -> RewardSummary {
        self.state_driver.reward_summary().or_fatal()
    }

    pub fn calc_message_cost(
        &self,
        gas_limit: u64,
        gas_premium: &TokenAmount,
        transferred: &TokenAmount,
        receipt: &MessageReceipt,
    ) -> TokenAmount {
        self.gas_policy
            .message_cost(gas_limit, gas_premium, transferred, receipt)
    }

    /// Resolves the miner of a block, failing unless it is a miner actor.
    pub(super) fn check_miner(&self, miner: &Address) -> Result<(), Error> {
        match self.state_driver.actor(miner)? {
            Some(actor) if actor.code == *actors::MINER_ACTOR_CODE_ID => Ok(()),
            Some(_) => {
                debug!(%miner, "block miner is not a miner actor");
                Err(Error::NotAMiner(*miner))
            }
            None => {
                debug!(%miner, "block miner not found");
                Err(Error::UnknownMiner(*miner))
            }
        }
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Multi-block tipsets: assembly, application and settlement verification.

use ahash::{HashSet, HashSetExt};
use cid::Cid;
use fvm_ipld_encoding::RawBytes;
use itertools::Itertools as _;
use tracing::debug;

use super::Error;
use super::economics::TipsetExpectation;
use super::test_driver::{OrFatal, TestDriver};
use crate::actors::{BURNT_FUNDS_ACTOR_ADDR, REWARD_ACTOR_ADDR};
use crate::chain::{ApplyTipSetResult, BlockMessagesInfo};
use crate::shim::{address::Address, error::ExitCode, message::Message};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MessageKind {
    Bls,
    Secp,
}

#[derive(Clone, Debug)]
struct ExpectedMessage {
    msg: Message,
    kind: MessageKind,
    code: ExitCode,
    ret: RawBytes,
}

/// Messages of one block, each with its expected exit code and return value.
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    miner: Address,
    messages: Vec<ExpectedMessage>,
}

impl BlockBuilder {
    pub fn new(miner: Address) -> Self {
        Self {
            miner,
            messages: Vec::new(),
        }
    }

    pub fn miner(&self) -> Address {
        self.miner
    }

    fn with(mut self, msg: Message, kind: MessageKind, code: ExitCode, ret: RawBytes) -> Self {
        self.messages.push(ExpectedMessage {
            msg,
            kind,
            code,
            ret,
        });
        self
    }

    pub fn with_bls_message_ok(self, msg: Message) -> Self {
        self.with(msg, MessageKind::Bls, ExitCode::OK, RawBytes::default())
    }

    pub fn with_bls_message_and_code(self, msg: Message, code: ExitCode) -> Self {
        self.with(msg, MessageKind::Bls, code, RawBytes::default())
    }

    pub fn with_bls_message_and_ret(self, msg: Message, ret: RawBytes) -> Self {
        self.with(msg, MessageKind::Bls, ExitCode::OK, ret)
    }

    pub fn with_secp_message_ok(self, msg: Message) -> Self {
        self.with(msg, MessageKind::Secp, ExitCode::OK, RawBytes::default())
    }

    pub fn with_secp_message_and_code(self, msg: Message, code: ExitCode) -> Self {
        self.with(msg, MessageKind::Secp, code, RawBytes::default())
    }

    pub fn with_secp_message_and_ret(self, msg: Message, ret: RawBytes) -> Self {
        self.with(msg, MessageKind::Secp, ExitCode::OK, ret)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// BLS messages first, then SECP messages, each in insertion order.
    fn ordered(&self) -> impl Iterator<Item = &ExpectedMessage> {
        let bls = self.messages.iter().filter(|m| m.kind == MessageKind::Bls);
        let secp = self.messages.iter().filter(|m| m.kind == MessageKind::Secp);
        bls.chain(secp)
    }
}

/// The blocks of one tipset. The first block's miner receives the reward.
#[derive(Clone, Debug, Default)]
pub struct TipSetMessageBuilder {
    blocks: Vec<BlockBuilder>,
}

impl TipSetMessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block_builder(mut self, block: BlockBuilder) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(&self) -> &[BlockBuilder] {
        &self.blocks
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Applies the tipset at the driver's current epoch and checks every
    /// receipt, the tracked gas and state roots, and the reward, penalty and
    /// burn settlement.
    ///
    /// Misuse is returned as an error. Mismatches panic; a settlement
    /// mismatch lists every affected actor.
    pub fn apply_and_validate(&self, td: &mut TestDriver) -> Result<ApplyTipSetResult, Error> {
        let first = self.blocks.first().ok_or(Error::EmptyTipSet)?;
        for block in &self.blocks {
            td.check_miner(&block.miner)?;
        }

        // A message included by several blocks is applied once, where it
        // first appears.
        let mut seen: HashSet<Cid> = HashSet::new();
        let mut expected = Vec::new();
        let mut infos = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let mut info = BlockMessagesInfo {
                miner: block.miner,
                bls_messages: Vec::new(),
                secp_messages: Vec::new(),
            };
            for entry in block.ordered() {
                match entry.kind {
                    MessageKind::Bls => info.bls_messages.push(entry.msg.clone()),
                    MessageKind::Secp => info.secp_messages.push(td.sign(&entry.msg)),
                }
                if seen.insert(entry.msg.cid()) {
                    expected.push(entry);
                }
            }
            infos.push(info);
        }

        let sd = td.state_driver();
        let rewards = sd.reward_summary()?;
        let watched: Vec<Address> = expected
            .iter()
            .flat_map(|e| [sd.resolve(&e.msg.from), sd.resolve(&e.msg.to)])
            .chain([
                sd.resolve(&first.miner),
                BURNT_FUNDS_ACTOR_ADDR,
                REWARD_ACTOR_ADDR,
            ])
            .unique()
            .collect();
        let before = sd.snapshot(&watched)?;

        let epoch = td.exe_ctx.epoch;
        debug!(
            epoch,
            blocks = infos.len(),
            messages = expected.len(),
            "applying tipset"
        );
        let result = td.validator.apply_tipset_messages(epoch, &infos).or_fatal();
        if result.receipts.len() != expected.len() {
            Err::<(), _>(Error::ReceiptCountMismatch {
                expected: expected.len(),
                actual: result.receipts.len(),
            })
            .or_fatal();
        }

        for (entry, receipt) in expected.iter().zip(&result.receipts) {
            td.tracker.track_result(receipt.gas_used, result.root);
            td.validate_result(receipt, entry.code, &entry.ret);
            td.validate_tracked(&entry.msg.cid(), receipt.gas_used, result.root);
        }

        if td.config.validate_settlement() {
            let sd = td.state_driver();
            let expectation = TipsetExpectation::compute(
                td.gas_policy(),
                &rewards,
                first.miner,
                expected.iter().map(|e| &e.msg).zip(&result.receipts),
                |addr| sd.resolve(addr),
            );
            let after = sd.snapshot(&watched)?;
            let discrepancies = expectation.verify(&before, &after);
            if !discrepancies.is_empty() {
                panic!(
                    "tipset settlement mismatch at epoch {epoch}:\n  - {}",
                    discrepancies.iter().join("\n  - ")
                );
            }
        }

        Ok(result)
    }
}

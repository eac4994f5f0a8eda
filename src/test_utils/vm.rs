// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! A small in-memory state machine that implements just enough of the
//! protocol for the scenario suites: transfers, implicit account creation,
//! init actor `Exec` of payment channels and multisigs, multisig `Propose`,
//! miner `ControlAddresses`, and tipset reward settlement.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use anyhow::{Context as _, bail};
use cid::Cid;
use fvm_ipld_blockstore::{Blockstore, MemoryBlockstore};
use fvm_ipld_encoding::RawBytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::actors::{self, account, init, miner, multisig, paych, reward};
use crate::chain::{
    ApplyMessageResult, ApplyTipSetResult, BlockMessagesInfo, MessageReceipt, must_serialize,
};
use crate::drivers::economics::GasPolicy;
use crate::message::SignedMessage;
use crate::shim::{
    address::{ActorID, Address, is_key_address},
    clock::ChainEpoch,
    econ::{TokenAmount, gas_cost},
    error::ExitCode,
    message::{METHOD_SEND, Message},
};
use crate::state::{Actor, Applier, VmWrapper};
use crate::utils::cid::CidCborExt;

pub const GAS_ON_CHAIN_MESSAGE_BASE: u64 = 38_863;
pub const GAS_ON_CHAIN_MESSAGE_PER_BYTE: u64 = 1_300;
pub const GAS_SEND_BASE: u64 = 29_233;
pub const GAS_METHOD_INVOKE: u64 = 5_377;
pub const GAS_CREATE_ACTOR: u64 = 1_108_454;
pub const GAS_RETURN_PER_BYTE: u64 = 1_300;

/// Deliberate protocol violations, to check the harness catches them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Faults {
    /// Pays the miner the full award without deducting penalties.
    pub unpenalized_miner: bool,
    /// Panics instead of applying anything.
    pub panic_on_apply: bool,
}

/// Why execution stopped early.
enum Abort {
    Exit(ExitCode),
    Fatal(anyhow::Error),
}

impl From<anyhow::Error> for Abort {
    fn from(e: anyhow::Error) -> Self {
        Abort::Fatal(e)
    }
}

type ExecResult<T> = Result<T, Abort>;

struct GasTracker {
    limit: u64,
    used: u64,
}

impl GasTracker {
    fn charge(&mut self, gas: u64) -> ExecResult<()> {
        let used = self.used.saturating_add(gas);
        if used > self.limit {
            self.used = self.limit;
            return Err(Abort::Exit(ExitCode::SYS_OUT_OF_GAS));
        }
        self.used = used;
        Ok(())
    }
}

/// Outcome of one message before settlement.
struct Applied {
    receipt: MessageReceipt,
    penalty: TokenAmount,
    tip: TokenAmount,
}

pub struct ReferenceVm {
    store: MemoryBlockstore,
    actors: BTreeMap<ActorID, Actor>,
    addresses: HashMap<Address, ActorID>,
    root: Cid,
    policy: GasPolicy,
    faults: Faults,
}

impl ReferenceVm {
    pub fn new(faults: Faults) -> Self {
        Self {
            store: MemoryBlockstore::new(),
            actors: BTreeMap::new(),
            addresses: HashMap::new(),
            root: Cid::default(),
            policy: GasPolicy::default(),
            faults,
        }
    }

    fn lookup_id(&self, addr: &Address) -> Option<ActorID> {
        match addr.id() {
            Ok(id) => self.actors.contains_key(&id).then_some(id),
            Err(_) => self.addresses.get(addr).copied(),
        }
    }

    fn actor_mut(&mut self, id: ActorID) -> anyhow::Result<&mut Actor> {
        self.actors
            .get_mut(&id)
            .with_context(|| format!("actor {id} not found"))
    }

    fn put_object<T: Serialize>(&self, obj: &T) -> anyhow::Result<Cid> {
        let bytes = fvm_ipld_encoding::to_vec(obj)?;
        self.put_bytes(&bytes)
    }

    fn put_bytes(&self, bytes: &[u8]) -> anyhow::Result<Cid> {
        let cid = Cid::from_encoded_cbor(bytes);
        self.store.put_keyed(&cid, bytes)?;
        Ok(cid)
    }

    fn get_object<T: DeserializeOwned>(&self, cid: &Cid) -> anyhow::Result<T> {
        let bytes = self
            .store
            .get(cid)?
            .with_context(|| format!("object {cid} not found"))?;
        Ok(fvm_ipld_encoding::from_slice(&bytes)?)
    }

    fn state_of<T: DeserializeOwned>(&self, id: ActorID) -> anyhow::Result<T> {
        let head = self
            .actors
            .get(&id)
            .with_context(|| format!("actor {id} not found"))?
            .head;
        self.get_object(&head)
    }

    fn set_state<T: Serialize>(&mut self, id: ActorID, state: &T) -> anyhow::Result<()> {
        let head = self.put_object(state)?;
        self.actor_mut(id)?.head = head;
        Ok(())
    }

    fn credit(&mut self, id: ActorID, amount: &TokenAmount) -> anyhow::Result<()> {
        let actor = self.actor_mut(id)?;
        actor.balance = &actor.balance + amount;
        Ok(())
    }

    fn debit(&mut self, id: ActorID, amount: &TokenAmount) -> anyhow::Result<()> {
        let actor = self.actor_mut(id)?;
        actor.balance = &actor.balance - amount;
        Ok(())
    }

    /// Hands out the next ID from the init actor's state.
    fn allocate_id(&mut self) -> anyhow::Result<ActorID> {
        let init_id = actors::INIT_ACTOR_ADDR.id()?;
        let mut st: init::State = self.state_of(init_id)?;
        let id = st.next_id;
        st.next_id += 1;
        self.set_state(init_id, &st)?;
        Ok(id)
    }

    fn insert_actor(&mut self, addr: Address, actor: Actor) -> anyhow::Result<Address> {
        let id = match addr.id() {
            Ok(id) => id,
            Err(_) => {
                if self.addresses.contains_key(&addr) {
                    bail!("actor {addr} already exists");
                }
                let id = self.allocate_id()?;
                self.addresses.insert(addr, id);
                id
            }
        };
        if self.actors.insert(id, actor).is_some() {
            bail!("actor {id} already exists");
        }
        Ok(Address::new_id(id))
    }

    fn flush(&mut self) -> anyhow::Result<Cid> {
        let actors: Vec<_> = self
            .actors
            .iter()
            .map(|(id, a)| (*id, a.code, a.head, a.call_seq_num, a.balance.clone()))
            .collect();
        let mut addresses: Vec<_> = self.addresses.iter().map(|(a, id)| (*a, *id)).collect();
        addresses.sort_by_key(|(a, _)| a.to_bytes());
        self.root = Cid::from_cbor_blake2b256(&(actors, addresses))?;
        Ok(self.root)
    }

    /// Applies one message. Tips go to the reward actor until settlement.
    fn apply(&mut self, epoch: ChainEpoch, msg: &Message, size: usize) -> anyhow::Result<Applied> {
        if self.faults.panic_on_apply {
            panic!("reference vm asked to fail");
        }
        let rejected = |exit_code| Applied {
            receipt: MessageReceipt {
                exit_code,
                return_value: RawBytes::default(),
                gas_used: 0,
            },
            penalty: self.policy.miner_penalty(msg.gas_limit),
            tip: TokenAmount::default(),
        };

        let Some(sender_id) = self.lookup_id(&msg.from) else {
            return Ok(rejected(ExitCode::SYS_SENDER_INVALID));
        };
        let sender = self.actors[&sender_id].clone();
        if !actors::is_account_actor(&sender.code) {
            return Ok(rejected(ExitCode::SYS_SENDER_INVALID));
        }
        if sender.call_seq_num != msg.sequence {
            return Ok(rejected(ExitCode::SYS_SENDER_STATE_INVALID));
        }
        let max_gas_cost = gas_cost(&msg.gas_fee_cap, msg.gas_limit);
        if sender.balance < max_gas_cost {
            return Ok(rejected(ExitCode::SYS_SENDER_STATE_INVALID));
        }

        self.debit(sender_id, &max_gas_cost)?;
        self.actor_mut(sender_id)?.call_seq_num += 1;

        let checkpoint = (self.actors.clone(), self.addresses.clone());
        let mut gas = GasTracker {
            limit: msg.gas_limit,
            used: 0,
        };
        let (exit_code, return_value) =
            match self.execute(epoch, msg, sender_id, size as u64, &mut gas) {
                Ok(ret) => (ExitCode::OK, ret),
                Err(Abort::Exit(code)) => {
                    (self.actors, self.addresses) = checkpoint;
                    (code, RawBytes::default())
                }
                Err(Abort::Fatal(e)) => return Err(e),
            };

        let out = self.policy.gas_outputs(
            gas.used,
            msg.gas_limit,
            &msg.gas_fee_cap,
            &msg.gas_premium,
        );
        self.credit(sender_id, &out.refund)?;
        self.credit(actors::BURNT_FUNDS_ACTOR_ADDR.id()?, &out.burn())?;
        self.credit(actors::REWARD_ACTOR_ADDR.id()?, &out.miner_tip)?;

        Ok(Applied {
            receipt: MessageReceipt {
                exit_code,
                return_value,
                gas_used: gas.used,
            },
            penalty: out.miner_penalty,
            tip: out.miner_tip,
        })
    }

    fn execute(
        &mut self,
        epoch: ChainEpoch,
        msg: &Message,
        sender_id: ActorID,
        size: u64,
        gas: &mut GasTracker,
    ) -> ExecResult<RawBytes> {
        gas.charge(GAS_ON_CHAIN_MESSAGE_BASE + GAS_ON_CHAIN_MESSAGE_PER_BYTE * size)?;

        let receiver_id = match self.lookup_id(&msg.to) {
            Some(id) => id,
            None if is_key_address(&msg.to) => {
                gas.charge(GAS_CREATE_ACTOR)?;
                self.create_account(msg.to)?
            }
            None => return Err(Abort::Exit(ExitCode::SYS_INVALID_RECEIVER)),
        };

        gas.charge(GAS_SEND_BASE)?;
        self.transfer(sender_id, receiver_id, &msg.value)?;

        let ret = if msg.method_num == METHOD_SEND {
            RawBytes::default()
        } else {
            gas.charge(GAS_METHOD_INVOKE)?;
            let code = self.actors[&receiver_id].code;
            if code == *actors::INIT_ACTOR_CODE_ID && msg.method_num == init::METHOD_EXEC {
                self.exec(epoch, msg, sender_id, receiver_id, gas)?
            } else if code == *actors::MULTISIG_ACTOR_CODE_ID
                && msg.method_num == multisig::METHOD_PROPOSE
            {
                self.propose(msg, sender_id, receiver_id)?
            } else if code == *actors::MINER_ACTOR_CODE_ID
                && msg.method_num == miner::METHOD_CONTROL_ADDRESSES
            {
                self.control_addresses(receiver_id)?
            } else {
                return Err(Abort::Exit(ExitCode::USR_UNHANDLED_MESSAGE));
            }
        };

        gas.charge(GAS_RETURN_PER_BYTE * ret.bytes().len() as u64)?;
        Ok(ret)
    }

    fn transfer(&mut self, from: ActorID, to: ActorID, value: &TokenAmount) -> ExecResult<()> {
        if value.is_zero() || from == to {
            return Ok(());
        }
        if &self.actors[&from].balance < value {
            return Err(Abort::Exit(ExitCode::SYS_INSUFFICIENT_FUNDS));
        }
        self.debit(from, value)?;
        self.credit(to, value)?;
        Ok(())
    }

    fn create_account(&mut self, key: Address) -> anyhow::Result<ActorID> {
        let head = self.put_object(&account::State { address: key })?;
        let id = self.insert_actor(
            key,
            Actor {
                code: *actors::ACCOUNT_ACTOR_CODE_ID,
                head,
                call_seq_num: 0,
                balance: TokenAmount::default(),
            },
        )?;
        Ok(id.id()?)
    }

    fn exec(
        &mut self,
        epoch: ChainEpoch,
        msg: &Message,
        sender_id: ActorID,
        init_id: ActorID,
        gas: &mut GasTracker,
    ) -> ExecResult<RawBytes> {
        let params: init::ExecParams = msg
            .params
            .deserialize()
            .map_err(|_| Abort::Exit(ExitCode::USR_ILLEGAL_ARGUMENT))?;
        let state = if params.code_cid == *actors::PAYCH_ACTOR_CODE_ID {
            let ctor: paych::ConstructorParams = params
                .constructor_params
                .deserialize()
                .map_err(|_| Abort::Exit(ExitCode::USR_ILLEGAL_ARGUMENT))?;
            must_serialize(&paych::State {
                from: ctor.from,
                to: ctor.to,
                to_send: TokenAmount::default(),
                settling_at: 0,
                min_settle_height: 0,
                lane_states: *actors::EMPTY_ARRAY_CID,
            })
        } else if params.code_cid == *actors::MULTISIG_ACTOR_CODE_ID {
            let ctor: multisig::ConstructorParams = params
                .constructor_params
                .deserialize()
                .map_err(|_| Abort::Exit(ExitCode::USR_ILLEGAL_ARGUMENT))?;
            let (initial_balance, start_epoch) = if ctor.unlock_duration > 0 {
                (msg.value.clone(), epoch)
            } else {
                (TokenAmount::default(), 0)
            };
            must_serialize(&multisig::State {
                signers: ctor.signers,
                num_approvals_threshold: ctor.num_approvals_threshold,
                next_tx_id: 0,
                initial_balance,
                start_epoch,
                unlock_duration: ctor.unlock_duration,
                pending_txs: *actors::EMPTY_MAP_CID,
            })
        } else {
            return Err(Abort::Exit(ExitCode::USR_FORBIDDEN));
        };

        gas.charge(GAS_CREATE_ACTOR)?;
        let origin: account::State = self.state_of(sender_id)?;
        let robust_address = init::robust_address(&origin.address, msg.sequence, 0)?;
        let head = self.put_bytes(state.bytes())?;
        let id_address = self.insert_actor(
            robust_address,
            Actor {
                code: params.code_cid,
                head,
                call_seq_num: 0,
                balance: TokenAmount::default(),
            },
        )?;
        self.transfer(init_id, id_address.id().map_err(anyhow::Error::from)?, &msg.value)?;

        Ok(must_serialize(&init::ExecReturn {
            id_address,
            robust_address,
        }))
    }

    /// Records a proposal as pending, approved by its proposer. Approvals
    /// and execution are not modelled.
    fn propose(
        &mut self,
        msg: &Message,
        sender_id: ActorID,
        multisig_id: ActorID,
    ) -> ExecResult<RawBytes> {
        let params: multisig::ProposeParams = msg
            .params
            .deserialize()
            .map_err(|_| Abort::Exit(ExitCode::USR_ILLEGAL_ARGUMENT))?;
        let proposer = Address::new_id(sender_id);
        let mut st: multisig::State = self.state_of(multisig_id)?;
        if !st.signers.contains(&proposer) {
            return Err(Abort::Exit(ExitCode::USR_FORBIDDEN));
        }

        let txn_id = st.next_tx_id;
        st.next_tx_id += 1;
        st.pending_txs = self.put_pending_txn(
            &st.pending_txs,
            txn_id,
            multisig::Transaction {
                to: params.to,
                value: params.value,
                method: params.method,
                params: params.params,
                approved: vec![proposer],
            },
        )?;
        self.set_state(multisig_id, &st)?;

        Ok(must_serialize(&multisig::ProposeReturn {
            txn_id,
            applied: false,
            code: ExitCode::OK,
            ret: RawBytes::default(),
        }))
    }

    fn put_pending_txn(
        &self,
        root: &Cid,
        txn_id: multisig::TxnId,
        txn: multisig::Transaction,
    ) -> anyhow::Result<Cid> {
        let mut txns = multisig::load_pending_txns(root, &self.store)?;
        txns.set(multisig::txn_key(txn_id), txn)?;
        Ok(txns.flush()?)
    }

    fn control_addresses(&self, miner_id: ActorID) -> ExecResult<RawBytes> {
        let st: miner::State = self.state_of(miner_id)?;
        let info: miner::MinerInfo = self.get_object(&st.info)?;
        Ok(must_serialize(&miner::GetControlAddressesReturn {
            owner: info.owner,
            worker: info.worker,
            control_addresses: info.control_addresses,
        }))
    }

    /// Pays the block reward and gas rewards, less burned penalties, to
    /// `miner`.
    fn settle(
        &mut self,
        epoch: ChainEpoch,
        miner: &Address,
        penalty: &TokenAmount,
        tips: &TokenAmount,
    ) -> anyhow::Result<()> {
        let miner_id = self
            .lookup_id(miner)
            .with_context(|| format!("miner {miner} not found"))?;
        let reward_id = actors::REWARD_ACTOR_ADDR.id()?;
        let mut st: reward::State = self.state_of(reward_id)?;
        let block_reward = TokenAmount::from_atto(
            st.this_epoch_reward.atto() / actors::EXPECTED_LEADERS_PER_EPOCH,
        );

        let available = &block_reward + tips;
        let burned_penalty = if self.faults.unpenalized_miner {
            TokenAmount::default()
        } else {
            penalty.clone().min(available.clone())
        };
        let award = &available - &burned_penalty;
        self.debit(reward_id, &(&award + &burned_penalty))?;
        self.credit(miner_id, &award)?;
        self.credit(actors::BURNT_FUNDS_ACTOR_ADDR.id()?, &burned_penalty)?;

        st.epoch = epoch;
        st.total_mined = &st.total_mined + &block_reward;
        self.set_state(reward_id, &st)?;
        Ok(())
    }
}

/// Shared handle serving as both the state access and the applier of one
/// reference VM.
#[derive(Clone)]
pub struct VmHandle(pub Rc<RefCell<ReferenceVm>>);

impl VmWrapper for VmHandle {
    fn root(&self) -> Cid {
        self.0.borrow().root
    }

    fn store_get(&self, cid: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        self.0.borrow().store.get(cid)
    }

    fn store_put(&mut self, data: &[u8]) -> anyhow::Result<Cid> {
        self.0.borrow().put_bytes(data)
    }

    fn actor(&self, addr: &Address) -> anyhow::Result<Option<Actor>> {
        let vm = self.0.borrow();
        Ok(vm.lookup_id(addr).map(|id| vm.actors[&id].clone()))
    }

    fn create_actor(
        &mut self,
        code: Cid,
        addr: Address,
        balance: TokenAmount,
        state: &[u8],
    ) -> anyhow::Result<(Actor, Address)> {
        let mut vm = self.0.borrow_mut();
        let actor = Actor {
            code,
            head: vm.put_bytes(state)?,
            call_seq_num: 0,
            balance,
        };
        let id = vm.insert_actor(addr, actor.clone())?;
        vm.flush()?;
        Ok((actor, id))
    }

    fn set_actor_state(
        &mut self,
        addr: &Address,
        balance: TokenAmount,
        state: &[u8],
    ) -> anyhow::Result<Actor> {
        let mut vm = self.0.borrow_mut();
        let id = vm
            .lookup_id(addr)
            .with_context(|| format!("actor {addr} not found"))?;
        let head = vm.put_bytes(state)?;
        let actor = vm.actor_mut(id)?;
        actor.head = head;
        actor.balance = balance;
        let actor = actor.clone();
        vm.flush()?;
        Ok(actor)
    }
}

impl Applier for VmHandle {
    fn apply_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &Message,
    ) -> anyhow::Result<ApplyMessageResult> {
        let mut vm = self.0.borrow_mut();
        let size = fvm_ipld_encoding::to_vec(msg)?.len();
        let applied = vm.apply(epoch, msg, size)?;
        Ok(ApplyMessageResult {
            msg: msg.clone(),
            receipt: applied.receipt,
            penalty: applied.penalty,
            reward: applied.tip,
            root: vm.flush()?,
        })
    }

    fn apply_signed_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &SignedMessage,
    ) -> anyhow::Result<ApplyMessageResult> {
        let mut vm = self.0.borrow_mut();
        let size = fvm_ipld_encoding::to_vec(msg)?.len();
        let applied = vm.apply(epoch, msg.message(), size)?;
        Ok(ApplyMessageResult {
            msg: msg.message().clone(),
            receipt: applied.receipt,
            penalty: applied.penalty,
            reward: applied.tip,
            root: vm.flush()?,
        })
    }

    fn apply_tipset_messages(
        &mut self,
        epoch: ChainEpoch,
        blocks: &[BlockMessagesInfo],
    ) -> anyhow::Result<ApplyTipSetResult> {
        let first = blocks.first().context("tipset has no blocks")?;
        let mut vm = self.0.borrow_mut();
        let mut seen = HashSet::new();
        let mut receipts = Vec::new();
        let mut penalty = TokenAmount::default();
        let mut tips = TokenAmount::default();

        for block in blocks {
            // On-chain size: BLS messages travel unsigned.
            let bls = block
                .bls_messages
                .iter()
                .map(|m| (m, fvm_ipld_encoding::to_vec(m).map(|b| b.len())));
            let secp = block
                .secp_messages
                .iter()
                .map(|m| (m.message(), fvm_ipld_encoding::to_vec(m).map(|b| b.len())));
            for (msg, size) in bls.chain(secp) {
                let size = size?;
                if !seen.insert(msg.cid()) {
                    continue;
                }
                let applied = vm.apply(epoch, msg, size)?;
                penalty = &penalty + &applied.penalty;
                tips = &tips + &applied.tip;
                receipts.push(applied.receipt);
            }
        }

        vm.settle(epoch, &first.miner, &penalty, &tips)?;
        Ok(ApplyTipSetResult {
            receipts,
            root: vm.flush()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::address::Protocol;

    fn vm_with_account(balance: u64) -> (VmHandle, Address) {
        let mut vm = VmHandle(Rc::new(RefCell::new(ReferenceVm::new(Faults::default()))));
        for actor in crate::drivers::genesis::default_builtin_actors("test") {
            vm.create_actor(actor.code, actor.addr, actor.balance, actor.state.bytes())
                .unwrap();
        }
        let key = crate::suites::utils::new_bls_addr(42);
        let state = must_serialize(&account::State { address: key });
        let (_, id) = vm
            .create_actor(
                *actors::ACCOUNT_ACTOR_CODE_ID,
                key,
                TokenAmount::from_atto(balance),
                state.bytes(),
            )
            .unwrap();
        assert_eq!(id, Address::new_id(actors::FIRST_NON_SINGLETON_ADDR));
        (vm, key)
    }

    fn transfer(from: Address, to: Address, seq: u64) -> Message {
        Message {
            sequence: seq,
            gas_limit: 1_000_000,
            gas_fee_cap: TokenAmount::from_atto(200),
            gas_premium: TokenAmount::from_atto(1),
            ..Message::transfer(from, to, TokenAmount::from_atto(10))
        }
    }

    #[test]
    fn transfer_charges_gas_and_moves_value() {
        let (mut vm, alice) = vm_with_account(1_000_000_000);
        let to = actors::BURNT_FUNDS_ACTOR_ADDR;
        let root_before = vm.root();
        let res = vm.apply_message(0, &transfer(alice, to, 0)).unwrap();
        assert_eq!(res.receipt.exit_code, ExitCode::OK);
        assert!(res.receipt.gas_used > GAS_ON_CHAIN_MESSAGE_BASE);
        assert_ne!(res.root, root_before);
        let sender = vm.actor(&alice).unwrap().unwrap();
        assert_eq!(sender.call_seq_num, 1);
        assert!(sender.balance < TokenAmount::from_atto(1_000_000_000 - 10));
    }

    #[test]
    fn rejections_leave_the_sender_alone() {
        let (mut vm, alice) = vm_with_account(1_000_000_000);
        let res = vm
            .apply_message(0, &transfer(alice, actors::BURNT_FUNDS_ACTOR_ADDR, 3))
            .unwrap();
        assert_eq!(res.receipt.exit_code, ExitCode::SYS_SENDER_STATE_INVALID);
        assert_eq!(res.penalty, TokenAmount::from_atto(100_000_000));
        let sender = vm.actor(&alice).unwrap().unwrap();
        assert_eq!(sender.call_seq_num, 0);
        assert_eq!(sender.balance, TokenAmount::from_atto(1_000_000_000));
    }

    #[test]
    fn sends_to_unknown_id_addresses_fail() {
        let (mut vm, alice) = vm_with_account(1_000_000_000);
        let res = vm
            .apply_message(0, &transfer(alice, Address::new_id(4242), 0))
            .unwrap();
        assert_eq!(res.receipt.exit_code, ExitCode::SYS_INVALID_RECEIVER);
        assert!(vm.actor(&Address::new_id(4242)).unwrap().is_none());
    }

    #[test]
    fn duplicate_actors_are_rejected() {
        let (mut vm, alice) = vm_with_account(1);
        let state = must_serialize(&account::State { address: alice });
        assert!(
            vm.create_actor(
                *actors::ACCOUNT_ACTOR_CODE_ID,
                alice,
                TokenAmount::default(),
                state.bytes()
            )
            .is_err()
        );
    }

    #[test]
    fn key_protocols_resolve() {
        let (vm, alice) = vm_with_account(1);
        assert_eq!(alice.protocol(), Protocol::BLS);
        let by_id = vm
            .actor(&Address::new_id(actors::FIRST_NON_SINGLETON_ADDR))
            .unwrap();
        assert_eq!(by_id, vm.actor(&alice).unwrap());
    }
}

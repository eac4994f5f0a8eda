// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::{HashMap, HashMapExt};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Error;
use super::economics::{BalanceSnapshot, RewardSummary};
use crate::actors::{self, account, miner, multisig, reward};
use crate::chain::must_serialize;
use crate::shim::{
    address::{Address, is_key_address},
    econ::TokenAmount,
};
use crate::state::{Actor, KeyManager, VmWrapper};

/// Signature scheme of a new account actor's key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    Secp256k1,
    Bls,
}

/// Owner, worker and ID of the miner every driver is built with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinerInfo {
    pub owner: Address,
    pub owner_id: Address,
    pub worker: Address,
    pub worker_id: Address,
    pub miner_id: Address,
}

/// Read-only [`Blockstore`] over the implementation's store, for walking
/// collections inside actor state.
struct StoreView<'a>(&'a dyn VmWrapper);

impl Blockstore for StoreView<'_> {
    fn get(&self, k: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        self.0.store_get(k)
    }

    fn put_keyed(&self, k: &Cid, _block: &[u8]) -> anyhow::Result<()> {
        anyhow::bail!("refusing to write {k} through a read-only state view")
    }
}

/// Owns the implementation's state tree handle and key manager.
pub struct StateDriver {
    st: Box<dyn VmWrapper>,
    wallet: Box<dyn KeyManager>,
    /// Key address to ID address of every account created through the driver.
    aliases: HashMap<Address, Address>,
}

impl StateDriver {
    pub fn new(st: Box<dyn VmWrapper>, wallet: Box<dyn KeyManager>) -> Self {
        Self {
            st,
            wallet,
            aliases: HashMap::new(),
        }
    }

    pub fn state(&self) -> &dyn VmWrapper {
        self.st.as_ref()
    }

    pub fn state_mut(&mut self) -> &mut dyn VmWrapper {
        self.st.as_mut()
    }

    pub fn wallet(&self) -> &dyn KeyManager {
        self.wallet.as_ref()
    }

    /// Collapses key addresses of accounts created through this driver to
    /// their ID address.
    pub fn resolve(&self, addr: &Address) -> Address {
        self.aliases.get(addr).copied().unwrap_or(*addr)
    }

    /// The key address behind an ID address created through this driver, or
    /// `addr` itself.
    pub fn key_address(&self, addr: &Address) -> Address {
        self.aliases
            .iter()
            .find(|(key, id)| *id == addr && is_key_address(key))
            .map(|(key, _)| *key)
            .unwrap_or(*addr)
    }

    pub fn actor(&self, addr: &Address) -> Result<Option<Actor>, Error> {
        Ok(self.st.actor(addr)?)
    }

    pub fn must_actor(&self, addr: &Address) -> Result<Actor, Error> {
        self.actor(addr)?.ok_or(Error::NoActor(*addr))
    }

    /// Creates an account actor for a fresh key and returns its key and ID
    /// addresses.
    pub fn new_account_actor(
        &mut self,
        key_type: KeyType,
        balance: TokenAmount,
    ) -> Result<(Address, Address), Error> {
        let key = match key_type {
            KeyType::Secp256k1 => self.wallet.new_secp256k1_account_address(),
            KeyType::Bls => self.wallet.new_bls_account_address(),
        };
        let state = must_serialize(&account::State { address: key });
        let (_, id) = self
            .st
            .create_actor(*actors::ACCOUNT_ACTOR_CODE_ID, key, balance, &state)?;
        debug!(%key, %id, "created account actor");
        self.aliases.insert(key, id);
        Ok((key, id))
    }

    /// Creates the owner and worker accounts and a miner actor controlled by
    /// them.
    pub fn new_miner(&mut self, account_balance: TokenAmount) -> Result<MinerInfo, Error> {
        let (owner, owner_id) = self.new_account_actor(KeyType::Secp256k1, account_balance.clone())?;
        let (worker, worker_id) = self.new_account_actor(KeyType::Bls, account_balance)?;

        let info = miner::MinerInfo {
            owner: owner_id,
            worker: worker_id,
            control_addresses: Vec::new(),
            peer_id: b"chain-validation".to_vec(),
            seal_proof_type: miner::TEST_SEAL_PROOF_TYPE,
            sector_size: miner::TEST_SECTOR_SIZE,
        };
        let info = self.st.store_put(&must_serialize(&info))?;
        let state = miner::State {
            info,
            pre_commit_deposits: TokenAmount::default(),
            locked_funds: TokenAmount::default(),
            pre_committed_sectors: *actors::EMPTY_MAP_CID,
            sectors: *actors::EMPTY_ARRAY_CID,
            proving_period_start: 0,
        };
        let robust = actors::init::robust_address(&owner, 0, 0)?;
        let (_, miner_id) = self.st.create_actor(
            *actors::MINER_ACTOR_CODE_ID,
            robust,
            TokenAmount::default(),
            &must_serialize(&state),
        )?;
        self.aliases.insert(robust, miner_id);
        debug!(%miner_id, %owner_id, %worker_id, "created miner actor");

        Ok(MinerInfo {
            owner,
            owner_id,
            worker,
            worker_id,
            miner_id,
        })
    }

    /// Decodes the state of the actor at `addr`.
    pub fn get_actor_state<T: DeserializeOwned>(&self, addr: &Address) -> Result<T, Error> {
        let head = self.must_actor(addr)?.head;
        self.get_object(&head)
    }

    /// Decodes a DAG-CBOR object from the implementation's store.
    pub fn get_object<T: DeserializeOwned>(&self, cid: &Cid) -> Result<T, Error> {
        let bytes = self
            .st
            .store_get(cid)?
            .ok_or_else(|| anyhow::anyhow!("object {cid} not found in store"))?;
        Ok(fvm_ipld_encoding::from_slice(&bytes).map_err(anyhow::Error::from)?)
    }

    /// The pending transaction `txn_id` of the multisig at `addr`.
    pub fn multisig_transaction(
        &self,
        addr: &Address,
        txn_id: multisig::TxnId,
    ) -> Result<Option<multisig::Transaction>, Error> {
        let st: multisig::State = self.get_actor_state(addr)?;
        let txns = multisig::load_pending_txns(&st.pending_txs, StoreView(self.st.as_ref()))
            .map_err(anyhow::Error::from)?;
        let txn = txns
            .get(&multisig::txn_key(txn_id))
            .map_err(anyhow::Error::from)?;
        Ok(txn.cloned())
    }

    pub fn reward_summary(&self) -> Result<RewardSummary, Error> {
        let st: reward::State = self.get_actor_state(&actors::REWARD_ACTOR_ADDR)?;
        let treasury = self.must_actor(&actors::REWARD_ACTOR_ADDR)?.balance;
        Ok(RewardSummary::new(treasury, st.this_epoch_reward))
    }

    /// Balances of `addrs`, `None` for actors that do not exist.
    pub fn snapshot<'a>(
        &self,
        addrs: impl IntoIterator<Item = &'a Address>,
    ) -> Result<BalanceSnapshot, Error> {
        let mut snapshot = BalanceSnapshot::default();
        for addr in addrs {
            let balance = self.actor(addr)?.map(|a| a.balance);
            snapshot.balances.insert(*addr, balance);
        }
        Ok(snapshot)
    }
}

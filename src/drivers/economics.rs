// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Expected gas charges, block rewards, penalties and burns of a tipset, and
//! their comparison with the balances the implementation actually produced.

use std::fmt;

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use itertools::Itertools as _;

use crate::actors::{BURNT_FUNDS_ACTOR_ADDR, EXPECTED_LEADERS_PER_EPOCH, REWARD_ACTOR_ADDR};
use crate::chain::MessageReceipt;
use crate::shim::{
    address::Address,
    econ::{TokenAmount, gas_cost},
    message::{METHOD_SEND, Message},
};

/// Economic parameters the expectations are computed with.
#[derive(Clone, Debug, PartialEq, Eq, smart_default::SmartDefault)]
pub struct GasPolicy {
    #[default(TokenAmount::from_atto(100))]
    pub base_fee: TokenAmount,
    #[default(11)]
    pub gas_overuse_num: u64,
    #[default(10)]
    pub gas_overuse_denom: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GasOutputs {
    pub base_fee_burn: TokenAmount,
    pub over_estimation_burn: TokenAmount,
    pub miner_penalty: TokenAmount,
    pub miner_tip: TokenAmount,
    pub refund: TokenAmount,

    pub gas_refund: u64,
    pub gas_burned: u64,
}

impl GasOutputs {
    /// What the sender is charged for gas.
    pub fn sender_cost(&self) -> TokenAmount {
        &(&self.base_fee_burn + &self.over_estimation_burn) + &self.miner_tip
    }

    /// What goes to the burnt funds actor.
    pub fn burn(&self) -> TokenAmount {
        &self.base_fee_burn + &self.over_estimation_burn
    }
}

impl GasPolicy {
    /// Penalty levied on the block miner for including a message that could
    /// not be processed.
    pub fn miner_penalty(&self, gas_limit: u64) -> TokenAmount {
        gas_cost(&self.base_fee, gas_limit)
    }

    /// Splits the unused gas of a message into `(refunded, burned)` gas.
    pub fn overestimation_burn(&self, gas_used: u64, gas_limit: u64) -> (u64, u64) {
        if gas_used == 0 {
            return (0, gas_limit);
        }
        let used = u128::from(gas_used);
        let limit = u128::from(gas_limit);
        let allowed = u128::from(self.gas_overuse_num) * used / u128::from(self.gas_overuse_denom);
        if limit <= allowed {
            return (gas_limit.saturating_sub(gas_used), 0);
        }
        let over = (limit - allowed).min(used);
        let unused = limit.saturating_sub(used);
        let burned = unused * over / used;
        // `burned <= unused <= gas_limit`, so both fit.
        ((unused - burned) as u64, burned as u64)
    }

    pub fn gas_outputs(
        &self,
        gas_used: u64,
        gas_limit: u64,
        fee_cap: &TokenAmount,
        gas_premium: &TokenAmount,
    ) -> GasOutputs {
        let mut out = GasOutputs::default();
        let base_fee_to_pay = if &self.base_fee > fee_cap {
            out.miner_penalty = gas_cost(&(&self.base_fee - fee_cap), gas_used);
            fee_cap
        } else {
            &self.base_fee
        };
        out.base_fee_burn = gas_cost(base_fee_to_pay, gas_used);

        let headroom = fee_cap - base_fee_to_pay;
        let tip = gas_premium.min(&headroom);
        out.miner_tip = gas_cost(tip, gas_limit);

        let (gas_refund, gas_burned) = self.overestimation_burn(gas_used, gas_limit);
        out.gas_refund = gas_refund;
        out.gas_burned = gas_burned;
        if gas_burned != 0 {
            out.over_estimation_burn = gas_cost(base_fee_to_pay, gas_burned);
            let uncovered = &self.base_fee - base_fee_to_pay;
            out.miner_penalty = &out.miner_penalty + &gas_cost(&uncovered, gas_burned);
        }

        let required = gas_cost(fee_cap, gas_limit);
        out.refund = &required - &out.sender_cost();
        out
    }

    /// Burn for a message that pays the full base fee.
    pub fn burn(&self, gas_limit: u64, gas_used: u64) -> TokenAmount {
        let (_, burned) = self.overestimation_burn(gas_used, gas_limit);
        gas_cost(&self.base_fee, gas_used.saturating_add(burned))
    }

    /// Total a sender pays for a processed message whose fee cap covers the
    /// base fee and premium, including the transferred value.
    pub fn message_cost(
        &self,
        gas_limit: u64,
        gas_premium: &TokenAmount,
        transferred: &TokenAmount,
        receipt: &MessageReceipt,
    ) -> TokenAmount {
        let tip = gas_cost(gas_premium, gas_limit);
        &(&tip + &self.burn(gas_limit, receipt.gas_used)) + transferred
    }
}

/// Reward actor summary: treasury and the rewards the next tipset pays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardSummary {
    pub treasury: TokenAmount,
    pub next_per_epoch_reward: TokenAmount,
    pub next_per_block_reward: TokenAmount,
}

impl RewardSummary {
    pub fn new(treasury: TokenAmount, this_epoch_reward: TokenAmount) -> Self {
        let next_per_block_reward =
            TokenAmount::from_atto(this_epoch_reward.atto() / EXPECTED_LEADERS_PER_EPOCH);
        Self {
            treasury,
            next_per_epoch_reward: this_epoch_reward,
            next_per_block_reward,
        }
    }
}

/// A mismatch between the expected and the observed outcome of a tipset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrepancy {
    pub subject: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, actual {}",
            self.subject, self.expected, self.actual
        )
    }
}

/// Balances of the actors a tipset touches, keyed by canonical address.
/// `None` records that the actor did not exist.
#[derive(Clone, Debug, Default)]
pub struct BalanceSnapshot {
    pub balances: HashMap<Address, Option<TokenAmount>>,
}

impl BalanceSnapshot {
    pub fn get(&self, addr: &Address) -> Option<&TokenAmount> {
        self.balances.get(addr).and_then(Option::as_ref)
    }
}

/// Expected effects of one tipset. Built from the messages, their receipts
/// and the reward summary taken before the tipset was applied.
#[derive(Clone, Debug)]
pub struct TipsetExpectation {
    pub miner: Address,
    pub block_reward: TokenAmount,
    pub gas_reward: TokenAmount,
    /// Penalties levied, before capping.
    pub penalty: TokenAmount,
    /// Penalties actually burned: capped at block reward plus gas reward.
    pub burned_penalty: TokenAmount,
    pub miner_award: TokenAmount,
    pub gas_burn: TokenAmount,
    deltas: HashMap<Address, TokenAmount>,
    untracked: HashSet<Address>,
    rejected_senders: HashSet<Address>,
}

impl TipsetExpectation {
    /// `resolve` maps any address to the key its balance is tracked under, so
    /// that the key and ID address of one actor share a ledger entry.
    pub fn compute<'a>(
        policy: &GasPolicy,
        rewards: &RewardSummary,
        miner: Address,
        applied: impl IntoIterator<Item = (&'a Message, &'a MessageReceipt)>,
        resolve: impl Fn(&Address) -> Address,
    ) -> Self {
        let miner = resolve(&miner);
        let zero = TokenAmount::default();
        let mut deltas: HashMap<Address, TokenAmount> = HashMap::new();
        let mut credit = |addr: Address, amount: &TokenAmount| {
            let entry = deltas.entry(addr).or_default();
            *entry = &*entry + amount;
        };
        // Settlement moves funds of these actors; their balances are always checked.
        let settled = [
            miner,
            resolve(&BURNT_FUNDS_ACTOR_ADDR),
            resolve(&REWARD_ACTOR_ADDR),
        ];
        let mut untracked = HashSet::new();
        let mut rejected_senders = HashSet::new();
        let mut penalty = zero.clone();
        let mut gas_reward = zero.clone();
        let mut gas_burn = zero.clone();

        for (msg, receipt) in applied {
            let from = resolve(&msg.from);
            if receipt.exit_code.is_sender_rejection() {
                penalty = &penalty + &policy.miner_penalty(msg.gas_limit);
                rejected_senders.insert(from);
                continue;
            }

            let out = policy.gas_outputs(
                receipt.gas_used,
                msg.gas_limit,
                &msg.gas_fee_cap,
                &msg.gas_premium,
            );
            credit(from, &(&zero - &out.sender_cost()));
            gas_reward = &gas_reward + &out.miner_tip;
            gas_burn = &gas_burn + &out.burn();
            penalty = &penalty + &out.miner_penalty;

            if receipt.exit_code.is_success() {
                let to = resolve(&msg.to);
                credit(from, &(&zero - &msg.value));
                credit(to, &msg.value);
                // The receiver's own logic may move the value on.
                if msg.method_num != METHOD_SEND && !settled.contains(&to) {
                    untracked.insert(to);
                }
            }
        }

        let block_reward = rewards.next_per_block_reward.clone();
        let available = &block_reward + &gas_reward;
        let burned_penalty = penalty.clone().min(available.clone());
        let miner_award = &available - &burned_penalty;

        credit(miner, &miner_award);
        credit(resolve(&BURNT_FUNDS_ACTOR_ADDR), &(&gas_burn + &burned_penalty));
        credit(resolve(&REWARD_ACTOR_ADDR), &(&zero - &block_reward));

        Self {
            miner,
            block_reward,
            gas_reward,
            penalty,
            burned_penalty,
            miner_award,
            gas_burn,
            deltas,
            untracked,
            rejected_senders,
        }
    }

    /// Expected balance change of the actor tracked under `addr`.
    pub fn delta(&self, addr: &Address) -> TokenAmount {
        self.deltas.get(addr).cloned().unwrap_or_default()
    }

    /// Addresses whose balance the settlement check needs before and after
    /// the tipset.
    pub fn tracked_addresses(&self) -> impl Iterator<Item = &Address> {
        self.deltas
            .keys()
            .chain(self.rejected_senders.iter())
            .unique()
            .filter(|addr| !self.untracked.contains(*addr))
    }

    /// Compares the balances around the tipset with the expectation and
    /// returns every mismatch, in address order.
    pub fn verify(&self, before: &BalanceSnapshot, after: &BalanceSnapshot) -> Vec<Discrepancy> {
        let mut found = Vec::new();
        let miner = self.miner;
        let subject = |addr: &Address| {
            if *addr == REWARD_ACTOR_ADDR {
                "treasury".to_owned()
            } else if *addr == BURNT_FUNDS_ACTOR_ADDR {
                "burnt funds".to_owned()
            } else if *addr == miner {
                format!("miner {addr}")
            } else {
                format!("actor {addr}")
            }
        };

        for addr in self
            .tracked_addresses()
            .sorted_by_key(|addr| addr.to_string())
        {
            let existed = before.balances.get(addr).is_some_and(Option::is_some);
            let exists = after.balances.get(addr).is_some_and(Option::is_some);
            if self.rejected_senders.contains(addr) && !existed {
                if exists {
                    found.push(Discrepancy {
                        subject: subject(addr),
                        expected: "no actor".to_owned(),
                        actual: "actor created".to_owned(),
                    });
                }
                continue;
            }

            let start = before.get(addr).cloned().unwrap_or_default();
            let expected = &start + &self.delta(addr);
            let actual = after.get(addr).cloned().unwrap_or_default();
            if expected != actual {
                found.push(Discrepancy {
                    subject: subject(addr),
                    expected: format!("balance {}", expected.atto()),
                    actual: format!("balance {}", actual.atto()),
                });
            }
        }
        found
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Semantically valid and invalid messages in tipsets, including miner
//! penalties.

use crate::actors::{self, miner::GetControlAddressesReturn};
use crate::chain::{MsgOpt, must_serialize};
use crate::drivers::{
    BlockBuilder, KeyType, TestDriver, TestDriverBuilder, TipSetMessageBuilder,
    economics::RewardSummary, test_driver::OrFatal,
};
use crate::shim::{
    econ::{TokenAmount, gas_cost},
    error::ExitCode,
};
use crate::state::Factories;

use super::runner::Suite;
use super::utils;

const GAS_LIMIT: u64 = 1_000_000_000;
const GAS_PREMIUM: u64 = 1;

fn account_default_balance() -> TokenAmount {
    TokenAmount::from_atto(10_000_000_000_000u64)
}

fn send_value() -> TokenAmount {
    TokenAmount::from_atto(1)
}

fn builder(factory: &dyn Factories) -> TestDriverBuilder<'_> {
    TestDriverBuilder::new(factory)
        .with_default_gas_limit(GAS_LIMIT)
        .with_default_gas_fee_cap(TokenAmount::from_atto(200))
        .with_default_gas_premium(TokenAmount::from_atto(GAS_PREMIUM))
}

/// Checks the miner got the block reward less penalties plus gas rewards, and
/// the treasury paid exactly one block reward.
fn validate_rewards(
    td: &TestDriver,
    prev_rewards: &RewardSummary,
    prev_miner_balance: &TokenAmount,
    gas_reward: &TokenAmount,
    gas_penalty: &TokenAmount,
) {
    let new_rewards = td.get_reward_summary();
    let reward = &(&prev_rewards.next_per_block_reward - gas_penalty) + gas_reward;
    td.assert_balance(&td.exe_ctx.miner, &(prev_miner_balance + &reward));
    assert_eq!(
        &prev_rewards.treasury - &prev_rewards.next_per_block_reward,
        new_rewards.treasury,
        "treasury must pay exactly one block reward"
    );
}

/// Applies one block of messages by the driver's miner.
fn apply_block(td: &mut TestDriver, block: BlockBuilder) -> crate::chain::ApplyTipSetResult {
    TipSetMessageBuilder::new()
        .with_block_builder(block)
        .apply_and_validate(td)
        .or_fatal()
}

pub fn miner_rewards_and_penalties(factory: &dyn Factories) {
    let builder = builder(factory);
    let mut suite = Suite::new("tipset/miner_rewards_and_penalties");

    suite.case("ok simple send", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;

        let (alice_pk, alice_id) =
            td.new_account_actor(KeyType::Secp256k1, account_default_balance());
        let (bob_pk, bob_id) = td.new_account_actor(KeyType::Secp256k1, account_default_balance());

        // Every combination of ID and key address for both parties.
        let mut call_seq = 0;
        for alice in [alice_pk, alice_id] {
            for bob in [bob_pk, bob_id] {
                let a_bal = td.get_balance(&alice_id);
                let b_bal = td.get_balance(&bob_id);
                let burn_bal = td.get_balance(&actors::BURNT_FUNDS_ACTOR_ADDR);
                let prev_rewards = td.get_reward_summary();
                let prev_miner_bal = td.get_balance(&miner);

                // A simple send back and forth between the accounts.
                let msg1 = td.producer.transfer(
                    alice,
                    bob,
                    [MsgOpt::Value(send_value()), MsgOpt::Nonce(call_seq)],
                );
                let msg2 = td.producer.transfer(
                    bob,
                    alice,
                    [MsgOpt::Value(send_value()), MsgOpt::Nonce(call_seq)],
                );
                let result = apply_block(
                    &mut td,
                    BlockBuilder::new(miner)
                        .with_bls_message_ok(msg1.clone())
                        .with_bls_message_ok(msg2.clone()),
                );
                td.exe_ctx.epoch += 1;

                // Each account paid its own gas, the values cancel out.
                let zero = TokenAmount::default();
                td.assert_balance(
                    &alice_id,
                    &(&a_bal
                        - &td.calc_message_cost(
                            msg1.gas_limit,
                            &msg1.gas_premium,
                            &zero,
                            &result.receipts[0],
                        )),
                );
                td.assert_balance(
                    &bob_id,
                    &(&b_bal
                        - &td.calc_message_cost(
                            msg2.gas_limit,
                            &msg2.gas_premium,
                            &zero,
                            &result.receipts[1],
                        )),
                );

                // With a premium of one the gas reward is the summed gas limit.
                let gas_sum = TokenAmount::from_atto(msg1.gas_limit + msg2.gas_limit);
                validate_rewards(&td, &prev_rewards, &prev_miner_bal, &gas_sum, &zero);

                let policy = td.gas_policy();
                let new_burn = &policy.burn(msg1.gas_limit, result.receipts[0].gas_used)
                    + &policy.burn(msg2.gas_limit, result.receipts[1].gas_used);
                td.assert_balance(&actors::BURNT_FUNDS_ACTOR_ADDR, &(&burn_bal + &new_burn));

                call_seq += 1;
            }
        }
        td.complete();
    });

    suite.case("penalize sender doesn't exist", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;
        let (_, receiver) = td.new_account_actor(KeyType::Secp256k1, account_default_balance());
        let bad_senders = [
            utils::new_id_addr(1234),
            utils::new_secp256k1_addr("1234"),
            utils::new_bls_addr(1234),
            utils::new_actor_addr("1234"),
        ];

        let mut block = BlockBuilder::new(miner);
        for sender in bad_senders {
            let msg = td
                .producer
                .transfer(sender, receiver, [MsgOpt::Value(send_value())]);
            block = block.with_bls_message_and_code(msg, ExitCode::SYS_SENDER_INVALID);
        }

        let prev_rewards = td.get_reward_summary();
        let prev_miner_balance = td.get_balance(&miner);
        apply_block(&mut td, block);

        // Nothing received, no actors created.
        td.assert_balance(&receiver, &account_default_balance());
        for sender in &bad_senders {
            td.assert_no_actor(sender);
        }

        let gas_penalty = gas_cost(
            &td.gas_policy().miner_penalty(GAS_LIMIT),
            bad_senders.len() as u64,
        );
        validate_rewards(
            &td,
            &prev_rewards,
            &prev_miner_balance,
            &TokenAmount::default(),
            &gas_penalty,
        );
        td.assert_balance(&actors::BURNT_FUNDS_ACTOR_ADDR, &gas_penalty);
        td.complete();
    });

    suite.case("penalize sender non account", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;
        let (_, receiver) = td.new_account_actor(KeyType::Secp256k1, account_default_balance());
        // Actors that can't be top-level senders.
        let senders = [
            actors::SYSTEM_ACTOR_ADDR,
            actors::INIT_ACTOR_ADDR,
            actors::CRON_ACTOR_ADDR,
            miner,
        ];

        let mut block = BlockBuilder::new(miner);
        for sender in senders {
            let msg = td
                .producer
                .transfer(sender, receiver, [MsgOpt::Value(send_value())]);
            block = block.with_bls_message_and_code(msg, ExitCode::SYS_SENDER_INVALID);
        }

        let prev_rewards = td.get_reward_summary();
        let prev_miner_balance = td.get_balance(&miner);
        apply_block(&mut td, block);
        td.assert_balance(&receiver, &account_default_balance());

        let gas_penalty = gas_cost(
            &td.gas_policy().miner_penalty(GAS_LIMIT),
            senders.len() as u64,
        );
        validate_rewards(
            &td,
            &prev_rewards,
            &prev_miner_balance,
            &TokenAmount::default(),
            &gas_penalty,
        );
        td.assert_balance(&actors::BURNT_FUNDS_ACTOR_ADDR, &gas_penalty);
        td.complete();
    });

    suite.case("penalize wrong callseqnum", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;
        let (_, alice_id) = td.new_account_actor(KeyType::Bls, account_default_balance());

        let msg = td.producer.transfer(
            alice_id,
            actors::BURNT_FUNDS_ACTOR_ADDR,
            [MsgOpt::Nonce(1)],
        );
        let prev_rewards = td.get_reward_summary();
        let prev_miner_balance = td.get_balance(&miner);
        apply_block(
            &mut td,
            BlockBuilder::new(miner)
                .with_bls_message_and_code(msg, ExitCode::SYS_SENDER_STATE_INVALID),
        );

        let gas_penalty = td.gas_policy().miner_penalty(GAS_LIMIT);
        validate_rewards(
            &td,
            &prev_rewards,
            &prev_miner_balance,
            &TokenAmount::default(),
            &gas_penalty,
        );
        td.assert_balance(&actors::BURNT_FUNDS_ACTOR_ADDR, &gas_penalty);
        td.complete();
    });

    suite.case("penalty if the balance is not sufficient to cover gas", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;
        let balance = TokenAmount::from_atto(1);
        let (_, alice_id) = td.new_account_actor(KeyType::Bls, balance.clone());

        let msg = td.producer.transfer(
            alice_id,
            actors::BURNT_FUNDS_ACTOR_ADDR,
            [
                MsgOpt::Value(TokenAmount::default()),
                MsgOpt::Nonce(0),
                MsgOpt::GasLimit(GAS_LIMIT),
            ],
        );
        let prev_rewards = td.get_reward_summary();
        let prev_miner_balance = td.get_balance(&miner);
        apply_block(
            &mut td,
            BlockBuilder::new(miner)
                .with_bls_message_and_code(msg, ExitCode::SYS_SENDER_STATE_INVALID),
        );

        // The penalty is not part of the receipt.
        let gas_penalty = td.gas_policy().miner_penalty(GAS_LIMIT);
        validate_rewards(
            &td,
            &prev_rewards,
            &prev_miner_balance,
            &TokenAmount::default(),
            &gas_penalty,
        );
        td.assert_balance(&alice_id, &balance);
        td.complete();
    });

    suite.case(
        "no penalty if the balance is not sufficient to cover transfer",
        |name| {
            let mut td = builder.build(name).or_fatal();
            let miner = td.exe_ctx.miner;
            let half_balance = TokenAmount::from_atto(5_000_000_000_000u64);
            let (_, alice_id) =
                td.new_account_actor(KeyType::Bls, &half_balance + &half_balance);

            // The whole balance in two parts; the second cannot pay its value
            // once the first has paid for gas.
            let msg_ok = td.producer.transfer(
                alice_id,
                actors::BURNT_FUNDS_ACTOR_ADDR,
                [MsgOpt::Value(half_balance.clone())],
            );
            let msg_fail = td.producer.transfer(
                alice_id,
                actors::BURNT_FUNDS_ACTOR_ADDR,
                [MsgOpt::Value(half_balance.clone()), MsgOpt::Nonce(1)],
            );

            let prev_rewards = td.get_reward_summary();
            let prev_miner_balance = td.get_balance(&miner);
            let result = apply_block(
                &mut td,
                BlockBuilder::new(miner)
                    .with_bls_message_ok(msg_ok.clone())
                    .with_bls_message_and_code(msg_fail.clone(), ExitCode::SYS_INSUFFICIENT_FUNDS),
            );

            let gas_reward = TokenAmount::from_atto(msg_ok.gas_limit + msg_fail.gas_limit);
            let gas_penalty = TokenAmount::default();
            validate_rewards(
                &td,
                &prev_rewards,
                &prev_miner_balance,
                &gas_reward,
                &gas_penalty,
            );

            let policy = td.gas_policy();
            let burn = &policy.burn(msg_ok.gas_limit, result.receipts[0].gas_used)
                + &policy.burn(msg_fail.gas_limit, result.receipts[1].gas_used);
            td.assert_balance(
                &actors::BURNT_FUNDS_ACTOR_ADDR,
                &(&burn + &(&half_balance + &gas_penalty)),
            );
            td.complete();
        },
    );

    suite.case("insufficient gas to cover return value", |name| {
        let mut td = builder.build(name).or_fatal();
        let miner = td.exe_ctx.miner;
        let (alice, _) = td.new_account_actor(KeyType::Bls, account_default_balance());
        let info = td.builtin_miner_info().clone();
        let control_addresses = must_serialize(&GetControlAddressesReturn {
            owner: info.owner_id,
            worker: info.worker_id,
            control_addresses: Vec::new(),
        });

        // A successful call tells how much gas it takes; one less runs out at
        // the last charge, the one for the return value.
        let tracer = td
            .producer
            .miner_control_addresses(alice, miner, [MsgOpt::Nonce(0)]);
        let tracer_result = apply_block(
            &mut td,
            BlockBuilder::new(miner).with_bls_message_and_ret(tracer, control_addresses),
        );
        let required_gas_limit = tracer_result.receipts[0].gas_used;

        let rewards_before = td.get_reward_summary();
        let miner_balance_before = td.get_balance(&miner);
        let sender_balance_before = td.get_balance(&alice);
        td.exe_ctx.epoch += 1;

        let gas_limit = required_gas_limit - 1;
        let msg = td.producer.miner_control_addresses(
            alice,
            miner,
            [MsgOpt::Nonce(1), MsgOpt::GasLimit(gas_limit)],
        );
        let result = apply_block(
            &mut td,
            BlockBuilder::new(miner).with_bls_message_and_code(msg, ExitCode::SYS_OUT_OF_GAS),
        );
        let gas_used = result.receipts[0].gas_used;
        let new_rewards = td.get_reward_summary();

        // The full limit is charged, not just the gas consumed up to the
        // return value.
        assert_eq!(gas_limit, gas_used, "out of gas must use the whole limit");

        let cost = td.calc_message_cost(
            gas_limit,
            &TokenAmount::from_atto(GAS_PREMIUM),
            &TokenAmount::default(),
            &result.receipts[0],
        );
        td.assert_balance(&alice, &(&sender_balance_before - &cost));

        // With a premium of one the miner earns the gas limit.
        let this_reward =
            &rewards_before.next_per_block_reward + &TokenAmount::from_atto(gas_limit);
        td.assert_balance(&miner, &(&miner_balance_before + &this_reward));
        assert_eq!(
            &rewards_before.treasury - &rewards_before.next_per_block_reward,
            new_rewards.treasury
        );
        td.complete();
    });

    suite.finish();
}

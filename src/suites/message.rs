// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Single-message scenarios: implicit account creation and actors created
//! through the init actor.

use crate::actors::{self, multisig};
use crate::chain::{MsgOpt, must_serialize};
use crate::drivers::{KeyType, TestDriverBuilder, test_driver::OrFatal};
use crate::shim::{address::Address, econ::TokenAmount, error::ExitCode};
use crate::state::Factories;

use super::runner::Suite;
use super::utils;

fn builder(factory: &dyn Factories) -> TestDriverBuilder<'_> {
    TestDriverBuilder::new(factory)
        .with_default_gas_limit(1_000_000_000)
        .with_default_gas_fee_cap(TokenAmount::from_atto(200))
        .with_default_gas_premium(TokenAmount::from_atto(1))
}

struct AccountCreationCase {
    desc: &'static str,
    existing_actor_type: KeyType,
    existing_actor_balance: TokenAmount,
    new_actor_addr: Address,
    new_actor_init_balance: TokenAmount,
    exit_code: ExitCode,
}

/// Transfers to unknown key addresses create account actors, as long as the
/// sender can pay.
pub fn account_actor_creation(factory: &dyn Factories) {
    let builder = builder(factory);
    let mut suite = Suite::new("message/account_actor_creation");

    let cases = [
        AccountCreationCase {
            desc: "success create SECP256K1 account actor",
            existing_actor_type: KeyType::Secp256k1,
            existing_actor_balance: TokenAmount::from_atto(1_000_000_000_000u64),
            new_actor_addr: utils::new_secp256k1_addr("publickeyfoo"),
            new_actor_init_balance: TokenAmount::from_atto(10_000),
            exit_code: ExitCode::OK,
        },
        AccountCreationCase {
            desc: "success create BLS account actor",
            existing_actor_type: KeyType::Secp256k1,
            existing_actor_balance: TokenAmount::from_atto(1_000_000_000_000u64),
            new_actor_addr: utils::new_bls_addr(1),
            new_actor_init_balance: TokenAmount::from_atto(10_000),
            exit_code: ExitCode::OK,
        },
        AccountCreationCase {
            desc: "fail create SECP256K1 account actor insufficient balance",
            existing_actor_type: KeyType::Secp256k1,
            existing_actor_balance: TokenAmount::from_atto(9_999),
            new_actor_addr: utils::new_secp256k1_addr("publickeybar"),
            new_actor_init_balance: TokenAmount::from_atto(10_000),
            exit_code: ExitCode::SYS_SENDER_STATE_INVALID,
        },
        AccountCreationCase {
            desc: "fail create BLS account actor insufficient balance",
            existing_actor_type: KeyType::Secp256k1,
            existing_actor_balance: TokenAmount::from_atto(9_999),
            new_actor_addr: utils::new_bls_addr(1),
            new_actor_init_balance: TokenAmount::from_atto(10_000),
            exit_code: ExitCode::SYS_SENDER_STATE_INVALID,
        },
    ];

    for tc in cases {
        suite.case(tc.desc, |name| {
            let mut td = builder.build(name).or_fatal();
            let (existing, _) =
                td.new_account_actor(tc.existing_actor_type, tc.existing_actor_balance.clone());
            let msg = td.producer.transfer(
                existing,
                tc.new_actor_addr,
                [
                    MsgOpt::Value(tc.new_actor_init_balance.clone()),
                    MsgOpt::Nonce(0),
                ],
            );
            let result = td.apply_failure(&msg, tc.exit_code);

            // The new actor only exists if the message was applied.
            if tc.exit_code.is_success() {
                td.assert_balance(&tc.new_actor_addr, &tc.new_actor_init_balance);
                td.assert_actor_change(
                    &existing,
                    &tc.existing_actor_balance,
                    result.msg.gas_limit,
                    &result.msg.gas_premium,
                    &tc.new_actor_init_balance,
                    &result.receipt,
                    1,
                );
            } else {
                td.assert_no_actor(&tc.new_actor_addr);
                td.assert_balance(&existing, &tc.existing_actor_balance);
            }
            td.complete();
        });
    }

    suite.finish();
}

/// Actors created through the init actor get consecutive ID addresses.
pub fn init_actor_sequential_id_address_create(factory: &dyn Factories) {
    let builder = builder(factory);
    let mut suite = Suite::new("message/init_actor");

    suite.case("sequential ID address create", |name| {
        let mut td = builder.build(name).or_fatal();
        let initial_balance = TokenAmount::from_atto(1_000_000_000_000u64);
        let to_send = TokenAmount::from_atto(10_000);

        let (sender, _) = td.new_account_actor(KeyType::Secp256k1, initial_balance.clone());
        let (receiver, receiver_id) = td.new_account_actor(KeyType::Secp256k1, initial_balance);

        let receiver_id = utils::id_from_address(&receiver_id);
        let first_paych = utils::new_id_addr(receiver_id + 1);
        let second_paych = utils::new_id_addr(receiver_id + 2);

        let first_ret = td.compute_init_actor_exec_return(&sender, 0, 0, first_paych);
        let second_ret = td.compute_init_actor_exec_return(&sender, 1, 0, second_paych);

        let msg = td.producer.create_payment_channel_actor(
            sender,
            receiver,
            [MsgOpt::Value(to_send.clone()), MsgOpt::Nonce(0)],
        );
        td.apply_expect(&msg, must_serialize(&first_ret));

        let msg = td.producer.create_payment_channel_actor(
            sender,
            receiver,
            [MsgOpt::Value(to_send.clone()), MsgOpt::Nonce(1)],
        );
        td.apply_expect(&msg, must_serialize(&second_ret));

        td.assert_balance(&first_paych, &to_send);
        td.assert_balance(&second_paych, &to_send);
        td.complete();
    });

    suite.finish();
}

/// Multisig wallets created through the init actor start with the requested
/// signers, threshold and vesting schedule.
pub fn multisig_actor_creation(factory: &dyn Factories) {
    let builder = builder(factory);
    let mut suite = Suite::new("message/multisig_actor_creation");

    for (desc, unlock_duration) in [("unlocked", 0), ("vesting", 10)] {
        suite.case(desc, |name| {
            let mut td = builder.build(name).or_fatal();
            let balance = TokenAmount::from_atto(1_000_000_000_000u64);
            let value = TokenAmount::from_atto(10_000);

            let (alice, alice_id) = td.new_account_actor(KeyType::Secp256k1, balance.clone());
            let (_, bob_id) = td.new_account_actor(KeyType::Bls, balance);
            let multisig_addr = utils::new_id_addr(utils::id_from_address(&bob_id) + 1);

            let params = multisig::ConstructorParams {
                signers: vec![alice_id, bob_id],
                num_approvals_threshold: 2,
                unlock_duration,
            };
            let ret = td.compute_init_actor_exec_return(&alice, 0, 0, multisig_addr);
            td.must_create_and_verify_multisig_actor(
                0,
                value,
                &multisig_addr,
                alice,
                &params,
                ExitCode::OK,
                must_serialize(&ret),
            );

            let code = td.state_driver().must_actor(&multisig_addr).or_fatal().code;
            assert_eq!(code, *actors::MULTISIG_ACTOR_CODE_ID);
            td.complete();
        });
    }

    suite.finish();
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Scenario suites any implementation can run by supplying its
//! [`Factories`](crate::state::Factories).
//!
//! ```ignore
//! chain_validation::suites::tipset::miner_rewards_and_penalties(&MyFactories::default());
//! ```

pub mod message;
pub mod runner;
pub mod tipset;
pub mod utils;

use crate::state::Factories;

/// Runs every suite, panicking with the failures of the first failing one.
pub fn run_all(factory: &dyn Factories) {
    message::account_actor_creation(factory);
    message::init_actor_sequential_id_address_create(factory);
    message::multisig_actor_creation(factory);
    tipset::miner_rewards_and_penalties(factory);
}

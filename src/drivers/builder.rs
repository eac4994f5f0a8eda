// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::{HashSet, HashSetExt};
use tracing::{debug, info};

use super::Error;
use super::config::DriverConfig;
use super::genesis::{self, ActorState, REQUIRED_ACTORS};
use super::state_driver::StateDriver;
use super::test_driver::TestDriver;
use crate::chain::{ExecutionContext, MessageProducer, Validator};
use crate::shim::econ::TokenAmount;
use crate::state::Factories;
use crate::tracker::{JsonFixtureStore, StateTracker};

/// Epoch the first message of every test is applied at.
pub const INITIAL_EPOCH: i64 = 1;

/// Configures the genesis and message defaults of a [`TestDriver`]. One
/// builder is typically shared by all cases of a suite, each case calling
/// [`TestDriverBuilder::build`] for a fresh implementation instance.
pub struct TestDriverBuilder<'a> {
    factory: &'a dyn Factories,
    actor_states: Vec<ActorState>,
    default_gas_limit: u64,
    default_gas_fee_cap: TokenAmount,
    default_gas_premium: TokenAmount,
    miner_account_balance: TokenAmount,
    config: DriverConfig,
}

impl<'a> TestDriverBuilder<'a> {
    /// Starts from the builtin singletons and the configuration found in the
    /// environment.
    pub fn new(factory: &'a dyn Factories) -> Self {
        let config = DriverConfig::default().with_env_overrides();
        Self {
            factory,
            actor_states: genesis::default_builtin_actors(&config.network_name),
            default_gas_limit: 1_000_000_000,
            default_gas_fee_cap: TokenAmount::from_atto(200),
            default_gas_premium: TokenAmount::from_atto(1),
            miner_account_balance: TokenAmount::default(),
            config,
        }
    }

    /// Adds a genesis actor.
    pub fn with_actor_state(mut self, actor: ActorState) -> Self {
        self.actor_states.push(actor);
        self
    }

    /// Replaces the whole genesis actor list.
    pub fn with_actor_states(mut self, actors: impl IntoIterator<Item = ActorState>) -> Self {
        self.actor_states = actors.into_iter().collect();
        self
    }

    pub fn with_default_gas_limit(mut self, limit: u64) -> Self {
        self.default_gas_limit = limit;
        self
    }

    pub fn with_default_gas_fee_cap(mut self, fee_cap: TokenAmount) -> Self {
        self.default_gas_fee_cap = fee_cap;
        self
    }

    pub fn with_default_gas_premium(mut self, premium: TokenAmount) -> Self {
        self.default_gas_premium = premium;
        self
    }

    /// Balance of the miner's owner and worker accounts.
    pub fn with_miner_account_balance(mut self, balance: TokenAmount) -> Self {
        self.miner_account_balance = balance;
        self
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Creates a fresh implementation instance, seeds it with the genesis
    /// actors and a miner, and returns a driver at [`INITIAL_EPOCH`].
    pub fn build(&self, test_name: &str) -> Result<TestDriver, Error> {
        self.config.check()?;
        self.check_genesis()?;

        let (st, applier) = self.factory.new_state_and_applier();
        let mut state_driver = StateDriver::new(st, self.factory.new_key_manager());

        genesis::put_empty_roots(state_driver.state_mut())?;
        for actor in &self.actor_states {
            state_driver.state_mut().create_actor(
                actor.code,
                actor.addr,
                actor.balance.clone(),
                actor.state.bytes(),
            )?;
            debug!(addr = %actor.addr, "created genesis actor");
        }
        let miner_info = state_driver.new_miner(self.miner_account_balance.clone())?;

        let tracker = StateTracker::new(
            test_name,
            Box::new(JsonFixtureStore::new(self.config.fixtures_dir.clone())),
            self.config.record,
        )?;
        info!(test = test_name, miner = %miner_info.miner_id, "built test driver");

        Ok(TestDriver::new(
            test_name.to_owned(),
            state_driver,
            MessageProducer::new(
                self.default_gas_limit,
                self.default_gas_fee_cap.clone(),
                self.default_gas_premium.clone(),
            ),
            Validator::new(applier),
            ExecutionContext::new(INITIAL_EPOCH, miner_info.miner_id),
            self.factory.new_validation_config(),
            tracker,
            self.config.gas_policy(),
            miner_info,
        ))
    }

    fn check_genesis(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for actor in &self.actor_states {
            if !seen.insert(actor.addr) {
                return Err(Error::DuplicateGenesisActor(actor.addr));
            }
        }
        match REQUIRED_ACTORS.iter().find(|addr| !seen.contains(*addr)) {
            Some(missing) => Err(Error::MissingGenesisActor(*missing)),
            None => Ok(()),
        }
    }
}

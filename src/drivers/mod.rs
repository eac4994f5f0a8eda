// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The driver layer scenarios are written against: genesis, state access,
//! message application with assertions, tipsets and their economics.

pub mod builder;
pub mod config;
pub mod economics;
mod errors;
pub mod genesis;
pub mod state_driver;
pub mod test_driver;
pub mod tipset;

pub use builder::TestDriverBuilder;
pub use config::DriverConfig;
pub use errors::Error;
pub use state_driver::{KeyType, MinerInfo, StateDriver};
pub use test_driver::TestDriver;
pub use tipset::{BlockBuilder, TipSetMessageBuilder};

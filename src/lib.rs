// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Conformance harness for Filecoin state-transition implementations.
//!
//! An implementation plugs in through the traits in [`state`]; the
//! [`drivers`] seed a genesis, apply messages and tipsets through it and
//! check the balances, receipts and state roots it reports against an
//! independently computed economic model. [`suites`] holds ready-made
//! scenarios.

pub mod actors;
pub mod chain;
pub mod drivers;
pub mod message;
pub mod shim;
pub mod state;
pub mod suites;
#[cfg(test)]
mod test_utils;
pub mod tracker;
pub mod utils;

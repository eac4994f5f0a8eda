// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Thin layer over the `fvm_shared` types the harness speaks in.

pub mod address;
pub mod crypto;
pub mod econ;
pub mod error;
pub mod message;

pub mod clock {
    pub use fvm_shared4::clock::ChainEpoch;
}

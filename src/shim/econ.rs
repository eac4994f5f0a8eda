// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use fvm_shared4::econ::TokenAmount;

/// Multiplies a per-unit price by an amount of gas.
pub fn gas_cost(price: &TokenAmount, gas: u64) -> TokenAmount {
    TokenAmount::from_atto(price.atto() * gas)
}


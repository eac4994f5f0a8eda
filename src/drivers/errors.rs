// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

use crate::shim::address::Address;

/// Misuse of the driver or a fault of the implementation under test.
#[derive(Debug, Error)]
pub enum Error {
    #[error("tipset has no blocks")]
    EmptyTipSet,
    #[error("block miner {0} does not exist")]
    UnknownMiner(Address),
    #[error("block miner {0} is not a miner actor")]
    NotAMiner(Address),
    #[error("genesis actor {0} is listed more than once")]
    DuplicateGenesisActor(Address),
    #[error("genesis is missing required actor {0}")]
    MissingGenesisActor(Address),
    #[error("expected {expected} receipts, implementation returned {actual}")]
    ReceiptCountMismatch { expected: usize, actual: usize },
    #[error("actor {0} does not exist")]
    NoActor(Address),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Tracker(#[from] crate::tracker::Error),
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

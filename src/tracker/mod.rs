// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Ordered log of gas used and state roots, replayed as expectations or
//! recorded as a new baseline.

mod store;

pub use store::{FixtureStore, JsonFixtureStore};

use cid::Cid;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("tracker for {0} is not in record mode")]
    NotRecording(String),
}

/// One fixture entry: the outcome of one applied message or tipset.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrackedResult {
    pub gas_used: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub state_root: Cid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Compare against a previously recorded log. The gas and state root
    /// cursors advance independently.
    Playback {
        log: Vec<TrackedResult>,
        gas_cursor: usize,
        root_cursor: usize,
    },
    /// Capture results as the new baseline.
    Record,
}

pub struct StateTracker {
    test_name: String,
    mode: Mode,
    tracked: Vec<TrackedResult>,
    store: Box<dyn FixtureStore>,
}

impl StateTracker {
    /// In playback mode the fixture of `test_name` is loaded from `store`;
    /// a missing fixture leaves nothing to compare against.
    pub fn new(
        test_name: impl Into<String>,
        store: Box<dyn FixtureStore>,
        record: bool,
    ) -> Result<Self, Error> {
        let test_name = test_name.into();
        let mode = if record {
            info!(test = %test_name, "recording new expectations");
            Mode::Record
        } else {
            let log = store.load(&test_name)?.unwrap_or_else(|| {
                debug!(test = %test_name, "no recorded expectations");
                Vec::new()
            });
            Mode::Playback {
                log,
                gas_cursor: 0,
                root_cursor: 0,
            }
        };
        Ok(Self {
            test_name,
            mode,
            tracked: Vec::new(),
            store,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.mode == Mode::Record
    }

    pub fn tracked(&self) -> &[TrackedResult] {
        &self.tracked
    }

    pub fn track_result(&mut self, gas_used: u64, state_root: Cid) {
        self.tracked.push(TrackedResult {
            gas_used,
            state_root,
        });
    }

    pub fn next_expected_gas(&mut self) -> Option<u64> {
        match &mut self.mode {
            Mode::Playback {
                log, gas_cursor, ..
            } => {
                let next = log.get(*gas_cursor).map(|r| r.gas_used);
                match next {
                    Some(_) => *gas_cursor += 1,
                    None => warn!(
                        test = %self.test_name,
                        index = *gas_cursor,
                        "no expected gas recorded (not a test failure)"
                    ),
                }
                next
            }
            Mode::Record => None,
        }
    }

    pub fn next_expected_state_root(&mut self) -> Option<Cid> {
        match &mut self.mode {
            Mode::Playback {
                log, root_cursor, ..
            } => {
                let next = log.get(*root_cursor).map(|r| r.state_root);
                match next {
                    Some(_) => *root_cursor += 1,
                    None => warn!(
                        test = %self.test_name,
                        index = *root_cursor,
                        "no expected state root recorded (not a test failure)"
                    ),
                }
                next
            }
            Mode::Record => None,
        }
    }

    /// Persists everything tracked so far as the fixture of this test.
    pub fn record(&self) -> Result<(), Error> {
        if !self.is_recording() {
            return Err(Error::NotRecording(self.test_name.clone()));
        }
        info!(test = %self.test_name, results = self.tracked.len(), "saving expectations");
        self.store.save(&self.test_name, &self.tracked)
    }
}

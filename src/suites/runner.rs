// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::panic::{AssertUnwindSafe, catch_unwind};

use itertools::Itertools as _;
use tracing::{error, info};

use crate::chain::validator::panic_message;

/// A failed scenario case and its panic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseFailure {
    pub case: String,
    pub message: String,
}

/// Runs the cases of one suite in isolation. A failing case does not stop its
/// siblings; [`Suite::finish`] reports all of them at once.
#[derive(Debug)]
pub struct Suite {
    name: String,
    passed: Vec<String>,
    failed: Vec<CaseFailure>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Fully qualified name of a case, also the name of its fixture.
    pub fn case_name(&self, case: &str) -> String {
        format!("{}/{}", self.name, case)
    }

    /// Runs `f` with the qualified case name.
    pub fn case(&mut self, case: &str, f: impl FnOnce(&str)) -> &mut Self {
        let name = self.case_name(case);
        match catch_unwind(AssertUnwindSafe(|| f(&name))) {
            Ok(()) => {
                info!(case = %name, "passed");
                self.passed.push(name);
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(case = %name, %message, "failed");
                self.failed.push(CaseFailure {
                    case: name,
                    message,
                });
            }
        }
        self
    }

    pub fn passed(&self) -> &[String] {
        &self.passed
    }

    pub fn failures(&self) -> &[CaseFailure] {
        &self.failed
    }

    /// Panics listing every failed case, if any.
    pub fn finish(self) {
        if !self.failed.is_empty() {
            panic!(
                "{} of {} cases in {} failed:\n{}",
                self.failed.len(),
                self.failed.len() + self.passed.len(),
                self.name,
                self.failed
                    .iter()
                    .map(|f| format!("--- {}\n{}", f.case, f.message))
                    .join("\n")
            );
        }
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod keys;
mod vm;

use std::cell::RefCell;
use std::rc::Rc;

pub use keys::FakeKeyManager;
pub use vm::{Faults, ReferenceVm, VmHandle};

use crate::state::{
    Applier, Factories, KeyManager, StaticValidationConfig, ValidationConfig, VmWrapper,
};

/// Routes harness logs to the test output. Filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a fresh reference VM for every test.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestFactories {
    pub validation: StaticValidationConfig,
    pub faults: Faults,
}

impl Factories for TestFactories {
    fn new_state_and_applier(&self) -> (Box<dyn VmWrapper>, Box<dyn Applier>) {
        let vm = VmHandle(Rc::new(RefCell::new(ReferenceVm::new(self.faults))));
        (Box::new(vm.clone()), Box::new(vm))
    }

    fn new_key_manager(&self) -> Box<dyn KeyManager> {
        Box::new(FakeKeyManager::new(0))
    }

    fn new_validation_config(&self) -> Box<dyn ValidationConfig> {
        Box::new(self.validation)
    }
}

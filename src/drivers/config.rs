// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Error;
use super::economics::GasPolicy;
use crate::shim::econ::TokenAmount;
use crate::utils::misc::env::is_env_truthy;

/// Switches the state tracker into record mode.
pub const RECORD_ENV: &str = "CHAIN_VALIDATION_RECORD";
/// Overrides the directory fixtures are read from and written to.
pub const FIXTURES_ENV: &str = "CHAIN_VALIDATION_FIXTURES";

/// Harness settings shared by every driver built from one builder.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, smart_default::SmartDefault)]
#[serde(default)]
pub struct DriverConfig {
    /// Persist observed gas and state roots as the new expectations.
    pub record: bool,
    #[default(PathBuf::from("fixtures"))]
    pub fixtures_dir: PathBuf,
    /// Base fee in attoFIL.
    #[default(100)]
    pub base_fee: u64,
    #[default(11)]
    pub gas_overuse_num: u64,
    #[default(10)]
    pub gas_overuse_denom: u64,
    #[default("chain-validation".to_owned())]
    pub network_name: String,
}

impl DriverConfig {
    pub fn from_toml(toml: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&toml)
    }

    /// Applies [`RECORD_ENV`] and [`FIXTURES_ENV`].
    pub fn with_env_overrides(mut self) -> Self {
        if is_env_truthy(RECORD_ENV) {
            self.record = true;
        }
        if let Ok(dir) = std::env::var(FIXTURES_ENV) {
            self.fixtures_dir = dir.into();
        }
        self
    }

    pub fn gas_policy(&self) -> GasPolicy {
        GasPolicy {
            base_fee: TokenAmount::from_atto(self.base_fee),
            gas_overuse_num: self.gas_overuse_num,
            gas_overuse_denom: self.gas_overuse_denom,
        }
    }

    pub(super) fn check(&self) -> Result<(), Error> {
        if self.gas_overuse_denom == 0 {
            return Err(Error::Config("gas_overuse_denom must be positive".into()));
        }
        Ok(())
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use super::{Error, TrackedResult};

/// Where recorded expectations live.
pub trait FixtureStore {
    /// The recorded results of `test`, `None` if nothing was recorded.
    fn load(&self, test: &str) -> Result<Option<Vec<TrackedResult>>, Error>;

    fn save(&self, test: &str, results: &[TrackedResult]) -> Result<(), Error>;
}

/// Stores each test as `<dir>/<test>.json`.
#[derive(Clone, Debug)]
pub struct JsonFixtureStore {
    dir: PathBuf,
}

impl JsonFixtureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, test: &str) -> PathBuf {
        let file_name: String = test
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(file_name).with_extension("json")
    }
}

impl FixtureStore for JsonFixtureStore {
    fn load(&self, test: &str) -> Result<Option<Vec<TrackedResult>>, Error> {
        let path = self.path_of(test);
        if !path.is_file() {
            return Ok(None);
        }
        let file = std::fs::File::open(path)?;
        Ok(Some(serde_json::from_reader(std::io::BufReader::new(file))?))
    }

    fn save(&self, test: &str, results: &[TrackedResult]) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(self.path_of(test), json)?;
        Ok(())
    }
}

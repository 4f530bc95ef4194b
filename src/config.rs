use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// New cars are spawned every `cycle` steps.
    pub cycle: usize,
    /// Seeds the random number generator, for reproducible runs.
    pub seed: Option<u64>,
    /// The number of steps the runner simulates.
    pub steps: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cycle: 3,
            seed: None,
            steps: 100,
        }
    }
}

impl SimConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML config.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings make sense.
    pub fn validate(&self) -> Result<()> {
        if self.cycle == 0 {
            return Err(Error::Config("cycle must be at least 1"));
        }
        Ok(())
    }
}

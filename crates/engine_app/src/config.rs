//! Harness configuration.
//!
//! Read from the JSON file named by `ENGINE_APP_CONFIG`; every field is
//! optional and missing ones take their defaults.

use std::path::Path;

use anyhow::Context;
use engine_dataset::DatasetConfig;
use serde::{Deserialize, Serialize};

use crate::tick::TickConfig;

/// Environment variable holding the path of the config file.
pub const CONFIG_ENV: &str = "ENGINE_APP_CONFIG";

/// Configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Entities spawned before the first tick.
    pub entities: u32,
    /// Upper bound on the fuel given to a moving entity, in ticks.
    pub max_fuel: u32,
    /// Snapshot records written per tick.
    pub snapshot_budget: usize,
    /// Dataset sizing.
    pub dataset: DatasetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            ticks: 120,
            entities: 256,
            max_fuel: 90,
            snapshot_budget: 64,
            dataset: DatasetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the file named by [`CONFIG_ENV`], or the defaults if it is unset.
    ///
    /// # Errors
    ///
    /// Fails if the named file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Tick loop settings derived from this config.
    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            max_ticks: self.ticks,
            snapshot_budget: self.snapshot_budget,
        }
    }
}

//! Engine configuration (can be loaded from YAML)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coordinator::{RunMode, RunOptions};
use crate::error::ConfigError;
use crate::partition::BlockLayout;

/// Grid or block extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub rows: usize,
    pub cols: usize,
}

/// Run length settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Generations to advance; ignored when `until_stopped` is set.
    pub generations: u64,
    /// Keep advancing until a stop is requested.
    pub until_stopped: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { generations: 100, until_stopped: false }
    }
}

/// Full configuration for one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid extents (NE x ME)
    pub grid: Extent,
    /// Block extents (NC x MC)
    pub block: Extent,
    pub run: RunConfig,
    /// Halt when a generation repeats a recent one
    pub halt_on_cycle: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: Extent { rows: 40, cols: 60 },
            block: Extent { rows: 10, cols: 20 },
            run: RunConfig::default(),
            halt_on_cycle: false,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Load config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Checks dimensions and run length; returns the block layout.
    pub fn validate(&self) -> Result<BlockLayout, ConfigError> {
        let layout = BlockLayout::new(
            self.grid.rows,
            self.grid.cols,
            self.block.rows,
            self.block.cols,
        )?;
        if !self.run.until_stopped && self.run.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        Ok(layout)
    }

    pub fn run_mode(&self) -> RunMode {
        if self.run.until_stopped {
            RunMode::UntilStopped
        } else {
            RunMode::Generations(self.run.generations)
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            mode: self.run_mode(),
            halt_on_cycle: self.halt_on_cycle,
            observe_every: None,
        }
    }
}

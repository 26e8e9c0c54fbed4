//! Graph configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Fixed engine settings chosen when a graph is created.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// sample_rate = 44100.0
/// max_block_frames = 256
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Sample rate the graph renders at, in Hz.
    pub sample_rate: f64,

    /// Largest block a single render call may request.
    ///
    /// Every per-node buffer is allocated at this size.
    pub max_block_frames: usize,

    /// Node arena capacity. The render actor never grows past it.
    pub max_nodes: usize,

    /// Capacity of the control-to-render command queue.
    pub command_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_frames: 512,
            max_nodes: 256,
            command_capacity: 1024,
        }
    }
}

impl GraphConfig {
    /// Creates a default config with the given sample rate and block size.
    pub fn new(sample_rate: f64, max_block_frames: usize) -> Self {
        Self {
            sample_rate,
            max_block_frames,
            ..Self::default()
        }
    }

    /// Set the node arena capacity.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set the command queue capacity.
    pub fn with_command_capacity(mut self, command_capacity: usize) -> Self {
        self.command_capacity = command_capacity;
        self
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a value the engine can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sample_rate",
                reason: "must be positive and finite",
            });
        }
        if self.max_block_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "max_block_frames",
                reason: "must be non-zero",
            });
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_nodes",
                reason: "must be non-zero",
            });
        }
        // NodeId is a u32.
        if u32::try_from(self.max_nodes).is_err() {
            return Err(ConfigError::Invalid {
                field: "max_nodes",
                reason: "must fit in 32 bits",
            });
        }
        if self.command_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "command_capacity",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }
}

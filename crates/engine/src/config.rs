// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default bound of the post-update effect queue
pub const DEFAULT_EFFECT_QUEUE_CAPACITY: usize = 64;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Coordinator settings; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub wal_path: PathBuf,
    /// Appends between automatic flushes; 0 flushes only on request
    pub flush_every: u64,
    /// Appends between automatic snapshots; 0 disables them
    pub snapshot_every: u64,
    pub effect_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("mdag.wal.jsonl"),
            flush_every: 1,
            snapshot_every: 0,
            effect_queue_capacity: DEFAULT_EFFECT_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        // Relative WAL paths are resolved against the config file
        if config.wal_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.wal_path = dir.join(&config.wal_path);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.effect_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "effect_queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.wal_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "wal_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Engine configuration, loaded from JSON.
//!
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::raycast::DEFAULT_MAX_DISTANCE;

/// Errors raised while loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file")]
    Io(#[from] io::Error),
    /// The configuration is not valid JSON for this schema.
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of the voxel engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of chunks waiting for a remesh above which the mesh worker
    /// flushes immediately instead of at the end of its tick.
    pub flush_threshold: usize,
    /// Reach of raycasts that don't specify one.
    pub max_ray_distance: f32,
    /// `env_logger` filter used instead of `RUST_LOG` when set.
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            flush_threshold: 16,
            max_ray_distance: DEFAULT_MAX_DISTANCE,
            log_filter: None,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "flush_threshold": 4, "log_filter": "debug" }"#).unwrap();
        assert_eq!(config.flush_threshold, 4);
        assert_eq!(config.max_ray_distance, 64.0);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{ flush_threshold: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            EngineConfig::from_file("/nonexistent/voxel-engine.json"),
            Err(ConfigError::Io(_))
        ));
    }
}

//! Configuration system
//!
//! Tuning knobs for the hierarchy, loadable from TOML or RON files.

pub use serde::{Deserialize, Serialize};

use crate::spatial::bvh::BuildStrategy;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning parameters for a [`BoundingVolumeHierarchy`](crate::BoundingVolumeHierarchy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// Fattening margin applied by the `*_default` mutators and the broad-phase adapter
    pub default_margin: f32,

    /// Strategy used when the hierarchy is rebuilt from scratch
    pub build_strategy: BuildStrategy,

    /// Half-width of the split window searched by [`BuildStrategy::Balanced`]
    pub balanced_window: usize,

    /// Run the full invariant check after every mutation (debug builds only)
    pub validate_mutations: bool,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            default_margin: 0.0,
            build_strategy: BuildStrategy::Balanced,
            balanced_window: BuildStrategy::DEFAULT_BALANCED_WINDOW,
            validate_mutations: false,
        }
    }
}

impl Config for BvhConfig {}

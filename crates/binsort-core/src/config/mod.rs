//! Configuration management for binsort.
//!
//! Configuration is loaded from the platform config directory (falling back to
//! `~/.binsort/config.toml`) with sensible defaults for every field.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for binsort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Category map settings
    pub vocabulary: VocabularyConfig,

    /// Discovery log settings
    pub discovery_log: DiscoveryLogConfig,

    /// Vision service settings
    pub detection: DetectionConfig,

    /// Image normalization settings
    pub image: ImageConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input collection settings
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.binsort.binsort/config.toml
    /// - Linux: ~/.config/binsort/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\binsort\config\config.toml
    ///
    /// Falls back to ~/.binsort/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "binsort", "binsort")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".binsort").join("config.toml")
            })
    }

    /// Resolved vocabulary file path (with ~ expansion).
    pub fn vocabulary_path(&self) -> PathBuf {
        expand(&self.vocabulary.path)
    }

    /// Resolved discovery log path (with ~ expansion).
    pub fn discovery_log_path(&self) -> PathBuf {
        expand(&self.discovery_log.path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

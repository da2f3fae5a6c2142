//! Configuration file parsing for tidelog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_log_count() -> usize {
    DEFAULT_LOG_COUNT
}

fn default_max_file_size() -> u64 {
    DEFAULT_LOG_MAX_SIZE
}

fn default_snapshot_max_bytes() -> u64 {
    DEFAULT_SNAPSHOT_MAX_BYTES
}

/// Which rotation policy a logger runs with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Keep the newest `log_count` files, each up to `max_file_size` bytes
    RollingWindow {
        #[serde(default = "default_log_count")]
        log_count: usize,
        #[serde(default = "default_max_file_size")]
        max_file_size: u64,
    },
    /// One file per session, nothing is ever deleted
    UnboundedSession,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::RollingWindow {
            log_count: DEFAULT_LOG_COUNT,
            max_file_size: DEFAULT_LOG_MAX_SIZE,
        }
    }
}

/// Defaults applied when a snapshot is requested without explicit options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_max_bytes")]
    pub max_bytes: u64,
    #[serde(default)]
    pub gzip: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_SNAPSHOT_MAX_BYTES,
            gzip: false,
        }
    }
}

/// Logger configuration (tidelog.toml/yaml/json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Directory owned by the logger
    #[serde(default = "logs_dir")]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Mirror every written record to stdout
    #[serde(default)]
    pub echo: bool,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            base_dir: logs_dir(),
            policy: PolicyConfig::default(),
            echo: false,
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Default configuration rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load the first known config file in `dir`
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Reject settings the rotation policies cannot honour
    pub fn validate(&self) -> Result<()> {
        if let PolicyConfig::RollingWindow {
            log_count,
            max_file_size,
        } = self.policy
        {
            if log_count == 0 {
                return Err(Error::config("policy.log_count must be at least 1"));
            }
            if max_file_size == 0 {
                return Err(Error::config("policy.max_file_size must be at least 1"));
            }
        }
        Ok(())
    }
}

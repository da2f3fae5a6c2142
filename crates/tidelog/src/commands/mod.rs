//! Command implementations

pub mod append;
pub mod files;
pub mod pipe;
pub mod snapshot;

use anyhow::{Context, Result};
use std::path::Path;
use tidelog_core::{constants::CONFIG_FILES, LoggerConfig};
use tidelog_logs::LogManager;
use tracing::debug;

/// Resolve the logger config: an explicit file, else one found in the
/// working directory, else defaults. `dir` overrides the base directory.
pub fn load_config(config: Option<&Path>, dir: Option<&Path>) -> Result<LoggerConfig> {
    let mut config = match config {
        Some(path) => LoggerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => discover_config()?,
    };

    if let Some(dir) = dir {
        config.base_dir = dir.to_path_buf();
    }

    Ok(config)
}

fn discover_config() -> Result<LoggerConfig> {
    let cwd = std::env::current_dir()?;
    if !CONFIG_FILES.iter().any(|name| cwd.join(name).exists()) {
        return Ok(LoggerConfig::default());
    }

    let (config, path) = LoggerConfig::find_and_load(&cwd)?;
    debug!("Using config {}", path.display());
    Ok(config)
}

/// Start a manager for the configured directory
pub fn open_manager(config: &LoggerConfig) -> Result<LogManager> {
    LogManager::from_config(config)
        .with_context(|| format!("Failed to open log directory {}", config.base_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_config_with_dir_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tidelog.toml");
        fs::write(
            &path,
            "base_dir = \"/from/config\"\n[policy]\nkind = \"unbounded_session\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.base_dir, Path::new("/from/config"));

        let config = load_config(Some(&path), Some(Path::new("/override"))).unwrap();
        assert_eq!(config.base_dir, Path::new("/override"));
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml")), None).is_err());
    }
}

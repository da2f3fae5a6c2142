//! Error types for tidelog

use std::path::PathBuf;

/// tidelog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to list log directory {dir}: {source}")]
    Scan {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was created and opened but its metadata could not be read back
    #[error("Log file {0} was written but could not be described")]
    DescriptorUnavailable(PathBuf),

    #[error("Failed to delete unretained log file {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path} for snapshot: {source}")]
    SnapshotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path} for snapshot: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compress snapshot of {input_len} bytes: {source}")]
    Compression {
        input_len: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close log file {path}: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging queue is no longer running")]
    QueueClosed,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for tidelog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }
}

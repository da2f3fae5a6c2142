//! Constants and default values for tidelog

use std::path::PathBuf;

/// Default tidelog home directory name
pub const TIDELOG_DIR: &str = ".tidelog";

/// Default log directory name
pub const LOGS_DIR: &str = "logs";

/// Config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &["tidelog.toml", "tidelog.yaml", "tidelog.yml", "tidelog.json"];

/// Extension given to freshly minted log files
pub const LOG_EXTENSION: &str = "log";

/// chrono format for minted file names: `YYYY_MM_DD__HH_mm_ss.SSS`.
/// Lexicographic order of the output matches chronological order.
pub const FILE_NAME_FORMAT: &str = "%Y_%m_%d__%H_%M_%S%.3f";

/// chrono format for the human readable date in record headers
pub const HEADER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S +0000";

/// Default number of files kept by the rolling window
pub const DEFAULT_LOG_COUNT: usize = 5;

/// Default size ceiling per log file in bytes (10MB)
pub const DEFAULT_LOG_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default snapshot cap in bytes
pub const DEFAULT_SNAPSHOT_MAX_BYTES: u64 = 10_000_000;

/// Name of the logging queue worker thread
pub const QUEUE_THREAD_NAME: &str = "tidelog-queue";

/// Get the tidelog home directory
pub fn tidelog_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(TIDELOG_DIR))
        .unwrap_or_else(|| PathBuf::from(TIDELOG_DIR))
}

/// Get the default logs directory
pub fn logs_dir() -> PathBuf {
    tidelog_home().join(LOGS_DIR)
}

//! tidelog logs - rolling log files, rotation policies, and snapshots

mod manager;
pub mod policy;
mod scanner;
pub mod snapshot;
mod target;

pub use manager::{LogManager, LogManagerBuilder, Pending};
pub use policy::{RollingWindow, RotationPolicy, UnboundedSession};
pub use scanner::{describe, DirectoryScanner};
pub use target::{format_record, OpenTarget};

use std::path::Path;
use tidelog_core::{Error, Result};

/// Ensure a log directory exists, creating parents as needed.
///
/// Fails when `dir` or one of its parents exists but is not a directory.
pub fn ensure_log_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

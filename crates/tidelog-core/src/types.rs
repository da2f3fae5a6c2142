//! Core types for tidelog

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::constants::{FILE_NAME_FORMAT, HEADER_DATE_FORMAT, LOG_EXTENSION};

/// A wall-clock instant with millisecond precision, counted from the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant(i64);

impl Instant {
    pub const MILLIS_PER_SECOND: i64 = 1000;

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Convert to a UTC date, clamping values chrono cannot represent
    pub fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether both instants fall in the same one-second bucket
    pub fn same_second(a: Instant, b: Instant) -> bool {
        a.0.div_euclid(Self::MILLIS_PER_SECOND) == b.0.div_euclid(Self::MILLIS_PER_SECOND)
    }

    /// Header line that opens a new second in a log file
    pub fn header_line(self) -> String {
        format!(
            "@{} ({})\n",
            self.to_datetime().format(HEADER_DATE_FORMAT),
            self.0
        )
    }

    /// Timestamped log file name, e.g. `2026_10_19__09_30_01.250.log`
    pub fn file_name(self) -> String {
        format!(
            "{}.{}",
            self.to_datetime().format(FILE_NAME_FORMAT),
            LOG_EXTENSION
        )
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a log file as observed when its directory was scanned.
///
/// Two descriptors are equal when their paths are equal, whatever size or
/// modification time they captured.
#[derive(Debug, Clone, Serialize)]
pub struct LogFileDescriptor {
    name: String,
    path: PathBuf,
    size: u64,
    modified_at: DateTime<Utc>,
}

impl LogFileDescriptor {
    pub fn new(path: PathBuf, size: u64, modified_at: DateTime<Utc>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            size,
            modified_at,
        }
    }

    /// Build from filesystem metadata values
    pub fn from_metadata(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self::new(path, size, DateTime::<Utc>::from(modified))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

impl PartialEq for LogFileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for LogFileDescriptor {}

impl Hash for LogFileDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Display for LogFileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes, modified {})",
            self.path.display(),
            self.size,
            self.modified_at
        )
    }
}

//! Size-bounded snapshots spanning several log files

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tidelog_core::{Error, LogFileDescriptor, Result, SnapshotConfig};
use tracing::debug;

use crate::policy::RotationPolicy;
use crate::scanner::DirectoryScanner;

/// Where a snapshot starts within an oldest-to-newest file list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPlan {
    /// First file contributing bytes
    pub start_index: usize,
    /// Offset into that file
    pub start_offset: u64,
    /// Total bytes the snapshot will hold
    pub len: u64,
}

/// Work out the byte range holding the newest `max_bytes` of the log stream.
///
/// Files are walked newest to oldest; the file where the budget runs out is
/// only read from `size - remaining` onward.
pub fn plan(sorted: &[LogFileDescriptor], max_bytes: u64) -> SnapshotPlan {
    let mut remaining = max_bytes;
    let mut start_index = 0;
    let mut start_offset = 0;

    for (idx, file) in sorted.iter().enumerate().rev() {
        if remaining < file.size() {
            start_index = idx;
            start_offset = file.size() - remaining;
            remaining = 0;
            break;
        }
        remaining -= file.size();
    }

    SnapshotPlan {
        start_index,
        start_offset,
        len: max_bytes - remaining,
    }
}

/// Read the planned range, oldest to newest, into one buffer
pub fn assemble(sorted: &[LogFileDescriptor], plan: &SnapshotPlan) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(capacity_hint(plan.len));

    for (idx, file) in sorted.iter().enumerate().skip(plan.start_index) {
        let offset = if idx == plan.start_index {
            plan.start_offset
        } else {
            0
        };
        read_range(file.path(), offset, file.size() - offset, &mut buffer)?;
    }

    Ok(buffer)
}

/// Upper bound on memory reserved up front; larger snapshots grow as they read
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

fn capacity_hint(len: u64) -> usize {
    usize::try_from(len.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Append `len` bytes of `path` starting at `offset` to `buffer`
pub fn read_range(path: &Path, offset: u64, len: u64, buffer: &mut Vec<u8>) -> Result<u64> {
    let mut file = File::open(path).map_err(|source| Error::SnapshotOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let read_err = |source| Error::SnapshotRead {
        path: path.to_path_buf(),
        source,
    };
    file.seek(SeekFrom::Start(offset)).map_err(read_err)?;
    let read = file.take(len).read_to_end(buffer).map_err(read_err)?;
    Ok(read as u64)
}

/// Gzip a buffer. The output carries no timestamp, so equal input gives equal output.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let compress = || -> std::io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    };

    compress().map_err(|source| Error::Compression {
        input_len: data.len(),
        source,
    })
}

/// Scan, plan, read, and optionally compress a snapshot
pub fn capture(
    scanner: &DirectoryScanner,
    policy: &dyn RotationPolicy,
    options: SnapshotConfig,
) -> Result<Vec<u8>> {
    let mut files = scanner.scan()?;
    policy.sort(&mut files);

    let plan = plan(&files, options.max_bytes);
    let data = assemble(&files, &plan)?;
    debug!(
        "Snapshot of {} bytes from {} file(s)",
        data.len(),
        files.len() - plan.start_index.min(files.len())
    );

    if options.gzip {
        gzip(&data)
    } else {
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::UnboundedSession;
    use chrono::Utc;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn file(name: &str, size: u64) -> LogFileDescriptor {
        LogFileDescriptor::new(PathBuf::from("/logs").join(name), size, Utc::now())
    }

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<LogFileDescriptor> {
        let scanner = DirectoryScanner::new(dir.to_path_buf());
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        let mut scanned = scanner.scan().unwrap();
        UnboundedSession.sort(&mut scanned);
        scanned
    }

    #[test]
    fn test_plan_partial_cut() {
        let files = vec![file("a.log", 6), file("b.log", 8)];
        assert_eq!(
            plan(&files, 10),
            SnapshotPlan {
                start_index: 0,
                start_offset: 4,
                len: 10
            }
        );
    }

    #[test]
    fn test_plan_everything_fits() {
        let files = vec![file("a.log", 6), file("b.log", 8)];
        assert_eq!(
            plan(&files, 100),
            SnapshotPlan {
                start_index: 0,
                start_offset: 0,
                len: 14
            }
        );
    }

    #[test]
    fn test_plan_exact_boundary() {
        let files = vec![file("a.log", 6), file("b.log", 8)];
        // The older file is cut at its very end and contributes nothing
        assert_eq!(
            plan(&files, 8),
            SnapshotPlan {
                start_index: 0,
                start_offset: 6,
                len: 8
            }
        );
    }

    #[test]
    fn test_plan_zero_budget() {
        let files = vec![file("a.log", 6)];
        assert_eq!(plan(&files, 0).len, 0);
        assert_eq!(plan(&[], 10).len, 0);
    }

    #[test]
    fn test_assemble_tail_across_files() {
        let dir = TempDir::new().unwrap();
        let files = write_files(dir.path(), &[("a.log", "012345"), ("b.log", "abcdefgh")]);

        let data = assemble(&files, &plan(&files, 10)).unwrap();
        assert_eq!(data, b"45abcdefgh");
    }

    #[test]
    fn test_assemble_tail_within_newest() {
        let dir = TempDir::new().unwrap();
        let files = write_files(dir.path(), &[("a.log", "012345"), ("b.log", "abcdefgh")]);

        let data = assemble(&files, &plan(&files, 3)).unwrap();
        assert_eq!(data, b"fgh");
    }

    #[test]
    fn test_capacity_hint_is_capped() {
        assert_eq!(capacity_hint(0), 0);
        assert_eq!(capacity_hint(4096), 4096);
        assert_eq!(capacity_hint(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn test_assemble_missing_file() {
        let files = vec![file("vanished.log", 4)];
        let err = assemble(&files, &plan(&files, 4)).unwrap_err();
        assert!(matches!(err, Error::SnapshotOpen { .. }));
    }

    #[test]
    fn test_read_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        fs::write(&path, b"0123456789").unwrap();

        let mut buffer = b">".to_vec();
        assert_eq!(read_range(&path, 3, 4, &mut buffer).unwrap(), 4);
        assert_eq!(buffer, b">3456");
    }

    #[test]
    fn test_gzip_round_trip() {
        let data = b" a line\n another line\n".repeat(50);
        let compressed = gzip(&data).unwrap();
        assert!(compressed.len() < data.len());

        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_gzip_is_deterministic() {
        let data = b"same input".to_vec();
        assert_eq!(gzip(&data).unwrap(), gzip(&data).unwrap());
    }

    #[test]
    fn test_capture() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("b.log", "newer"), ("a.log", "older ")]);
        let scanner = DirectoryScanner::new(dir.path().to_path_buf());

        let options = SnapshotConfig {
            max_bytes: 1000,
            gzip: false,
        };
        let data = capture(&scanner, &UnboundedSession, options).unwrap();
        assert_eq!(data, b"older newer");
    }
}

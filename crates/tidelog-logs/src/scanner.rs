//! Directory listing for log files

use std::fs;
use std::path::{Path, PathBuf};
use tidelog_core::{Error, LogFileDescriptor, Result};
use tracing::trace;

/// Lists a log directory as a set of [`LogFileDescriptor`]s.
///
/// The directory is the source of truth: every call rescans it and nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    dir: PathBuf,
}

impl DirectoryScanner {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The scanned directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Describe every regular file in the directory.
    ///
    /// Failing to list the directory is an error. An entry whose metadata
    /// cannot be read is skipped.
    pub fn scan(&self) -> Result<Vec<LogFileDescriptor>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| Error::Scan {
            dir: self.dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            match describe(&path) {
                Some(descriptor) => files.push(descriptor),
                None => trace!("Skipping {}", path.display()),
            }
        }

        Ok(files)
    }
}

/// Describe a single file, or `None` if it is not a readable regular file
pub fn describe(path: &Path) -> Option<LogFileDescriptor> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    let modified = metadata.modified().ok()?;
    Some(LogFileDescriptor::from_metadata(
        path.to_path_buf(),
        metadata.len(),
        modified,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sorted_names(files: &[LogFileDescriptor]) -> Vec<String> {
        let mut names: Vec<String> = files.iter().map(|f| f.name().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_scan_empty_dir() {
        let dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(dir.path().to_path_buf());
        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_reports_sizes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.log"), b"hello").unwrap();
        fs::write(dir.path().join("b.log"), b"").unwrap();

        let scanner = DirectoryScanner::new(dir.path().to_path_buf());
        let mut files = scanner.scan().unwrap();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        assert_eq!(sorted_names(&files), vec!["a.log", "b.log"]);
        assert_eq!(files[0].size(), 5);
        assert_eq!(files[1].size(), 0);
        assert_eq!(files[0].path(), dir.path().join("a.log"));
    }

    #[test]
    fn test_scan_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.log"), b"x").unwrap();

        let scanner = DirectoryScanner::new(dir.path().to_path_buf());
        assert_eq!(sorted_names(&scanner.scan().unwrap()), vec!["a.log"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_entries_without_metadata() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.log"), b"x").unwrap();
        // A dangling symlink lists fine but its metadata cannot be read
        std::os::unix::fs::symlink(
            dir.path().join("missing.log"),
            dir.path().join("dangling.log"),
        )
        .unwrap();

        let scanner = DirectoryScanner::new(dir.path().to_path_buf());
        assert_eq!(sorted_names(&scanner.scan().unwrap()), vec!["a.log"]);
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(dir.path().join("gone"));
        let err = scanner.scan().unwrap_err();
        assert!(matches!(err, Error::Scan { .. }));
    }

    #[test]
    fn test_describe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        fs::write(&path, b"0123456789").unwrap();

        let descriptor = describe(&path).unwrap();
        assert_eq!(descriptor.name(), "a.log");
        assert_eq!(descriptor.size(), 10);
        assert!(describe(&dir.path().join("nope.log")).is_none());
        assert!(describe(dir.path()).is_none());
    }
}

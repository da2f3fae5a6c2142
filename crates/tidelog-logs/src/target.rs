//! The log file currently receiving records

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tidelog_core::{Error, Instant, LogFileDescriptor, Result};

use crate::scanner;

/// Render one record.
///
/// A record in the same second as `last_logged` is a bare continuation line,
/// otherwise it is prefixed by a header line carrying the date and raw instant.
pub fn format_record(last_logged: Option<Instant>, now: Instant, message: &str) -> String {
    match last_logged {
        Some(last) if Instant::same_second(last, now) => format!(" {}\n", message),
        _ => format!("{} {}\n", now.header_line(), message),
    }
}

/// An open, append-positioned log file
#[derive(Debug)]
pub struct OpenTarget {
    descriptor: LogFileDescriptor,
    file: File,
    offset: u64,
    last_logged: Option<Instant>,
}

impl OpenTarget {
    /// Open `path` for appending, creating it empty if it does not exist
    pub fn open_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            File::create(path).map_err(|source| Error::Create {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let open_err = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new().append(true).open(path).map_err(open_err)?;
        let offset = file.metadata().map_err(open_err)?.len();

        let descriptor = scanner::describe(path)
            .ok_or_else(|| Error::DescriptorUnavailable(path.to_path_buf()))?;

        Ok(Self {
            descriptor,
            file,
            offset,
            last_logged: None,
        })
    }

    /// Append one record and flush it to stable storage.
    ///
    /// Returns the text that was written.
    pub fn append(&mut self, message: &str, now: Instant) -> std::io::Result<String> {
        let record = format_record(self.last_logged, now, message);
        self.file.write_all(record.as_bytes())?;
        self.file.sync_data()?;

        self.offset += record.len() as u64;
        match self.last_logged {
            Some(last) if Instant::same_second(last, now) => {}
            _ => self.last_logged = Some(now),
        }
        Ok(record)
    }

    /// Flush and close the handle
    pub fn close(self) -> Result<()> {
        self.file.sync_all().map_err(|source| Error::Close {
            path: self.descriptor.path().to_path_buf(),
            source,
        })
    }

    /// Descriptor captured when the file was opened
    pub fn descriptor(&self) -> &LogFileDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        self.descriptor.path()
    }

    /// Current end-of-file position
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn last_logged(&self) -> Option<Instant> {
        self.last_logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_format_record_header() {
        let now = Instant::from_millis(T0 + 5);
        assert_eq!(
            format_record(None, now, "hello"),
            "@2023-11-14 22:13:20 +0000 (1700000000005)\n hello\n"
        );
    }

    #[test]
    fn test_format_record_continuation() {
        let last = Instant::from_millis(T0);
        let now = Instant::from_millis(T0 + 999);
        assert_eq!(format_record(Some(last), now, "hello"), " hello\n");
    }

    #[test]
    fn test_format_record_next_second() {
        let last = Instant::from_millis(T0 + 999);
        let now = Instant::from_millis(T0 + 1000);
        assert!(format_record(Some(last), now, "hello").starts_with('@'));
    }

    #[test]
    fn test_open_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.log");

        let target = OpenTarget::open_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(target.offset(), 0);
        assert_eq!(target.descriptor().name(), "new.log");
        assert!(target.last_logged().is_none());
    }

    #[test]
    fn test_open_existing_appends_at_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.log");
        fs::write(&path, b"previous\n").unwrap();

        let mut target = OpenTarget::open_at(&path).unwrap();
        assert_eq!(target.offset(), 9);

        target.append("next", Instant::from_millis(T0)).unwrap();
        target.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous\n@"));
        assert!(content.ends_with(" next\n"));
    }

    #[test]
    fn test_append_tracks_offset_and_instant() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        let mut target = OpenTarget::open_at(&path).unwrap();

        let first = target.append("one", Instant::from_millis(T0)).unwrap();
        let second = target.append("two", Instant::from_millis(T0 + 10)).unwrap();

        assert_eq!(second, " two\n");
        assert_eq!(target.offset(), (first.len() + second.len()) as u64);
        assert_eq!(target.last_logged(), Some(Instant::from_millis(T0)));
        assert_eq!(fs::metadata(&path).unwrap().len(), target.offset());
    }

    #[test]
    fn test_open_in_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = OpenTarget::open_at(&dir.path().join("gone").join("a.log")).unwrap_err();
        assert!(matches!(err, Error::Create { .. }));
    }
}

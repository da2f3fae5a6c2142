//! Log manager - owns the logging queue and the current target
//!
//! Every operation is a unit of work on a single worker thread, so rotation,
//! writes, deletions, and snapshot reads never interleave. Callers never block:
//! operations with an observable outcome hand back a [`Pending`] completion.

use crossbeam_channel::{Receiver, Sender};
use std::collections::HashSet;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread::JoinHandle;
use tidelog_core::{constants, Error, Instant, LogFileDescriptor, LoggerConfig, Result, SnapshotConfig};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::policy::{self, RollingWindow, RotationPolicy, UnboundedSession};
use crate::scanner::DirectoryScanner;
use crate::snapshot;
use crate::target::OpenTarget;

/// Completion of a queued operation.
///
/// Await it from async code, or call [`Pending::wait`] from a plain thread.
/// Resolves to [`Error::QueueClosed`] if the queue stopped before running the
/// operation.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Block the current thread until the operation has run.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or(Err(Error::QueueClosed))
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(Error::QueueClosed)))
    }
}

enum Command {
    Append {
        message: String,
        now: Instant,
    },
    Fence {
        done: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        options: SnapshotConfig,
        done: oneshot::Sender<Result<Vec<u8>>>,
    },
    Shutdown {
        done: oneshot::Sender<Result<()>>,
    },
}

/// Builder for [`LogManager`]
pub struct LogManagerBuilder {
    base_dir: PathBuf,
    policy: Box<dyn RotationPolicy>,
    echo: bool,
    snapshot: SnapshotConfig,
}

impl LogManagerBuilder {
    pub fn new(base_dir: impl Into<PathBuf>, policy: Box<dyn RotationPolicy>) -> Self {
        Self {
            base_dir: base_dir.into(),
            policy,
            echo: false,
            snapshot: SnapshotConfig::default(),
        }
    }

    /// Mirror every written record to stdout
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Options used by [`LogManager::snapshot_default`]
    pub fn snapshot_defaults(mut self, snapshot: SnapshotConfig) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Create the base directory and start the logging queue
    pub fn build(self) -> Result<LogManager> {
        crate::ensure_log_dir(&self.base_dir)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = Worker {
            scanner: DirectoryScanner::new(self.base_dir.clone()),
            policy: self.policy,
            target: None,
            echo: self.echo,
            remove_file,
        };

        let handle = std::thread::Builder::new()
            .name(constants::QUEUE_THREAD_NAME.to_string())
            .spawn(move || worker.run(rx))?;

        info!("Logging to {}", self.base_dir.display());

        Ok(LogManager {
            tx: Some(tx),
            worker: Some(handle),
            base_dir: self.base_dir,
            snapshot: self.snapshot,
        })
    }
}

/// Rolling log file manager for one base directory.
///
/// Only one manager may own a directory at a time; two managers on the same
/// directory race each other.
pub struct LogManager {
    tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    base_dir: PathBuf,
    snapshot: SnapshotConfig,
}

impl LogManager {
    /// Keep at most `log_count` files of up to `max_file_size` bytes each
    pub fn rolling_window(
        base_dir: impl Into<PathBuf>,
        log_count: usize,
        max_file_size: u64,
    ) -> Result<Self> {
        Self::with_policy(base_dir, RollingWindow::new(log_count, max_file_size))
    }

    /// A new file per session, never deleting anything
    pub fn unbounded_session(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_policy(base_dir, UnboundedSession)
    }

    pub fn with_policy<P: RotationPolicy>(base_dir: impl Into<PathBuf>, policy: P) -> Result<Self> {
        Self::builder(base_dir, Box::new(policy)).build()
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;
        Self::builder(config.base_dir.clone(), policy::from_config(&config.policy))
            .echo(config.echo)
            .snapshot_defaults(config.snapshot)
            .build()
    }

    pub fn builder(base_dir: impl Into<PathBuf>, policy: Box<dyn RotationPolicy>) -> LogManagerBuilder {
        LogManagerBuilder::new(base_dir, policy)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Queue a message stamped with the current time.
    ///
    /// Never fails: if no file can be opened the message is dropped and the
    /// reason is reported through `tracing`.
    pub fn append(&self, message: impl Into<String>) {
        self.append_at(message, Instant::now());
    }

    /// Queue a message stamped with `now`
    pub fn append_at(&self, message: impl Into<String>, now: Instant) {
        self.send(Command::Append {
            message: message.into(),
            now,
        });
    }

    /// Resolves once every previously queued operation has run
    pub fn fence(&self) -> Pending<()> {
        let (done, rx) = oneshot::channel();
        self.send(Command::Fence { done });
        Pending { rx }
    }

    /// Close the current file and collect the newest `max_bytes` of history,
    /// gzip-compressed if asked
    pub fn snapshot(&self, max_bytes: u64, gzip: bool) -> Pending<Vec<u8>> {
        self.snapshot_with(SnapshotConfig { max_bytes, gzip })
    }

    /// Snapshot using the configured defaults
    pub fn snapshot_default(&self) -> Pending<Vec<u8>> {
        self.snapshot_with(self.snapshot)
    }

    pub fn snapshot_with(&self, options: SnapshotConfig) -> Pending<Vec<u8>> {
        let (done, rx) = oneshot::channel();
        self.send(Command::Snapshot { options, done });
        Pending { rx }
    }

    /// Close the current file, if any. Later appends open a new one.
    pub fn shutdown(&self) -> Pending<()> {
        let (done, rx) = oneshot::channel();
        self.send(Command::Shutdown { done });
        Pending { rx }
    }

    fn send(&self, command: Command) {
        // A failed send drops the command and with it any completion sender,
        // which resolves the caller's Pending to QueueClosed.
        if let Some(tx) = &self.tx {
            if tx.send(command).is_err() {
                warn!("Logging queue for {} is gone", self.base_dir.display());
            }
        }
    }
}

impl Drop for LogManager {
    fn drop(&mut self) {
        // Disconnecting lets the worker drain what is queued and close the target
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Logging queue for {} panicked", self.base_dir.display());
            }
        }
    }
}

fn remove_file(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

/// State owned by the logging queue
struct Worker {
    scanner: DirectoryScanner,
    policy: Box<dyn RotationPolicy>,
    target: Option<OpenTarget>,
    echo: bool,
    remove_file: fn(&Path) -> io::Result<()>,
}

impl Worker {
    fn run(mut self, rx: Receiver<Command>) {
        for command in rx.iter() {
            match command {
                Command::Append { message, now } => self.append(&message, now),
                Command::Fence { done } => {
                    let _ = done.send(Ok(()));
                }
                Command::Snapshot { options, done } => {
                    let _ = done.send(self.snapshot(options));
                }
                Command::Shutdown { done } => {
                    let _ = done.send(self.close_target());
                }
            }
        }

        if let Err(e) = self.close_target() {
            warn!("{}", e);
        }
        debug!("Logging queue for {} stopped", self.scanner.dir().display());
    }

    fn append(&mut self, message: &str, now: Instant) {
        let keep = match &self.target {
            Some(target) => self.policy.keep_target(target, now),
            None => false,
        };

        if !keep {
            if let Err(e) = self.rotate(now) {
                warn!("Dropping log message: {}", e);
                return;
            }
        }

        let Some(target) = self.target.as_mut() else {
            return;
        };

        match target.append(message, now) {
            Ok(record) => {
                if self.echo {
                    let _ = io::stdout().lock().write_all(record.as_bytes());
                }
            }
            Err(e) => {
                warn!("Failed to write to {}: {}", target.path().display(), e);
                // Force the next append to pick a target again
                self.target = None;
            }
        }
    }

    /// Close the current target, apply retention, and open the next target.
    ///
    /// The first failed deletion aborts the rotation and leaves no target open.
    fn rotate(&mut self, now: Instant) -> Result<()> {
        if let Err(e) = self.close_target() {
            warn!("{}", e);
        }

        let mut files = self.scanner.scan()?;
        self.policy.sort(&mut files);
        let retained: HashSet<LogFileDescriptor> =
            self.policy.retain(&files).into_iter().collect();
        let (keep, delete): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|file| retained.contains(file));

        for file in &delete {
            self.delete_unretained(file)?;
        }

        let name = self.policy.file_name(now, &keep);
        let path = match keep.iter().find(|file| file.name() == name) {
            Some(existing) => existing.path().to_path_buf(),
            None => self.scanner.dir().join(&name),
        };

        let target = OpenTarget::open_at(&path)?;
        debug!("Rotated to {} at offset {}", path.display(), target.offset());
        self.target = Some(target);
        Ok(())
    }

    fn delete_unretained(&self, file: &LogFileDescriptor) -> Result<()> {
        match (self.remove_file)(file.path()) {
            Ok(()) => {
                debug!("Deleted unretained log file {}", file);
                Ok(())
            }
            // Someone else already removed it; retention holds either way
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Unretained log file {} was already gone", file.path().display());
                Ok(())
            }
            Err(source) => Err(Error::Delete {
                path: file.path().to_path_buf(),
                source,
            }),
        }
    }

    fn snapshot(&mut self, options: SnapshotConfig) -> Result<Vec<u8>> {
        if let Err(e) = self.close_target() {
            warn!("{}", e);
        }
        snapshot::capture(&self.scanner, self.policy.as_ref(), options)
    }

    fn close_target(&mut self) -> Result<()> {
        match self.target.take() {
            Some(target) => target.close(),
            None => Ok(()),
        }
    }
}

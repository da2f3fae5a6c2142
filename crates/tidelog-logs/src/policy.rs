//! Rotation policies
//!
//! A policy decides which files survive a rotation, which file receives the
//! next records, and whether the current target may keep growing.

use std::cmp::Ordering;
use tidelog_core::{Instant, LogFileDescriptor, PolicyConfig};

use crate::target::OpenTarget;

/// Pluggable rotation decisions. Implementations must be pure.
pub trait RotationPolicy: Send + 'static {
    /// Name of the file to write to next. Returning the name of a file in
    /// `kept` means "keep appending to that file".
    fn file_name(&self, now: Instant, kept: &[LogFileDescriptor]) -> String;

    /// Files that survive a rotation; everything else in `files` is deleted
    fn retain(&self, files: &[LogFileDescriptor]) -> Vec<LogFileDescriptor>;

    /// Whether the open target may keep receiving records without a rescan
    fn keep_target(&self, target: &OpenTarget, now: Instant) -> bool;

    /// Total order from oldest to newest
    fn order(&self, a: &LogFileDescriptor, b: &LogFileDescriptor) -> Ordering {
        a.path().cmp(b.path())
    }

    /// Sort oldest to newest using [`RotationPolicy::order`]
    fn sort(&self, files: &mut [LogFileDescriptor]) {
        files.sort_by(|a, b| self.order(a, b));
    }
}

/// Keep the newest `log_count` files, each growing up to `max_file_size` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    log_count: usize,
    max_file_size: u64,
}

impl RollingWindow {
    pub fn new(log_count: usize, max_file_size: u64) -> Self {
        Self {
            log_count,
            max_file_size,
        }
    }

    pub fn log_count(&self) -> usize {
        self.log_count
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn is_full(&self, file: &LogFileDescriptor) -> bool {
        file.size() >= self.max_file_size
    }
}

impl RotationPolicy for RollingWindow {
    fn file_name(&self, now: Instant, kept: &[LogFileDescriptor]) -> String {
        match kept.iter().max_by(|a, b| self.order(a, b)) {
            Some(newest) if !self.is_full(newest) => newest.name().to_string(),
            _ => now.file_name(),
        }
    }

    fn retain(&self, files: &[LogFileDescriptor]) -> Vec<LogFileDescriptor> {
        let mut sorted = files.to_vec();
        self.sort(&mut sorted);

        // A full newest file means a fresh one is about to be minted, so leave
        // room for it inside the window.
        let window = match sorted.last() {
            Some(newest) if self.is_full(newest) => self.log_count.saturating_sub(1),
            _ => self.log_count,
        };

        let skip = sorted.len().saturating_sub(window);
        sorted.split_off(skip)
    }

    fn keep_target(&self, target: &OpenTarget, _now: Instant) -> bool {
        target.offset() < self.max_file_size
    }
}

/// A new file for every session, nothing is ever deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnboundedSession;

impl RotationPolicy for UnboundedSession {
    fn file_name(&self, now: Instant, _kept: &[LogFileDescriptor]) -> String {
        now.file_name()
    }

    fn retain(&self, files: &[LogFileDescriptor]) -> Vec<LogFileDescriptor> {
        files.to_vec()
    }

    fn keep_target(&self, _target: &OpenTarget, _now: Instant) -> bool {
        true
    }
}

/// Build the policy a config describes
pub fn from_config(config: &PolicyConfig) -> Box<dyn RotationPolicy> {
    match *config {
        PolicyConfig::RollingWindow {
            log_count,
            max_file_size,
        } => Box::new(RollingWindow::new(log_count, max_file_size)),
        PolicyConfig::UnboundedSession => Box::new(UnboundedSession),
    }
}

//! Rotating file writer
//!
//! Persists a drained batch to one file per calendar day. Each cycle:
//! group entries by the day of their timestamp, append every group to its
//! `{prefix}YYYYMMDD.txt` file, then prune files beyond the retention
//! limit. All I/O failures are isolated per file so one bad day-group
//! never blocks the others; only a directory-creation failure propagates,
//! because the caller can retain the batch and retry it next cycle.
//!
//! # File naming
//!
//! The date stamp is zero padded, so lexicographic name order equals
//! chronological order and retention can sort by name alone:
//!
//! ```text
//! logs/
//! ├── diagnostics-20260804.txt
//! ├── diagnostics-20260805.txt
//! └── diagnostics-20260806.txt
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use chrono::NaiveDate;

use crate::config::SinkOptions;
use crate::error::SinkError;
use crate::message::LogMessage;
use crate::metrics::SinkMetrics;

/// Initial capacity of the reused assembly buffer
const ASSEMBLY_BUFFER_CAPACITY: usize = 64 * 1024;

/// Capability the flush scheduler depends on
///
/// `Ok(true)` means at least one day-group was written this cycle, which
/// drives the scheduler's watchdog reset. An `Err` means the batch could
/// not be attempted at all and the caller must keep its contents for the
/// next cycle.
pub trait BatchWriter: Send {
    /// Persist one drained batch
    fn write_batch(&mut self, entries: &[LogMessage]) -> Result<bool, SinkError>;
}

/// Day-grouping append writer with size cap and retention pruning
pub struct RotatingFileWriter {
    directory: Option<PathBuf>,
    prefix: String,
    size_limit: Option<u64>,
    retain_limit: Option<usize>,
    enabled: Arc<AtomicBool>,
    metrics: Arc<SinkMetrics>,
    assembly: BytesMut,
    disabled_reported: bool,
}

impl RotatingFileWriter {
    /// Create a writer from validated options
    ///
    /// `enabled` is the sink's shared enabled flag; the writer flips it
    /// off when no directory is configured.
    pub fn new(options: &SinkOptions, enabled: Arc<AtomicBool>, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            directory: options.log_directory.clone(),
            prefix: options.file_name_prefix.clone(),
            size_limit: options.file_size_limit_bytes,
            retain_limit: options.retained_file_count_limit,
            enabled,
            metrics,
            assembly: BytesMut::with_capacity(ASSEMBLY_BUFFER_CAPACITY),
            disabled_reported: false,
        }
    }

    /// Target file for a calendar day: `{prefix}YYYYMMDD.txt`
    fn file_path(&self, directory: &Path, day: NaiveDate) -> PathBuf {
        directory.join(format!("{}{}.txt", self.prefix, day.format("%Y%m%d")))
    }

    /// Whether the day file is already over the configured size limit
    fn over_size_limit(&self, path: &Path) -> bool {
        let Some(limit) = self.size_limit else {
            return false;
        };
        match fs::metadata(path) {
            Ok(meta) => meta.len() > limit,
            Err(_) => false,
        }
    }

    /// Append one day-group to its file with a single buffered write
    fn append_group(&mut self, path: &Path, group: &[&LogMessage]) -> io::Result<u64> {
        self.assembly.clear();
        for message in group {
            self.assembly.extend_from_slice(message.text().as_bytes());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&self.assembly)?;
        file.flush()?;
        Ok(self.assembly.len() as u64)
    }

    /// Delete day files beyond the retention limit
    ///
    /// Lists files matching the prefix, sorts by name descending (newest
    /// first since the name embeds the date) and removes everything past
    /// the limit. Failures are logged per file and never fatal.
    fn prune(&self, directory: &Path) {
        let Some(limit) = self.retain_limit else {
            return;
        };

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::error!(
                    directory = %directory.display(),
                    %error,
                    "retention listing failed"
                );
                self.metrics.record_write_error();
                return;
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&self.prefix))
            .collect();

        names.sort_unstable_by(|a, b| b.cmp(a));

        for name in names.iter().skip(limit) {
            let path = directory.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    self.metrics.record_pruned();
                    tracing::debug!(file = %path.display(), "pruned retained file");
                }
                Err(error) => {
                    tracing::error!(file = %path.display(), %error, "retention delete failed");
                    self.metrics.record_write_error();
                }
            }
        }
    }
}

impl BatchWriter for RotatingFileWriter {
    fn write_batch(&mut self, entries: &[LogMessage]) -> Result<bool, SinkError> {
        let Some(directory) = self.directory.clone() else {
            // Configuration error path, reported once; the sink stops
            // accepting messages instead of crashing the host.
            self.enabled.store(false, Ordering::Release);
            if !self.disabled_reported {
                self.disabled_reported = true;
                tracing::warn!("no log directory configured, file sink disabled");
            }
            return Ok(false);
        };

        fs::create_dir_all(&directory).map_err(|source| SinkError::DirectoryCreate {
            path: directory.clone(),
            source,
        })?;

        let mut wrote = false;
        for (day, group) in group_by_day(entries) {
            let path = self.file_path(&directory, day);

            if self.over_size_limit(&path) {
                tracing::warn!(
                    file = %path.display(),
                    messages = group.len(),
                    "day file over size limit, skipping group"
                );
                continue;
            }

            match self.append_group(&path, &group) {
                Ok(bytes) => {
                    wrote = true;
                    self.metrics.record_written(group.len() as u64, bytes);
                }
                Err(error) => {
                    tracing::error!(file = %path.display(), %error, "append failed");
                    self.metrics.record_write_error();
                }
            }
        }

        self.prune(&directory);
        Ok(wrote)
    }
}

/// Group entries by calendar day, preserving enqueue order within each
/// group and first-appearance order across groups
fn group_by_day(entries: &[LogMessage]) -> Vec<(NaiveDate, Vec<&LogMessage>)> {
    let mut groups: Vec<(NaiveDate, Vec<&LogMessage>)> = Vec::new();
    for message in entries {
        let day = message.day();
        match groups.iter_mut().find(|(existing, _)| *existing == day) {
            Some((_, group)) => group.push(message),
            None => groups.push((day, vec![message])),
        }
    }
    groups
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;

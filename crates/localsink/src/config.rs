//! Sink configuration
//!
//! `SinkOptions` is the resolved options snapshot the sink is constructed
//! from. It derives `Deserialize` so hosts can bind it from TOML/JSON
//! config sources, but the sink itself only ever sees the finished struct.
//!
//! # Example
//!
//! ```toml
//! log_directory = "logs"
//! file_name_prefix = "app-"
//! flush_period = "500ms"
//! background_queue_size = 10000
//! retained_file_count_limit = 14
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SinkError;

/// Options for the local-file sink
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkOptions {
    /// Target directory for day files
    /// Absent: the sink constructs permanently disabled
    pub log_directory: Option<PathBuf>,

    /// File name prefix before the date stamp
    /// Default: "diagnostics-"
    pub file_name_prefix: String,

    /// Maximum size of a day file in bytes, or None for no limit
    /// Once a file is over the limit, further writes to it are skipped
    pub file_size_limit_bytes: Option<u64>,

    /// Maximum number of day files kept on disk, or None for no limit
    /// Oldest files (by name, which embeds the date) are deleted first
    /// Default: 31
    pub retained_file_count_limit: Option<usize>,

    /// Sleep interval of the flush scheduler, in both active and backoff
    /// modes; must be greater than zero
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub flush_period: Duration,

    /// Maximum number of queued messages, or None for no limit
    /// Messages arriving at a full queue are dropped and counted
    pub background_queue_size: Option<usize>,

    /// Maximum number of messages drained per flush cycle, or None for
    /// no limit
    pub batch_size: Option<usize>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            log_directory: None,
            file_name_prefix: "diagnostics-".into(),
            file_size_limit_bytes: None,
            retained_file_count_limit: Some(31),
            flush_period: Duration::from_secs(1),
            background_queue_size: None,
            batch_size: None,
        }
    }
}

impl SinkOptions {
    /// Set the target directory
    #[must_use]
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(dir.into());
        self
    }

    /// Set the file name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_name_prefix = prefix.into();
        self
    }

    /// Set the flush period
    #[must_use]
    pub fn with_flush_period(mut self, period: Duration) -> Self {
        self.flush_period = period;
        self
    }

    /// Cap the queue size
    #[must_use]
    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.background_queue_size = Some(size);
        self
    }

    /// Cap the number of messages drained per cycle
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Validate the options
    ///
    /// A missing `log_directory` is not an error; the sink constructs
    /// disabled in that case. Everything else that is configured must be
    /// strictly positive.
    pub fn validate(&self) -> Result<(), SinkError> {
        if self.flush_period.is_zero() {
            return Err(SinkError::InvalidOption {
                field: "flush_period",
            });
        }
        if self.file_name_prefix.is_empty() {
            return Err(SinkError::EmptyFilePrefix);
        }
        if self.batch_size == Some(0) {
            return Err(SinkError::InvalidOption { field: "batch_size" });
        }
        if self.background_queue_size == Some(0) {
            return Err(SinkError::InvalidOption {
                field: "background_queue_size",
            });
        }
        if self.file_size_limit_bytes == Some(0) {
            return Err(SinkError::InvalidOption {
                field: "file_size_limit_bytes",
            });
        }
        if self.retained_file_count_limit == Some(0) {
            return Err(SinkError::InvalidOption {
                field: "retained_file_count_limit",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

//! Sink error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by sink construction and the write path
///
/// Configuration variants are fatal at construction time so that
/// misconfiguration surfaces at startup. I/O variants are only ever
/// observed inside the flush cycle, where they are logged and isolated;
/// the single exception is `DirectoryCreate`, which the writer returns to
/// its caller so the drained batch can be retained and retried on the
/// next cycle.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An option that must be strictly positive was zero
    #[error("{field} must be greater than zero")]
    InvalidOption {
        /// Name of the offending option
        field: &'static str,
    },

    /// The file name prefix was empty
    #[error("file_name_prefix must not be empty")]
    EmptyFilePrefix,

    /// Failed to create the log directory
    #[error("failed to create log directory '{path}': {source}")]
    DirectoryCreate {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

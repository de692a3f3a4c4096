//! Drained-message batch

use crate::message::LogMessage;

/// Initial capacity of the pooled batch
const DEFAULT_BATCH_CAPACITY: usize = 1024;

/// An ordered sequence of messages pulled from the queue
///
/// One instance lives inside the flush core and is reused across drain
/// cycles, so steady-state draining does not allocate. It is cleared
/// after a completed write; on a retryable write failure it keeps its
/// contents so the next cycle can retry them.
#[derive(Debug)]
pub struct Batch {
    entries: Vec<LogMessage>,
}

impl Batch {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(DEFAULT_BATCH_CAPACITY),
        }
    }

    #[inline]
    pub fn push(&mut self, message: LogMessage) {
        self.entries.push(message);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The drained messages, in enqueue order
    #[inline]
    pub fn entries(&self) -> &[LogMessage] {
        &self.entries
    }

    /// Clear the batch, keeping its allocation for reuse
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

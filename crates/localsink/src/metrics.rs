//! Sink metrics
//!
//! Atomic counters updated from the producer and consumer paths, with a
//! point-in-time `snapshot()` for reporting and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single sink instance
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Messages accepted into the queue
    pub messages_enqueued: AtomicU64,

    /// Messages rejected because the queue was full
    pub messages_dropped: AtomicU64,

    /// Messages appended to day files
    pub messages_written: AtomicU64,

    /// Bytes appended to day files
    pub bytes_written: AtomicU64,

    /// Write or prune failures (isolated, never fatal)
    pub write_errors: AtomicU64,

    /// Day files deleted by retention pruning
    pub files_pruned: AtomicU64,

    /// Drain cycles that wrote at least one group
    pub flush_cycles: AtomicU64,

    /// Drain cycles that found nothing to write
    pub empty_cycles: AtomicU64,

    /// Times the scheduler parked on the wake signal
    pub blocked_waits: AtomicU64,
}

impl SinkMetrics {
    /// Create a new metrics instance
    pub const fn new() -> Self {
        Self {
            messages_enqueued: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            messages_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            files_pruned: AtomicU64::new(0),
            flush_cycles: AtomicU64::new(0),
            empty_cycles: AtomicU64::new(0),
            blocked_waits: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_enqueued(&self) {
        self.messages_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully written day group
    #[inline]
    pub fn record_written(&self, messages: u64, bytes: u64) {
        self.messages_written.fetch_add(messages, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pruned(&self) {
        self.files_pruned.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush_cycle(&self) {
        self.flush_cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_empty_cycle(&self) {
        self.empty_cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_blocked_wait(&self) {
        self.blocked_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_enqueued: self.messages_enqueued.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_written: self.messages_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            files_pruned: self.files_pruned.load(Ordering::Relaxed),
            flush_cycles: self.flush_cycles.load(Ordering::Relaxed),
            empty_cycles: self.empty_cycles.load(Ordering::Relaxed),
            blocked_waits: self.blocked_waits.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub messages_enqueued: u64,
    pub messages_dropped: u64,
    pub messages_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub files_pruned: u64,
    pub flush_cycles: u64,
    pub empty_cycles: u64,
    pub blocked_waits: u64,
}

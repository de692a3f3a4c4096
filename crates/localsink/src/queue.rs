//! Bounded multi-producer message queue
//!
//! The producer-facing hot path of the sink. `try_enqueue` is lock-free,
//! O(1) and never blocks: when the queue is at capacity or closed the
//! message is rejected and the caller records the drop. The single
//! consumer drains in FIFO order and reads the drop counter with
//! reset-and-read semantics, once per drain cycle.
//!
//! ```text
//! [producer] --try_enqueue--> [SegQueue] --drain_into--> [Batch]
//!                  |                            ^
//!                  +--wake signal--> [scheduler blocked wait]
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;
use tokio::sync::Notify;

use crate::batch::Batch;
use crate::message::LogMessage;

/// Bounded FIFO buffer between producers and the flush scheduler
///
/// Capacity is enforced with an atomic length guard over a lock-free
/// queue; `None` means unbounded. The overflow policy is drop-newest:
/// an arriving message is rejected rather than evicting accepted data,
/// so FIFO order of everything already in the queue is preserved.
pub struct MessageQueue {
    inner: SegQueue<LogMessage>,
    capacity: Option<usize>,
    len: AtomicUsize,
    closed: AtomicBool,
    dropped: AtomicU64,
    wake: Notify,
}

impl MessageQueue {
    /// Create a queue with the given capacity (`None` = unbounded)
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: SegQueue::new(),
            capacity,
            len: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            wake: Notify::new(),
        }
    }

    /// Attempt a non-blocking insert
    ///
    /// Returns `false` when the queue is at capacity or closed; the
    /// caller is responsible for recording the drop. On success the wake
    /// signal is raised so an idle scheduler resumes draining.
    pub fn try_enqueue(&self, message: LogMessage) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }

        if let Some(capacity) = self.capacity {
            // Reserve a slot before pushing; back out on overflow.
            let previous = self.len.fetch_add(1, Ordering::AcqRel);
            if previous >= capacity {
                self.len.fetch_sub(1, Ordering::AcqRel);
                return false;
            }
        } else {
            self.len.fetch_add(1, Ordering::Relaxed);
        }

        self.inner.push(message);
        self.wake.notify_one();
        true
    }

    /// Remove up to `max` messages in FIFO order into `batch`
    ///
    /// Returns the number of messages moved. Never blocks; returns fewer
    /// than requested if the queue empties first.
    pub fn drain_into(&self, batch: &mut Batch, max: Option<usize>) -> usize {
        let mut moved = 0;
        let limit = max.unwrap_or(usize::MAX);

        while moved < limit {
            match self.inner.pop() {
                Some(message) => {
                    self.len.fetch_sub(1, Ordering::AcqRel);
                    batch.push(message);
                    moved += 1;
                }
                None => break,
            }
        }

        moved
    }

    /// Record one rejected message
    #[inline]
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and reset the drop counter
    ///
    /// Called exactly once per drain cycle; a non-zero result becomes a
    /// synthetic drop-notice line in that cycle's batch.
    #[inline]
    pub fn take_dropped(&self) -> u64 {
        self.dropped.swap(0, Ordering::AcqRel)
    }

    /// Close the queue for writing
    ///
    /// Further `try_enqueue` calls fail; pending messages remain
    /// drainable. Also raises the wake signal so a parked consumer can
    /// observe the state change.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether the queue has been closed for writing
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Current number of queued messages
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether the queue is currently empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until the wake signal is raised
    ///
    /// Used by the scheduler's blocked-wait state. A permit stored by an
    /// earlier `try_enqueue` completes the wait immediately, so a message
    /// enqueued between the empty drain and this call is never missed.
    pub async fn wait_for_message(&self) {
        self.wake.notified().await;
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;

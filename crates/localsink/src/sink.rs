//! Sink composition and lifecycle
//!
//! `LocalFileSink` owns the queue, the flush scheduler task and the
//! writer. `enqueue` is the only operation intended for arbitrary
//! concurrent producers; the lifecycle operations are safe to call
//! concurrently but serialized behind a lifecycle lock.
//!
//! # Architecture
//!
//! ```text
//! [producers] --enqueue--> [MessageQueue] --drain--> [flush core]
//!                                ^                       |
//!                          wake signal          [RotatingFileWriter]
//!                                ^                       |
//!                        [scheduler task] <---- day files on disk
//! ```
//!
//! The flush core (pooled batch + writer) is guarded by a single mutex,
//! so at most one drain executes at a time whether it was triggered by
//! the scheduler, `flush_now` or `stop`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::config::SinkOptions;
use crate::error::SinkError;
use crate::message::LogMessage;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::queue::MessageQueue;
use crate::scheduler;
use crate::writer::{BatchWriter, RotatingFileWriter};

/// State mutated only while holding the flush mutex
struct FlushCore {
    /// Pooled batch, reused across drain cycles. Cleared after a
    /// completed write; kept intact when the writer asks for a retry.
    batch: Batch,
    writer: Box<dyn BatchWriter>,
}

/// State shared between the sink handle and the scheduler task
pub(crate) struct Shared {
    pub(crate) options: SinkOptions,

    /// Active queue; recreated on every `start`, absent while stopped
    pub(crate) queue: ArcSwapOption<MessageQueue>,

    flush_core: parking_lot::Mutex<FlushCore>,

    /// False when the directory is misconfigured or the sink was
    /// disabled at runtime; producers check it before queueing
    pub(crate) enabled: Arc<AtomicBool>,

    pub(crate) metrics: Arc<SinkMetrics>,
}

impl Shared {
    /// Run one complete drain cycle: pull up to `batch_size` messages,
    /// append the drop notice, hand the batch to the writer
    ///
    /// Returns true when the writer persisted at least one day-group,
    /// which is what resets the scheduler's watchdog. The flush mutex
    /// makes this safe to call from the scheduler, `flush_now` and
    /// `stop` concurrently.
    pub(crate) fn flush_once(&self) -> bool {
        let Some(queue) = self.queue.load_full() else {
            return false;
        };

        let mut core = self.flush_core.lock();
        let core = &mut *core;

        // The batch may still hold entries retained from a failed cycle;
        // only top it up to the configured cap.
        let room = self
            .options
            .batch_size
            .map(|size| size.saturating_sub(core.batch.len()));
        if room != Some(0) {
            queue.drain_into(&mut core.batch, room);
        }

        let dropped = queue.take_dropped();
        if dropped > 0 {
            core.batch.push(LogMessage::new(
                Local::now(),
                format!(
                    "{dropped} message(s) dropped because of queue size limit. \
                     Increase the queue size or decrease logging verbosity to avoid this.\n"
                ),
            ));
        }

        if core.batch.is_empty() {
            self.metrics.record_empty_cycle();
            return false;
        }

        match core.writer.write_batch(core.batch.entries()) {
            Ok(wrote) => {
                core.batch.clear();
                if wrote {
                    self.metrics.record_flush_cycle();
                }
                wrote
            }
            Err(error) => {
                // Batch contents stay in the pool for the next cycle.
                tracing::error!(%error, "flush cycle failed, batch retained for retry");
                self.metrics.record_write_error();
                false
            }
        }
    }
}

/// Lifecycle state machine, guarded by the lifecycle lock
enum Lifecycle {
    Stopped,
    Running(Worker),
}

struct Worker {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Batching local-file log sink
///
/// Constructed once from a validated [`SinkOptions`] snapshot. `start`
/// creates the queue and spawns the scheduler; `stop` cancels it, waits
/// up to one flush period and performs a final synchronous flush.
/// Dropping the sink aborts a still-running scheduler.
pub struct LocalFileSink {
    shared: Arc<Shared>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
}

impl LocalFileSink {
    /// Create a sink writing through a [`RotatingFileWriter`]
    pub fn new(options: SinkOptions) -> Result<Self, SinkError> {
        options.validate()?;

        let metrics = Arc::new(SinkMetrics::new());
        let enabled = Arc::new(AtomicBool::new(options.log_directory.is_some()));
        let writer = RotatingFileWriter::new(&options, Arc::clone(&enabled), Arc::clone(&metrics));
        Self::with_writer(options, Box::new(writer), enabled, metrics)
    }

    /// Create a sink with a custom writer implementation
    ///
    /// The core only depends on the [`BatchWriter`] capability; this is
    /// the seam for alternative storage backends and for tests.
    pub fn with_writer(
        options: SinkOptions,
        writer: Box<dyn BatchWriter>,
        enabled: Arc<AtomicBool>,
        metrics: Arc<SinkMetrics>,
    ) -> Result<Self, SinkError> {
        options.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                options,
                queue: ArcSwapOption::empty(),
                flush_core: parking_lot::Mutex::new(FlushCore {
                    batch: Batch::new(),
                    writer,
                }),
                enabled,
                metrics,
            }),
            lifecycle: tokio::sync::Mutex::new(Lifecycle::Stopped),
        })
    }

    /// Queue one pre-rendered record
    ///
    /// Non-blocking and O(1) from any producer context. The message is
    /// silently counted and dropped when the queue is full, and ignored
    /// when the sink is stopped or disabled.
    pub fn enqueue(&self, timestamp: DateTime<Local>, text: impl Into<String>) {
        if !self.is_enabled() {
            return;
        }
        let Some(queue) = self.shared.queue.load_full() else {
            return;
        };

        if queue.try_enqueue(LogMessage::new(timestamp, text)) {
            self.shared.metrics.record_enqueued();
        } else if !queue.is_closed() {
            queue.record_dropped();
            self.shared.metrics.record_dropped();
        }
    }

    /// Start the background scheduler
    ///
    /// Idempotent: a second `start` while running is a no-op. A fresh
    /// queue is created on every start.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if matches!(*lifecycle, Lifecycle::Running(_)) {
            return;
        }

        let queue = Arc::new(MessageQueue::new(self.shared.options.background_queue_size));
        self.shared.queue.store(Some(Arc::clone(&queue)));

        let token = CancellationToken::new();
        let task = tokio::spawn(scheduler::run(
            Arc::clone(&self.shared),
            queue,
            token.clone(),
        ));
        *lifecycle = Lifecycle::Running(Worker { token, task });

        tracing::info!(
            directory = ?self.shared.options.log_directory,
            "file sink started"
        );
    }

    /// Stop the background scheduler
    ///
    /// Idempotent. Cancels the scheduler, closes the queue, waits up to
    /// one flush period for the in-flight cycle, then runs one final
    /// synchronous flush. Messages still queued above the batch cap are
    /// discarded with the queue.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Lifecycle::Running(worker) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
        else {
            return;
        };

        worker.token.cancel();
        if let Some(queue) = self.shared.queue.load_full() {
            queue.close();
        }

        match tokio::time::timeout(self.shared.options.flush_period, worker.task).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::warn!(%error, "flush scheduler task failed"),
            Err(_) => tracing::warn!("flush scheduler did not stop within one flush period"),
        }

        // Final best-effort flush of whatever is still queued.
        self.shared.flush_once();
        self.shared.queue.store(None);

        tracing::info!("file sink stopped");
    }

    /// Synchronously drain and write whatever is queued right now
    ///
    /// Goes through the same flush mutex as the scheduler, so it is safe
    /// at any time; returns true when data was written.
    pub fn flush_now(&self) -> bool {
        self.shared.flush_once()
    }

    /// Whether the sink currently accepts messages
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Runtime enabled toggle, as driven by a host configuration change
    ///
    /// Flipping to disabled stops the scheduler after a final flush;
    /// flipping back to enabled restarts with a fresh queue. Enabling is
    /// refused while no log directory is configured.
    pub async fn set_enabled(&self, enabled: bool) {
        if enabled {
            if self.shared.options.log_directory.is_none() {
                return;
            }
            self.shared.enabled.store(true, Ordering::Release);
            self.start().await;
        } else {
            self.shared.enabled.store(false, Ordering::Release);
            self.stop().await;
        }
    }

    /// Snapshot of the sink's counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl Drop for LocalFileSink {
    fn drop(&mut self) {
        // Dispose semantics: best effort, without an async context.
        if let Ok(mut lifecycle) = self.lifecycle.try_lock() {
            if let Lifecycle::Running(worker) =
                std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
            {
                worker.token.cancel();
                worker.task.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;

//! localsink - batching local-file log sink
//!
//! Accepts a concurrent stream of already-rendered log records and
//! persists them to rotating files on disk, batching writes for
//! throughput while bounding memory and shedding load under overload.
//! A logging call must never stall application code: enqueueing is
//! lock-free and non-blocking, and a slow or unavailable filesystem is
//! only ever observed by the single background flush task.
//!
//! # Architecture
//!
//! ```text
//! [producers] --enqueue--> [MessageQueue] --drain--> [Batch]
//!                                                       |
//!                       [FlushScheduler] --write--> [RotatingFileWriter]
//!                                                       |
//!                                         {prefix}YYYYMMDD.txt files
//! ```
//!
//! - **MessageQueue** - bounded MPSC buffer; overflow drops the newest
//!   message, counts it, and surfaces the count as a synthetic log line
//!   in the next batch.
//! - **FlushScheduler** - drains eagerly under load, polls through a
//!   short watchdog window for bursty traffic, then parks on a wake
//!   signal so an idle sink costs no CPU.
//! - **RotatingFileWriter** - groups each batch by calendar day, appends
//!   per-day files, enforces an optional size cap and prunes files
//!   beyond the retention limit.
//!
//! # Example
//!
//! ```ignore
//! use localsink::{LocalFileSink, SinkOptions};
//! use std::time::Duration;
//!
//! let sink = LocalFileSink::new(
//!     SinkOptions::default()
//!         .with_directory("logs")
//!         .with_prefix("app-")
//!         .with_flush_period(Duration::from_millis(500))
//!         .with_queue_size(10_000),
//! )?;
//! sink.start().await;
//!
//! // From any thread or task, without ever blocking:
//! sink.enqueue(chrono::Local::now(), "2026-08-06 10:00:00.000 +00:00 [Information] app: hello\n");
//!
//! sink.stop().await;
//! # Ok::<(), localsink::SinkError>(())
//! ```

/// Sink configuration options
pub mod config;

/// Error types
pub mod error;

/// Log message value type
pub mod message;

/// Atomic sink metrics
pub mod metrics;

/// Bounded multi-producer message queue
pub mod queue;

/// Drained-message batch
pub mod batch;

/// Plain text and JSON record renderers
pub mod record;

/// Rotating day-file writer
pub mod writer;

/// Sink composition and lifecycle
pub mod sink;

mod scheduler;

pub use batch::Batch;
pub use config::SinkOptions;
pub use error::SinkError;
pub use message::LogMessage;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use queue::MessageQueue;
pub use record::{render_json, render_plain, Level, RenderOptions};
pub use sink::LocalFileSink;
pub use writer::{BatchWriter, RotatingFileWriter};

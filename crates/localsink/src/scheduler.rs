//! Adaptive flush scheduler
//!
//! The single consumer loop of the sink. Drains eagerly while messages
//! keep arriving, polls for a bounded number of empty cycles to absorb
//! bursty traffic, then parks on the queue's wake signal so a fully idle
//! sink costs no CPU at all.
//!
//! ```text
//! wrote data ──> watchdog = 10, sleep(flush_period), drain again
//! empty cycle ─> watchdog -= 1
//!                 watchdog > 0: sleep(flush_period), poll again
//!                 watchdog = 0: block on wake signal (zero polling)
//! ```
//!
//! Cancellation exits after the current cycle completes, never in the
//! middle of one; the final flush on shutdown is driven by `stop`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::queue::MessageQueue;
use crate::sink::Shared;

/// Empty cycles tolerated before the scheduler stops polling and blocks
/// on the wake signal
pub(crate) const WATCHDOG_RESET: i64 = 10;

/// Consumer loop, one task per started sink
///
/// The watchdog starts at its reset value, so a freshly started sink
/// polls through one full watchdog window before parking.
pub(crate) async fn run(shared: Arc<Shared>, queue: Arc<MessageQueue>, token: CancellationToken) {
    let flush_period = shared.options.flush_period;
    let mut watchdog: i64 = WATCHDOG_RESET;

    loop {
        if token.is_cancelled() {
            break;
        }

        let wrote = shared.flush_once();

        if wrote {
            watchdog = WATCHDOG_RESET;
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(flush_period) => {}
            }
        } else {
            if watchdog >= 0 {
                watchdog -= 1;
            }
            if watchdog > 0 {
                // Bursty traffic: keep polling for a while.
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(flush_period) => {}
                }
            } else {
                // Long idle: wait for a producer, no polling.
                shared.metrics.record_blocked_wait();
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = queue.wait_for_message() => {}
                }
            }
        }
    }

    tracing::debug!("flush scheduler exited");
}

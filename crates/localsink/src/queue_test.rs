//! Tests for the message queue

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::batch::Batch;
use crate::message::LogMessage;
use crate::queue::MessageQueue;

fn msg(text: &str) -> LogMessage {
    LogMessage::new(Local::now(), text)
}

// ============================================================================
// Enqueue / drain
// ============================================================================

#[test]
fn test_drain_preserves_fifo_order() {
    let queue = MessageQueue::new(None);
    for i in 0..10 {
        assert!(queue.try_enqueue(msg(&format!("line {i}"))));
    }

    let mut batch = Batch::new();
    let moved = queue.drain_into(&mut batch, None);

    assert_eq!(moved, 10);
    for (i, entry) in batch.entries().iter().enumerate() {
        assert_eq!(entry.text(), format!("line {i}"));
    }
}

#[test]
fn test_drain_respects_max() {
    let queue = MessageQueue::new(None);
    for i in 0..10 {
        queue.try_enqueue(msg(&format!("line {i}")));
    }

    let mut batch = Batch::new();
    assert_eq!(queue.drain_into(&mut batch, Some(3)), 3);
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.entries()[0].text(), "line 0");
    assert_eq!(queue.len(), 7);

    // The rest is still there, in order.
    assert_eq!(queue.drain_into(&mut batch, None), 7);
    assert_eq!(batch.entries()[3].text(), "line 3");
}

#[test]
fn test_drain_returns_fewer_when_queue_empties() {
    let queue = MessageQueue::new(None);
    queue.try_enqueue(msg("only"));

    let mut batch = Batch::new();
    assert_eq!(queue.drain_into(&mut batch, Some(100)), 1);
    assert_eq!(queue.drain_into(&mut batch, Some(100)), 0);
}

// ============================================================================
// Capacity and drop accounting
// ============================================================================

#[test]
fn test_capacity_rejects_overflow() {
    let queue = MessageQueue::new(Some(3));

    assert!(queue.try_enqueue(msg("a")));
    assert!(queue.try_enqueue(msg("b")));
    assert!(queue.try_enqueue(msg("c")));
    assert!(!queue.try_enqueue(msg("d")));
    assert!(!queue.try_enqueue(msg("e")));

    // Accepted messages are untouched by the rejections.
    let mut batch = Batch::new();
    assert_eq!(queue.drain_into(&mut batch, None), 3);
    assert_eq!(batch.entries()[0].text(), "a");
    assert_eq!(batch.entries()[2].text(), "c");
}

#[test]
fn test_capacity_frees_up_after_drain() {
    let queue = MessageQueue::new(Some(2));
    assert!(queue.try_enqueue(msg("a")));
    assert!(queue.try_enqueue(msg("b")));
    assert!(!queue.try_enqueue(msg("c")));

    let mut batch = Batch::new();
    queue.drain_into(&mut batch, None);

    assert!(queue.try_enqueue(msg("d")));
}

#[test]
fn test_take_dropped_resets() {
    let queue = MessageQueue::new(Some(1));
    queue.record_dropped();
    queue.record_dropped();

    assert_eq!(queue.take_dropped(), 2);
    assert_eq!(queue.take_dropped(), 0);
}

// ============================================================================
// Close semantics
// ============================================================================

#[test]
fn test_close_rejects_new_messages() {
    let queue = MessageQueue::new(None);
    queue.try_enqueue(msg("before"));
    queue.close();

    assert!(queue.is_closed());
    assert!(!queue.try_enqueue(msg("after")));

    // Pending messages remain drainable.
    let mut batch = Batch::new();
    assert_eq!(queue.drain_into(&mut batch, None), 1);
    assert_eq!(batch.entries()[0].text(), "before");
}

// ============================================================================
// Wake signal
// ============================================================================

#[tokio::test]
async fn test_wake_permit_stored_by_enqueue() {
    let queue = MessageQueue::new(None);
    queue.try_enqueue(msg("a"));

    // The permit was stored before we started waiting.
    tokio::time::timeout(Duration::from_millis(100), queue.wait_for_message())
        .await
        .expect("wake permit should complete the wait immediately");
}

#[tokio::test]
async fn test_wake_signal_wakes_parked_waiter() {
    let queue = Arc::new(MessageQueue::new(None));

    let waiter = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.wait_for_message().await })
    };

    // Let the waiter park before enqueueing.
    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.try_enqueue(msg("wake up"));

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should wake after enqueue")
        .unwrap();
}

// ============================================================================
// Concurrent producers
// ============================================================================

#[test]
fn test_concurrent_producers_bounded() {
    let queue = Arc::new(MessageQueue::new(Some(100)));
    let mut handles = Vec::new();

    for t in 0..4 {
        let queue = Arc::clone(&queue);
        handles.push(std::thread::spawn(move || {
            let mut accepted = 0u64;
            for i in 0..1000 {
                if queue.try_enqueue(msg(&format!("t{t} m{i}"))) {
                    accepted += 1;
                }
            }
            accepted
        }));
    }

    let accepted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // Exactly the capacity was accepted, everything else rejected.
    assert_eq!(accepted, 100);
    assert_eq!(queue.len(), 100);
}

//! End-to-end pipeline: synthetic source -> capture thread -> queue ->
//! drain -> snapshot persistence.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pollencam::capture::TestPatternSource;
use pollencam::pipeline::{spawn_capture, FrameQueue};
use pollencam::session::SessionController;

#[test]
fn frames_flow_from_source_to_snapshot() {
    let queue = Arc::new(FrameQueue::bounded(8));
    let capture = spawn_capture(
        Box::new(TestPatternSource::new(64, 48)),
        Arc::clone(&queue),
        Duration::ZERO,
    )
    .unwrap();

    let mut frames = Vec::new();
    for _ in 0..200 {
        frames.extend(queue.drain());
        if frames.len() >= 3 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    capture.shutdown();

    assert!(frames.len() >= 3, "capture thread produced no frames");
    assert!(
        frames.windows(2).all(|w| w[0].meta.sequence < w[1].meta.sequence),
        "frames arrived out of order"
    );

    let root = tempfile::tempdir().unwrap();
    let mut session = SessionController::create(root.path()).unwrap();

    // nothing displayed yet, nothing to persist
    assert!(session.take_snapshot().unwrap().is_none());

    session.observe_frame(frames.pop().unwrap());
    let path = session.take_snapshot().unwrap().expect("snapshot path");
    assert!(path.ends_with("p0_0.jpg"));
    assert!(path.is_file());
}

#[test]
fn queue_overflow_preserves_capture_cadence() {
    // a consumer that never drains must not block the producer
    let queue = Arc::new(FrameQueue::bounded(4));
    let capture = spawn_capture(
        Box::new(TestPatternSource::new(16, 16)),
        Arc::clone(&queue),
        Duration::ZERO,
    )
    .unwrap();

    for _ in 0..100 {
        if queue.dropped() > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    capture.shutdown();

    assert!(queue.dropped() > 0, "producer never overflowed the queue");
    assert!(queue.len() <= 4);
}

//! Bounded frame hand-off between the capture thread and the UI thread

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;
use flume::TrySendError;

use crate::capture::Frame;

/// Fixed-capacity FIFO of frames.
///
/// The producer never blocks: a push against a full queue discards the new
/// frame, keeping capture timing intact at the cost of preview continuity.
/// The consumer drains whatever is buffered without waiting.
pub struct FrameQueue {
    tx: flume::Sender<Frame>,
    rx: flume::Receiver<Frame>,
    capacity: usize,
    dropped: CachePadded<AtomicU64>,
}

impl FrameQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = flume::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            dropped: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Producer side. Returns false when the frame was dropped because the
    /// queue is at capacity.
    pub fn push(&self, frame: Frame) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Consumer side. Empties the queue, returning the buffered frames in
    /// FIFO order; empty when nothing is queued.
    pub fn drain(&self) -> Vec<Frame> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames discarded by `push` so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{FrameMetadata, PixelFormat};
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(sequence: u64) -> Frame {
        Frame {
            data: Bytes::from(vec![0u8; 2 * 2 * 3]),
            meta: Arc::new(FrameMetadata {
                sequence,
                width: 2,
                height: 2,
                format: PixelFormat::Bgr24,
            }),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn drain_on_empty_queue_returns_nothing() {
        let queue = FrameQueue::bounded(4);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn overflow_drops_new_frames_and_keeps_fifo_order() {
        let queue = FrameQueue::bounded(4);

        for seq in 1..=10 {
            queue.push(frame(seq));
            assert!(queue.len() <= 4);
        }

        let drained = queue.drain();
        let sequences: Vec<u64> = drained.iter().map(|f| f.meta.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
        assert_eq!(queue.dropped(), 6);
    }

    #[test]
    fn drain_makes_room_for_new_frames() {
        let queue = FrameQueue::bounded(2);
        queue.push(frame(1));
        queue.push(frame(2));
        assert!(!queue.push(frame(3)));

        queue.drain();
        assert!(queue.push(frame(4)));
        assert_eq!(queue.drain()[0].meta.sequence, 4);
    }
}

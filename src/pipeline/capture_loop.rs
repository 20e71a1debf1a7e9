//! Dedicated capture thread feeding the frame queue

use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::capture::{CaptureError, FrameSource};
use crate::pipeline::queue::FrameQueue;

/// Handle to the running capture thread, for the shutdown path.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Signals the thread to stop and waits for it to finish its current
    /// acquisition.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawns the capture thread: start the source, wait out the warm-up delay,
/// then acquire frames until told to stop. Acquisition errors are fatal to
/// the whole process.
pub fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    queue: Arc<FrameQueue>,
    warmup: Duration,
) -> io::Result<CaptureHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let thread = thread::Builder::new()
        .name("capture".into())
        .spawn(move || {
            if let Err(err) = run(source.as_mut(), &queue, warmup, &flag) {
                error!(error = %err, "frame acquisition failed");
                process::exit(1);
            }
            debug!("capture thread stopped");
        })?;

    Ok(CaptureHandle {
        stop,
        thread: Some(thread),
    })
}

fn run(
    source: &mut dyn FrameSource,
    queue: &FrameQueue,
    warmup: Duration,
    stop: &AtomicBool,
) -> Result<(), CaptureError> {
    source.start()?;
    thread::sleep(warmup);
    info!("capture loop running");

    while !stop.load(Ordering::Acquire) {
        let frame = source.capture()?;
        // drop-on-full, deliberately unreported per event
        queue.push(frame);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::TestPatternSource;

    #[test]
    fn capture_thread_fills_queue_and_joins() {
        let queue = Arc::new(FrameQueue::bounded(16));
        let handle = spawn_capture(
            Box::new(TestPatternSource::new(8, 8)),
            Arc::clone(&queue),
            Duration::ZERO,
        )
        .unwrap();

        let mut frames = Vec::new();
        for _ in 0..100 {
            frames.extend(queue.drain());
            if frames.len() >= 2 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        handle.shutdown();

        assert!(frames.len() >= 2);
        assert!(frames.windows(2).all(|w| w[0].meta.sequence < w[1].meta.sequence));
    }
}

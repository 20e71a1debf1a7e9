//! Frame acquisition seam between the pipeline and the physical camera.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::capture::frame::{Frame, FrameMetadata, PixelFormat};

/// Errors raised while opening, configuring, or reading the camera.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture device {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("device does not support video capture")]
    NotACaptureDevice,
    #[error("no suitable capture device found")]
    NoDevice,
    #[error("failed to configure capture device: {0}")]
    Configure(std::io::Error),
    #[error("capture stream not started")]
    StreamNotStarted,
    #[error("failed to acquire frame: {0}")]
    Acquire(std::io::Error),
    #[error("failed to decode frame: {0}")]
    Decode(String),
}

/// A continuous producer of frames.
///
/// Implementations own the device; the capture thread calls `start` once and
/// then blocks on `capture` for each successive frame.
pub trait FrameSource: Send {
    /// Starts the capture stream. Called on the capture thread before the
    /// first `capture`.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Blocks until the next frame is available.
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// Deterministic source producing synthetic BGR24 frames, for tests and for
/// exercising the pipeline without camera hardware.
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    sequence: u64,
    started: bool,
    frame_interval: Duration,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            started: false,
            frame_interval: Duration::from_millis(5),
        }
    }
}

impl FrameSource for TestPatternSource {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.started = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !self.started {
            return Err(CaptureError::StreamNotStarted);
        }
        // emulate the camera's frame interval
        thread::sleep(self.frame_interval);
        self.sequence += 1;

        let len = (self.width as usize) * (self.height as usize) * 3;
        let data: Vec<u8> = (0..len)
            .map(|i| ((i as u64 ^ self.sequence) % 256) as u8)
            .collect();

        Ok(Frame {
            data: data.into(),
            meta: Arc::new(FrameMetadata {
                sequence: self.sequence,
                width: self.width,
                height: self.height,
                format: PixelFormat::Bgr24,
            }),
            timestamp: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_before_start_fails() {
        let mut source = TestPatternSource::new(4, 4);
        assert!(matches!(
            source.capture(),
            Err(CaptureError::StreamNotStarted)
        ));
    }

    #[test]
    fn frames_are_sequenced_and_well_formed() {
        let mut source = TestPatternSource::new(4, 2);
        source.start().unwrap();

        let first = source.capture().unwrap();
        let second = source.capture().unwrap();

        assert_eq!(first.meta.sequence, 1);
        assert_eq!(second.meta.sequence, 2);
        assert!(first.is_valid());
        assert_eq!(first.meta.format, PixelFormat::Bgr24);
    }
}

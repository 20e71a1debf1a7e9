//! Live camera preview with per-sample snapshot capture.
//!
//! A dedicated thread pulls frames from the camera into a bounded queue; the
//! window drains the queue on a fixed tick, fits the newest frame to the
//! display area, and persists snapshots into a timestamped run directory.

pub mod capture;
pub mod display;
pub mod focus;
pub mod pipeline;
pub mod session;
pub mod utils;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::capture::frame::PixelFormat;
use crate::utils::FoundDevice;

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub capture: CaptureConfig,
    pub display: DisplayConfig,
    pub pipeline: PipelineConfig,
    pub session: SessionConfig,
    pub focus: FocusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Device to open; auto-detected when the path is empty.
    pub device: FoundDevice,
    pub width: u32,
    pub height: u32,
    pub buffer_count: u32,
    /// Manual exposure in 100 microsecond units; `None` leaves auto-exposure on.
    pub exposure: Option<i64>,
    /// Sensor settle time after the stream starts.
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Renderer tick period.
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
    /// Warm-up delay before the capture loop starts pulling frames.
    pub warmup_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where run directories are created.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    pub default_target: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                device: FoundDevice::new(String::new(), PixelFormat::Mjpeg),
                // full sensor mode of the microscope camera
                width: 1648,
                height: 1232,
                buffer_count: 4,
                exposure: None,
                settle_ms: 2000,
            },
            display: DisplayConfig {
                width: 1024,
                height: 768,
                tick_ms: 10,
            },
            pipeline: PipelineConfig {
                queue_capacity: 200,
                warmup_ms: 3000,
            },
            session: SessionConfig {
                root: PathBuf::from("."),
            },
            focus: FocusConfig {
                default_target: 350,
            },
        }
    }
}

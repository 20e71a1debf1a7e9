use serde::{Deserialize, Serialize};
use tracing::info;
use v4l::capability::Flags;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::capture::{CaptureError, PixelFormat};

// Detected capture device info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundDevice {
    pub path: String,
    pub format: PixelFormat,
}

impl FoundDevice {
    pub fn new(path: String, format: PixelFormat) -> Self {
        Self { path, format }
    }
}

/// Sweep /dev/video* for a usable capture device, preferring MJPEG over YUYV.
pub fn auto_detect_device() -> Result<FoundDevice, CaptureError> {
    info!("auto-detecting capture devices");

    for i in 0..10 {
        let path = format!("/dev/video{}", i);
        if !std::path::Path::new(&path).exists() {
            continue;
        }

        let Ok(dev) = Device::with_path(&path) else {
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            continue;
        }

        let Ok(formats) = dev.enum_formats() else {
            continue;
        };
        let mut fallback = None;
        for fmt in formats {
            if fmt.fourcc == FourCC::new(b"MJPG") {
                info!(%path, card = %caps.card, "found MJPEG device");
                return Ok(FoundDevice::new(path, PixelFormat::Mjpeg));
            }
            if fmt.fourcc == FourCC::new(b"YUYV") {
                fallback = Some(PixelFormat::Yuyv);
            }
        }
        if let Some(format) = fallback {
            info!(%path, card = %caps.card, "found YUYV device");
            return Ok(FoundDevice::new(path, format));
        }
    }

    Err(CaptureError::NoDevice)
}

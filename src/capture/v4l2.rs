//! V4L2 capture backend with memory-mapped streaming

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;
use v4l::buffer::Type;
use v4l::capability::Flags as CapFlags;
use v4l::control::{Control, Value};
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::capture::decoder;
use crate::capture::frame::{Frame, FrameMetadata, PixelFormat};
use crate::capture::source::{CaptureError, FrameSource};
use crate::CaptureConfig;

/// V4L2 control ids shared with the focus driver.
pub(crate) mod cid {
    pub const EXPOSURE_AUTO: u32 = 0x009a_0901;
    pub const EXPOSURE_ABSOLUTE: u32 = 0x009a_0902;
    pub const FOCUS_ABSOLUTE: u32 = 0x009a_090a;
    pub const GAIN: u32 = 0x0098_0913;
}

// V4L2_EXPOSURE_MANUAL
const EXPOSURE_MANUAL: i64 = 1;

/// Camera behind a V4L2 character device.
pub struct V4l2Camera {
    device: Device,
    stream: Option<MmapStream<'static>>,
    config: CaptureConfig,
    sequence: u64,
}

impl V4l2Camera {
    /// Opens the device and negotiates resolution, pixel format, and the
    /// optional manual exposure.
    pub fn new(config: CaptureConfig) -> Result<Self, CaptureError> {
        let device =
            Device::with_path(&config.device.path).map_err(|source| CaptureError::Open {
                path: config.device.path.clone(),
                source,
            })?;

        let caps = device.query_caps().map_err(CaptureError::Configure)?;
        info!(card = %caps.card, driver = %caps.driver, "capture device");

        if !caps.capabilities.contains(CapFlags::VIDEO_CAPTURE) {
            return Err(CaptureError::NotACaptureDevice);
        }

        let mut fmt = device.format().map_err(CaptureError::Configure)?;
        fmt.width = config.width;
        fmt.height = config.height;
        fmt.fourcc = match config.device.format {
            PixelFormat::Mjpeg => FourCC::new(b"MJPG"),
            PixelFormat::Yuyv => FourCC::new(b"YUYV"),
            PixelFormat::Rgb24 => FourCC::new(b"RGB3"),
            PixelFormat::Bgr24 => FourCC::new(b"BGR3"),
        };
        device.set_format(&fmt).map_err(CaptureError::Configure)?;

        if let Some(exposure) = config.exposure {
            // exposure in 100 microsecond units, auto-exposure off
            device
                .set_control(Control {
                    id: cid::EXPOSURE_AUTO,
                    value: Value::Integer(EXPOSURE_MANUAL),
                })
                .map_err(CaptureError::Configure)?;
            device
                .set_control(Control {
                    id: cid::EXPOSURE_ABSOLUTE,
                    value: Value::Integer(exposure),
                })
                .map_err(CaptureError::Configure)?;
            info!(exposure, "manual exposure set");
        }

        Ok(Self {
            device,
            stream: None,
            config,
            sequence: 0,
        })
    }
}

impl FrameSource for V4l2Camera {
    fn start(&mut self) -> Result<(), CaptureError> {
        let stream =
            MmapStream::with_buffers(&self.device, Type::VideoCapture, self.config.buffer_count)
                .map_err(CaptureError::Configure)?;
        self.stream = Some(stream);

        // let the sensor settle before the first acquisition
        thread::sleep(Duration::from_millis(self.config.settle_ms));

        info!(
            buffers = self.config.buffer_count,
            "capture stream started"
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let timestamp = Instant::now();

        let stream = self.stream.as_mut().ok_or(CaptureError::StreamNotStarted)?;
        let (buf, _meta) = stream.next().map_err(CaptureError::Acquire)?;

        let decoded = decoder::decode_to_bgr(
            buf,
            self.config.width,
            self.config.height,
            self.config.device.format,
        )?;

        self.sequence += 1;
        Ok(Frame {
            data: decoded.data.into(),
            meta: Arc::new(FrameMetadata {
                sequence: self.sequence,
                width: decoded.width,
                height: decoded.height,
                format: PixelFormat::Bgr24,
            }),
            timestamp,
        })
    }
}

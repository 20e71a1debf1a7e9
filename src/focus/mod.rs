//! Motorized-focus capability
//!
//! One hardware variant carries a focus motor; the driver seam keeps the
//! rest of the program unaware of which variant it is running on. The motor
//! target range matches the absolute-focus control exposed by the camera.

use std::io;

use thiserror::Error;
use tracing::debug;
use v4l::control::{Control, Value};
use v4l::Device;

use crate::capture::v4l2::cid;

pub const FOCUS_MIN: u16 = 0;
pub const FOCUS_MAX: u16 = 1023;
pub const FOCUS_STEP: u16 = 10;

#[derive(Debug, Error)]
pub enum FocusError {
    #[error("failed to open focus device {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("focus driver used before init")]
    NotInitialized,
    #[error("failed to write focus target: {0}")]
    Write(io::Error),
}

/// Narrow seam over the focus motor: initialize once, then forward integer
/// targets in [0, 1023] verbatim.
pub trait FocusDriver {
    fn init(&mut self) -> Result<(), FocusError>;
    fn write(&mut self, target: u16) -> Result<(), FocusError>;
}

/// Focus motor behind the camera's absolute-focus V4L2 control.
pub struct V4l2FocusDriver {
    device: Device,
    initialized: bool,
}

impl V4l2FocusDriver {
    /// Probes `path` for an absolute-focus control. `Ok(None)` means the
    /// device has no focus motor, i.e. the plain-camera variant.
    pub fn detect(path: &str) -> Result<Option<Self>, FocusError> {
        let device = Device::with_path(path).map_err(|source| FocusError::Open {
            path: path.to_string(),
            source,
        })?;
        match device.control(cid::FOCUS_ABSOLUTE) {
            Ok(_) => Ok(Some(Self {
                device,
                initialized: false,
            })),
            Err(_) => Ok(None),
        }
    }

    // Diagnostic print accompanying every focus move
    fn log_exposure_state(&self) {
        for (name, id) in [
            ("exposure_auto", cid::EXPOSURE_AUTO),
            ("exposure_absolute", cid::EXPOSURE_ABSOLUTE),
            ("gain", cid::GAIN),
        ] {
            if let Ok(ctrl) = self.device.control(id) {
                if let Value::Integer(value) = ctrl.value {
                    debug!(control = name, value, "camera exposure state");
                }
            }
        }
    }
}

impl FocusDriver for V4l2FocusDriver {
    fn init(&mut self) -> Result<(), FocusError> {
        self.initialized = true;
        Ok(())
    }

    fn write(&mut self, target: u16) -> Result<(), FocusError> {
        if !self.initialized {
            return Err(FocusError::NotInitialized);
        }
        self.device
            .set_control(Control {
                id: cid::FOCUS_ABSOLUTE,
                value: Value::Integer(target as i64),
            })
            .map_err(FocusError::Write)?;
        debug!(focus = target, "focus target written");
        self.log_exposure_state();
        Ok(())
    }
}

/// Driver that records every write instead of moving hardware, for tests.
#[derive(Debug, Default)]
pub struct RecordingFocusDriver {
    pub initialized: bool,
    pub writes: Vec<u16>,
}

impl FocusDriver for RecordingFocusDriver {
    fn init(&mut self) -> Result<(), FocusError> {
        self.initialized = true;
        Ok(())
    }

    fn write(&mut self, target: u16) -> Result<(), FocusError> {
        if !self.initialized {
            return Err(FocusError::NotInitialized);
        }
        self.writes.push(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_before_init_is_refused() {
        let mut driver = RecordingFocusDriver::default();
        assert!(matches!(driver.write(350), Err(FocusError::NotInitialized)));
        assert!(driver.writes.is_empty());
    }

    #[test]
    fn targets_are_forwarded_verbatim() {
        let mut driver = RecordingFocusDriver::default();
        driver.init().unwrap();
        driver.write(350).unwrap();
        driver.write(FOCUS_MAX).unwrap();
        driver.write(FOCUS_MIN).unwrap();
        assert_eq!(driver.writes, vec![350, 1023, 0]);
    }
}

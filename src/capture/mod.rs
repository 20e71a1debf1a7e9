pub mod decoder;
pub mod frame;
pub mod source;
pub mod v4l2;

pub use frame::{Frame, FrameMetadata, PixelFormat};
pub use source::{CaptureError, FrameSource, TestPatternSource};
pub use v4l2::V4l2Camera;

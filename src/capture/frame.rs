use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// One captured image, shareable across threads without copying the pixels
#[derive(Clone)]
pub struct Frame {
    /// Immutable pixel data in `meta.format` channel order
    pub data: Bytes,

    /// Frame metadata
    pub meta: Arc<FrameMetadata>,

    /// Acquisition timestamp
    pub timestamp: Instant,
}

/// Frame metadata
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Pixel formats we support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Bgr24,
    Rgb24,
    Yuyv,
    Mjpeg,
}

impl PixelFormat {
    /// Bytes per pixel for fixed-stride formats; `None` for compressed ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Bgr24 | PixelFormat::Rgb24 => Some(3),
            PixelFormat::Yuyv => Some(2),
            PixelFormat::Mjpeg => None,
        }
    }
}

impl Frame {
    /// Checks that the pixel buffer matches the dimensions in the metadata.
    /// Always true for compressed payloads, whose size is data-dependent.
    pub fn is_valid(&self) -> bool {
        match self.meta.format.bytes_per_pixel() {
            Some(bpp) => {
                self.data.len() == (self.meta.width as usize) * (self.meta.height as usize) * bpp
            }
            None => true,
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("sequence", &self.meta.sequence)
            .field("width", &self.meta.width)
            .field("height", &self.meta.height)
            .field("format", &self.meta.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Reorders the channel bytes of every pixel triplet, mapping BGR24 to RGB24
/// and back.
pub fn swap_channel_order(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    for px in out.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, format: PixelFormat, len: usize) -> Frame {
        Frame {
            data: Bytes::from(vec![0u8; len]),
            meta: Arc::new(FrameMetadata {
                sequence: 1,
                width,
                height,
                format,
            }),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn valid_frame_matches_dimensions() {
        assert!(frame(4, 2, PixelFormat::Bgr24, 4 * 2 * 3).is_valid());
        assert!(frame(4, 2, PixelFormat::Yuyv, 4 * 2 * 2).is_valid());
    }

    #[test]
    fn truncated_frame_is_invalid() {
        assert!(!frame(4, 2, PixelFormat::Bgr24, 10).is_valid());
    }

    #[test]
    fn channel_swap_is_an_involution() {
        let bgr = [1u8, 2, 3, 4, 5, 6];
        let rgb = swap_channel_order(&bgr);
        assert_eq!(rgb, vec![3, 2, 1, 6, 5, 4]);
        assert_eq!(swap_channel_order(&rgb), bgr.to_vec());
    }
}

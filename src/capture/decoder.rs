use jpeg_decoder::Decoder;

use crate::capture::frame::{swap_channel_order, PixelFormat};
use crate::capture::source::CaptureError;

/// A frame decoded to the pipeline's BGR24 order. Dimensions come from the
/// payload for compressed formats, which may differ from the negotiated ones.
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Normalizes one captured buffer to BGR24.
pub fn decode_to_bgr(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<DecodedImage, CaptureError> {
    match format {
        PixelFormat::Bgr24 => {
            expect_len(data, width, height, 3)?;
            Ok(DecodedImage {
                data: data.to_vec(),
                width,
                height,
            })
        }
        PixelFormat::Rgb24 => {
            expect_len(data, width, height, 3)?;
            Ok(DecodedImage {
                data: swap_channel_order(data),
                width,
                height,
            })
        }
        PixelFormat::Yuyv => {
            expect_len(data, width, height, 2)?;
            Ok(DecodedImage {
                data: yuyv_to_bgr(data),
                width,
                height,
            })
        }
        PixelFormat::Mjpeg => {
            let mut decoder = Decoder::new(data);
            let pixels = decoder
                .decode()
                .map_err(|e| CaptureError::Decode(e.to_string()))?;
            let info = decoder
                .info()
                .ok_or_else(|| CaptureError::Decode("missing JPEG header".into()))?;
            if info.pixel_format != jpeg_decoder::PixelFormat::RGB24 {
                return Err(CaptureError::Decode(format!(
                    "unsupported JPEG pixel format {:?}",
                    info.pixel_format
                )));
            }
            Ok(DecodedImage {
                data: swap_channel_order(&pixels),
                width: info.width as u32,
                height: info.height as u32,
            })
        }
    }
}

fn expect_len(data: &[u8], width: u32, height: u32, bpp: usize) -> Result<(), CaptureError> {
    let expected = (width as usize) * (height as usize) * bpp;
    if data.len() != expected {
        return Err(CaptureError::Decode(format!(
            "expected {} bytes for {}x{}, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    Ok(())
}

// BT.601 integer conversion, two pixels per YUYV macropixel
fn yuyv_to_bgr(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 * 3);
    for chunk in data.chunks_exact(4) {
        let (y0, u, y1, v) = (
            chunk[0] as i32,
            chunk[1] as i32,
            chunk[2] as i32,
            chunk[3] as i32,
        );
        let d = u - 128;
        let e = v - 128;
        for y in [y0, y1] {
            let c = 298 * (y - 16);
            let r = (c + 409 * e + 128) >> 8;
            let g = (c - 100 * d - 208 * e + 128) >> 8;
            let b = (c + 516 * d + 128) >> 8;
            out.push(b.clamp(0, 255) as u8);
            out.push(g.clamp(0, 255) as u8);
            out.push(r.clamp(0, 255) as u8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn bgr_passes_through() {
        let data = [9u8, 8, 7, 6, 5, 4];
        let decoded = decode_to_bgr(&data, 2, 1, PixelFormat::Bgr24).unwrap();
        assert_eq!(decoded.data, data.to_vec());
    }

    #[test]
    fn rgb_is_reordered() {
        let data = [1u8, 2, 3];
        let decoded = decode_to_bgr(&data, 1, 1, PixelFormat::Rgb24).unwrap();
        assert_eq!(decoded.data, vec![3, 2, 1]);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let data = [0u8; 5];
        assert!(decode_to_bgr(&data, 2, 1, PixelFormat::Bgr24).is_err());
    }

    #[test]
    fn yuyv_limits_map_to_black_and_white() {
        // Y=16 is reference black, Y=235 reference white, U=V=128 no chroma
        let data = [16u8, 128, 235, 128];
        let decoded = decode_to_bgr(&data, 2, 1, PixelFormat::Yuyv).unwrap();
        assert_eq!(decoded.data, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn mjpeg_roundtrip_produces_bgr() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 60]));
        let mut jpeg = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let decoded = decode_to_bgr(&jpeg, 8, 8, PixelFormat::Mjpeg).unwrap();
        assert_eq!(decoded.width, 8);
        assert_eq!(decoded.height, 8);
        assert_eq!(decoded.data.len(), 8 * 8 * 3);
    }
}

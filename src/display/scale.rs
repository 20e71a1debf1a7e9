//! Preview fit policy
//!
//! The preview shrinks a frame by the larger of the width and height ratios
//! against the display area, with the ratio rounded to one decimal place and
//! the divisions truncated. A rounded ratio of zero (display area not laid
//! out yet, or a frame far smaller than it) leaves the frame unscaled.

/// Scale divisor for fitting a frame into the display area, rounded to one
/// decimal place. Zero when either display dimension is zero.
pub fn fit_ratio(frame_w: u32, frame_h: u32, label_w: u32, label_h: u32) -> f64 {
    if label_w == 0 || label_h == 0 {
        return 0.0;
    }
    let w_ratio = frame_w as f64 / label_w as f64;
    let h_ratio = frame_h as f64 / label_h as f64;
    (w_ratio.max(h_ratio) * 10.0).round() / 10.0
}

/// Target preview dimensions, or `None` when the frame is to be shown
/// unscaled.
pub fn scaled_size(frame_w: u32, frame_h: u32, label_w: u32, label_h: u32) -> Option<(u32, u32)> {
    let ratio = fit_ratio(frame_w, frame_h, label_w, label_h);
    if ratio > 0.0 {
        Some((
            (frame_w as f64 / ratio) as u32,
            (frame_h as f64 / ratio) as u32,
        ))
    } else {
        None
    }
}

/// Bilinear resize of an RGB24 buffer. `None` when `data` does not hold
/// exactly `width * height` pixels.
pub fn resize_rgb(
    data: Vec<u8>,
    width: u32,
    height: u32,
    dst_w: u32,
    dst_h: u32,
) -> Option<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, data)?;
    let resized = image::imageops::resize(&img, dst_w, dst_h, image::imageops::FilterType::Triangle);
    Some(resized.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_frame_fits_into_half_size_label() {
        // 1648/512 = 3.22, 1232/384 = 3.21, rounded ratio 3.2
        assert_eq!(fit_ratio(1648, 1232, 512, 384), 3.2);
        assert_eq!(scaled_size(1648, 1232, 512, 384), Some((515, 385)));
    }

    #[test]
    fn unsized_label_leaves_frame_unscaled() {
        assert_eq!(fit_ratio(1648, 1232, 0, 0), 0.0);
        assert_eq!(scaled_size(1648, 1232, 0, 768), None);
    }

    #[test]
    fn tiny_frame_rounds_to_zero_and_stays_unscaled() {
        // 20/512 and 15/384 both round to 0.0
        assert_eq!(fit_ratio(20, 15, 512, 384), 0.0);
        assert_eq!(scaled_size(20, 15, 512, 384), None);
    }

    #[test]
    fn sub_unit_ratio_enlarges_the_frame() {
        // 100/384 rounds to 0.3, so the frame grows; the rough-fit policy
        // is a divisor, not a clamp
        assert_eq!(fit_ratio(100, 100, 512, 384), 0.3);
        assert_eq!(scaled_size(100, 100, 512, 384), Some((333, 333)));
    }

    #[test]
    fn resize_rejects_mismatched_buffer() {
        assert!(resize_rgb(vec![0u8; 5], 2, 2, 1, 1).is_none());
    }

    #[test]
    fn resize_produces_exact_target_size() {
        let data = vec![128u8; 16 * 8 * 3];
        let out = resize_rgb(data, 16, 8, 5, 3).unwrap();
        assert_eq!(out.len(), 5 * 3 * 3);
    }
}

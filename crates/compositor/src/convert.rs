//! CPU pixel format conversion: raw capture formats to BGRA8.
//!
//! The sink consumes 32-bit BGRA. Camera frames arrive as BGRA (passthrough),
//! RGBA (swizzle), or packed YUYV 4:2:2, the common webcam wire format.
//!
//! # YUYV format
//!
//! YUYV packs two horizontal pixels into four bytes (`Y0 U Y1 V`): each
//! luma sample gets its own byte, the chroma pair is shared. Conversion uses
//! the **BT.601** matrix with limited-range input, which is what UVC webcams
//! deliver; fixed-point arithmetic with 10 bits of fractional precision
//! keeps floating point out of the inner loop.

use cap_common::color::PixelFormat;
use cap_common::frame::RawFrame;

use crate::error::ConvertError;

// ---------------------------------------------------------------------------
// BT.601 fixed-point conversion constants (limited range)
// ---------------------------------------------------------------------------

//   R = 1.164 * (Y - 16) + 1.596 * (V - 128)
//   G = 1.164 * (Y - 16) - 0.392 * (U - 128) - 0.813 * (V - 128)
//   B = 1.164 * (Y - 16) + 2.017 * (U - 128)
const Y_SCALE: i32 = 1192; // 1.164 * 1024
const V_TO_R: i32 = 1634; // 1.596 * 1024
const U_TO_G: i32 = 401; // 0.392 * 1024
const V_TO_G: i32 = 833; // 0.813 * 1024
const U_TO_B: i32 = 2066; // 2.017 * 1024
const ROUND: i32 = 512; // 0.5 * 1024

/// Clamp an i32 value to the [0, 255] range and return as u8.
#[inline(always)]
fn clamp_u8(val: i32) -> u8 {
    val.clamp(0, 255) as u8
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate dimensions and buffer size for a raw frame.
///
/// Returns the required output buffer size in bytes (`width * height * 4`).
fn validate_frame(frame: &RawFrame) -> Result<usize, ConvertError> {
    let w = frame.resolution.width;
    let h = frame.resolution.height;

    let odd_packed = frame.format == PixelFormat::Yuyv422 && !w.is_multiple_of(2);
    if w == 0 || h == 0 || odd_packed {
        return Err(ConvertError::InvalidDimensions {
            format: frame.format,
            width: w,
            height: h,
        });
    }

    let needed = frame.expected_byte_size();
    if frame.data.len() < needed {
        return Err(ConvertError::DataTooSmall {
            needed,
            got: frame.data.len(),
        });
    }

    Ok(frame.resolution.rgba_byte_size())
}

// ---------------------------------------------------------------------------
// Public conversion functions
// ---------------------------------------------------------------------------

/// Convert a raw frame to a freshly allocated BGRA8 buffer.
pub fn to_bgra(frame: &RawFrame) -> Result<Vec<u8>, ConvertError> {
    let out_size = validate_frame(frame)?;
    let mut out = vec![0u8; out_size];
    convert_into(frame, &mut out);
    Ok(out)
}

/// Convert a raw frame into a reusable buffer (resized to fit).
pub fn to_bgra_into(frame: &RawFrame, out: &mut Vec<u8>) -> Result<(), ConvertError> {
    let out_size = validate_frame(frame)?;
    out.clear();
    out.resize(out_size, 0);
    convert_into(frame, out);
    Ok(())
}

/// Core dispatch; `out` is validated to hold `width * height * 4` bytes.
fn convert_into(frame: &RawFrame, out: &mut [u8]) {
    match frame.format {
        PixelFormat::Bgra8 => out.copy_from_slice(&frame.data[..out.len()]),
        PixelFormat::Rgba8 => rgba_to_bgra(&frame.data, out),
        PixelFormat::Yuyv422 => yuyv_to_bgra(&frame.data, out),
    }
}

fn rgba_to_bgra(src: &[u8], out: &mut [u8]) {
    for (dst, px) in out.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        dst[0] = px[2];
        dst[1] = px[1];
        dst[2] = px[0];
        dst[3] = px[3];
    }
}

/// YUYV 4:2:2 to BGRA, processes 2 pixels (4 source bytes) per iteration.
fn yuyv_to_bgra(src: &[u8], out: &mut [u8]) {
    for (dst, quad) in out.chunks_exact_mut(8).zip(src.chunks_exact(4)) {
        let y0 = (quad[0] as i32 - 16) * Y_SCALE;
        let u = quad[1] as i32 - 128;
        let y1 = (quad[2] as i32 - 16) * Y_SCALE;
        let v = quad[3] as i32 - 128;

        let r_off = V_TO_R * v + ROUND;
        let g_off = U_TO_G * u + V_TO_G * v - ROUND;
        let b_off = U_TO_B * u + ROUND;

        dst[0] = clamp_u8((y0 + b_off) >> 10);
        dst[1] = clamp_u8((y0 - g_off) >> 10);
        dst[2] = clamp_u8((y0 + r_off) >> 10);
        dst[3] = 255;

        dst[4] = clamp_u8((y1 + b_off) >> 10);
        dst[5] = clamp_u8((y1 - g_off) >> 10);
        dst[6] = clamp_u8((y1 + r_off) >> 10);
        dst[7] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_common::types::{Resolution, TimeCode};

    fn frame(data: Vec<u8>, w: u32, h: u32, format: PixelFormat) -> RawFrame {
        RawFrame {
            data,
            resolution: Resolution::new(w, h),
            format,
            pts: TimeCode::ZERO,
        }
    }

    #[test]
    fn bgra_passthrough_is_bit_exact() {
        let data: Vec<u8> = (0..16).collect();
        let out = to_bgra(&frame(data.clone(), 2, 2, PixelFormat::Bgra8)).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn rgba_swizzles_channels() {
        let out = to_bgra(&frame(vec![10, 20, 30, 40], 1, 1, PixelFormat::Rgba8)).unwrap();
        assert_eq!(out, vec![30, 20, 10, 40]);
    }

    #[test]
    fn yuyv_black_converts_to_black() {
        // Y=16, U=V=128 is black in limited-range BT.601.
        let out = to_bgra(&frame(vec![16, 128, 16, 128], 2, 1, PixelFormat::Yuyv422)).unwrap();
        assert_eq!(out, vec![0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn yuyv_white_converts_to_white() {
        // Y=235, U=V=128 is reference white.
        let out = to_bgra(&frame(vec![235, 128, 235, 128], 2, 1, PixelFormat::Yuyv422)).unwrap();
        assert_eq!(out, vec![255, 255, 255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn yuyv_gray_is_neutral() {
        let out = to_bgra(&frame(vec![126, 128, 126, 128], 2, 1, PixelFormat::Yuyv422)).unwrap();
        // Neutral chroma: all channels equal, alpha opaque.
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = to_bgra(&frame(vec![0; 8], 2, 2, PixelFormat::Bgra8)).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::DataTooSmall { needed: 16, got: 8 }
        ));
    }

    #[test]
    fn odd_width_yuyv_is_rejected() {
        let err = to_bgra(&frame(vec![0; 6], 3, 1, PixelFormat::Yuyv422)).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDimensions { .. }));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = to_bgra(&frame(vec![], 0, 10, PixelFormat::Rgba8)).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDimensions { .. }));
    }

    #[test]
    fn into_variant_reuses_buffer() {
        let f = frame(vec![1, 2, 3, 4], 1, 1, PixelFormat::Bgra8);
        let mut buf = Vec::with_capacity(64);
        to_bgra_into(&f, &mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }
}

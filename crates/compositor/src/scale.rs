//! Bilinear RGBA scaling: overlay canvas to frame resolution.
//!
//! The overlay is rendered at a fixed canvas size; when the camera delivers
//! a different resolution the overlay is resampled to the frame size before
//! compositing, so output dimensions always follow the background frame.

use cap_common::types::Resolution;
use tracing::debug;

/// Bilinearly scale an RGBA8 buffer from `src_res` to `dst_res`.
///
/// Identity resolutions short-circuit to a copy. Channels (including
/// straight alpha) are interpolated independently.
pub fn scale_rgba(src: &[u8], src_res: Resolution, dst_res: Resolution) -> Vec<u8> {
    debug_assert_eq!(src.len(), src_res.rgba_byte_size());

    if src_res == dst_res {
        return src.to_vec();
    }
    if dst_res.width == 0 || dst_res.height == 0 || src_res.width == 0 || src_res.height == 0 {
        return vec![0u8; dst_res.rgba_byte_size()];
    }

    debug!(%src_res, %dst_res, "Scaling overlay to frame resolution");

    let sw = src_res.width as usize;
    let sh = src_res.height as usize;
    let dw = dst_res.width as usize;
    let dh = dst_res.height as usize;

    let x_ratio = src_res.width as f32 / dst_res.width as f32;
    let y_ratio = src_res.height as f32 / dst_res.height as f32;

    let mut out = vec![0u8; dst_res.rgba_byte_size()];
    for dy in 0..dh {
        let sy = ((dy as f32 + 0.5) * y_ratio - 0.5).max(0.0);
        let y0 = (sy as usize).min(sh - 1);
        let y1 = (y0 + 1).min(sh - 1);
        let fy = sy - y0 as f32;

        for dx in 0..dw {
            let sx = ((dx as f32 + 0.5) * x_ratio - 0.5).max(0.0);
            let x0 = (sx as usize).min(sw - 1);
            let x1 = (x0 + 1).min(sw - 1);
            let fx = sx - x0 as f32;

            let p00 = (y0 * sw + x0) * 4;
            let p01 = (y0 * sw + x1) * 4;
            let p10 = (y1 * sw + x0) * 4;
            let p11 = (y1 * sw + x1) * 4;
            let dst = (dy * dw + dx) * 4;

            for ch in 0..4 {
                let top = src[p00 + ch] as f32 * (1.0 - fx) + src[p01 + ch] as f32 * fx;
                let bottom = src[p10 + ch] as f32 * (1.0 - fx) + src[p11 + ch] as f32 * fx;
                out[dst + ch] = (top * (1.0 - fy) + bottom * fy).round() as u8;
            }
        }
    }
    out
}

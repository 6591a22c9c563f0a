//! Source-over alpha blend of the overlay onto a BGRA background.
//!
//! Implements the standard operator
//! `out = overlay.rgb * overlay.a + background.rgb * (1 - overlay.a)`
//! (alpha composited likewise) with integer arithmetic and rounding.
//! A zero-alpha overlay pixel leaves the background byte-exact; a
//! full-alpha pixel replaces it exactly.

use cap_common::types::Resolution;

/// Divide by 255 with rounding, for values in `0..=255*255`.
#[inline(always)]
fn div255(v: u32) -> u8 {
    ((v + 127) / 255) as u8
}

/// Blend an RGBA overlay over a BGRA destination of the same resolution.
///
/// `dst` is `resolution.rgba_byte_size()` bytes of BGRA8; `overlay` is the
/// same pixel count in RGBA8 straight alpha.
pub fn blend_over_bgra(dst: &mut [u8], overlay: &[u8], resolution: Resolution) {
    debug_assert_eq!(dst.len(), resolution.rgba_byte_size());
    debug_assert_eq!(overlay.len(), resolution.rgba_byte_size());

    for (bg, ov) in dst.chunks_exact_mut(4).zip(overlay.chunks_exact(4)) {
        let a = ov[3] as u32;
        if a == 0 {
            continue;
        }
        if a == 255 {
            bg[0] = ov[2];
            bg[1] = ov[1];
            bg[2] = ov[0];
            bg[3] = 255;
            continue;
        }
        let inv = 255 - a;
        // overlay is RGBA, destination is BGRA
        bg[0] = div255(ov[2] as u32 * a + bg[0] as u32 * inv);
        bg[1] = div255(ov[1] as u32 * a + bg[1] as u32 * inv);
        bg[2] = div255(ov[0] as u32 * a + bg[2] as u32 * inv);
        bg[3] = a as u8 + div255(bg[3] as u32 * inv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: Resolution = Resolution {
        width: 2,
        height: 1,
    };

    #[test]
    fn zero_alpha_overlay_is_a_noop() {
        let mut bg = vec![10, 20, 30, 255, 40, 50, 60, 255];
        let before = bg.clone();
        let overlay = vec![255, 255, 255, 0, 1, 2, 3, 0];
        blend_over_bgra(&mut bg, &overlay, RES);
        assert_eq!(bg, before);
    }

    #[test]
    fn opaque_overlay_replaces_background() {
        let mut bg = vec![10, 20, 30, 255, 40, 50, 60, 255];
        // RGBA red and green, fully opaque
        let overlay = vec![255, 0, 0, 255, 0, 255, 0, 255];
        blend_over_bgra(&mut bg, &overlay, RES);
        // BGRA out
        assert_eq!(bg, vec![0, 0, 255, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn half_alpha_mixes_evenly() {
        let mut bg = vec![0, 0, 0, 255, 0, 0, 0, 255];
        // white at ~50% over black
        let overlay = vec![255, 255, 255, 128, 255, 255, 255, 128];
        blend_over_bgra(&mut bg, &overlay, RES);
        for px in bg.chunks_exact(4) {
            assert_eq!(px[0], 128);
            assert_eq!(px[1], 128);
            assert_eq!(px[2], 128);
            assert_eq!(px[3], 255); // over an opaque background stays opaque
        }
    }

    #[test]
    fn alpha_composites_over_transparent_background() {
        let mut bg = vec![0, 0, 0, 0];
        let overlay = vec![255, 255, 255, 128];
        blend_over_bgra(
            &mut bg,
            &overlay,
            Resolution {
                width: 1,
                height: 1,
            },
        );
        assert_eq!(bg[3], 128);
    }
}

//! Per-frame composition: overlay over camera frame (or black background).
//!
//! Invoked once per incoming camera frame, on the capture callback's
//! schedule. The overlay has already been rasterized by the settings path;
//! this only converts the background to BGRA, scales the overlay if the
//! canvas and frame resolutions differ, and runs one source-over pass.

use tracing::debug;

use cap_common::frame::{CompositedFrame, OverlayImage, RawFrame};

use crate::blend::blend_over_bgra;
use crate::convert;
use crate::error::{ComposeError, ConvertError};
use crate::scale::scale_rgba;

/// Stateless per-frame compositor.
///
/// Output dimensions always follow the background frame, not the overlay
/// canvas. With the camera disabled the background is an opaque black
/// canvas at the frame's resolution, so the output cadence and geometry
/// stay tied to the capture source either way.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Composite one frame.
    ///
    /// `overlay = None` (startup race: no settings poll has completed yet)
    /// passes the background through unchanged.
    pub fn compose(
        &self,
        frame: &RawFrame,
        overlay: Option<&OverlayImage>,
        enable_camera: bool,
    ) -> Result<CompositedFrame, ComposeError> {
        let resolution = frame.resolution;
        if resolution.width == 0 || resolution.height == 0 {
            return Err(ConvertError::InvalidDimensions {
                format: frame.format,
                width: resolution.width,
                height: resolution.height,
            }
            .into());
        }

        let mut data = if enable_camera {
            convert::to_bgra(frame)?
        } else {
            opaque_black(resolution.rgba_byte_size())
        };

        match overlay {
            None => {
                debug!(pts = %frame.pts, "No overlay rendered yet, passing background through");
            }
            Some(overlay) if overlay.resolution == resolution => {
                blend_over_bgra(&mut data, &overlay.pixels, resolution);
            }
            Some(overlay) => {
                let scaled = scale_rgba(&overlay.pixels, overlay.resolution, resolution);
                blend_over_bgra(&mut data, &scaled, resolution);
            }
        }

        Ok(CompositedFrame {
            data,
            resolution,
            pts: frame.pts,
        })
    }
}

/// An opaque black BGRA buffer (the no-camera background).
fn opaque_black(byte_size: usize) -> Vec<u8> {
    let mut data = vec![0u8; byte_size];
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }
    data
}

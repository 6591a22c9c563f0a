//! Frame data-flow types: capture input, cached overlay, composited output.

use crate::color::PixelFormat;
use crate::types::{Resolution, TimeCode};

/// A raw video frame as pushed by the capture source.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// Packed pixel data in `format` layout.
    pub data: Vec<u8>,
    /// Frame dimensions.
    pub resolution: Resolution,
    /// Pixel format of `data`.
    pub format: PixelFormat,
    /// Presentation timestamp.
    pub pts: TimeCode,
}

impl RawFrame {
    /// Expected byte length of `data` for the declared resolution/format.
    pub fn expected_byte_size(&self) -> usize {
        self.resolution.pixel_count() as usize * self.format.bytes_per_pixel() as usize
    }
}

/// The rendered caption, cached between settings changes.
///
/// RGBA8 with straight alpha at a fixed canvas resolution. Never mutated in
/// place; the settings poller builds a fresh image and swaps it wholesale,
/// so a frame in flight safely reads the old or the new version.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayImage {
    /// RGBA8 pixel data, `resolution.rgba_byte_size()` bytes.
    pub pixels: Vec<u8>,
    /// Canvas dimensions.
    pub resolution: Resolution,
}

impl OverlayImage {
    /// A fully transparent canvas (the empty-text overlay).
    pub fn transparent(resolution: Resolution) -> Self {
        Self {
            pixels: vec![0u8; resolution.rgba_byte_size()],
            resolution,
        }
    }

    /// Returns `true` if every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// A composited output frame, ready for the sink.
///
/// Always BGRA8 at the background frame's resolution. Ownership transfers to
/// the sink on delivery.
#[derive(Clone, Debug)]
pub struct CompositedFrame {
    /// BGRA8 pixel data, `resolution.rgba_byte_size()` bytes.
    pub data: Vec<u8>,
    /// Output dimensions (follows the background frame, not the canvas).
    pub resolution: Resolution,
    /// Presentation timestamp carried over from the input frame.
    pub pts: TimeCode,
}

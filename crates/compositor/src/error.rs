//! Compositor error types.

use thiserror::Error;

use cap_common::color::PixelFormat;

/// Errors from raw-frame pixel format conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Width or height is zero, or the width is odd for a packed 4:2:2 input.
    #[error("Invalid dimensions for {format:?}: {width}x{height}")]
    InvalidDimensions {
        format: PixelFormat,
        width: u32,
        height: u32,
    },

    /// The frame buffer is smaller than the declared resolution requires.
    #[error("Frame data too small: need {needed}, got {got}")]
    DataTooSmall { needed: usize, got: usize },
}

/// Errors from per-frame composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Background conversion failed.
    #[error("Convert error: {0}")]
    Convert(#[from] ConvertError),
}

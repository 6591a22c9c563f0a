//! The rendering seam between the settings channel and the rasterizer.

use crate::error::RenderError;
use crate::frame::OverlayImage;
use crate::settings::Settings;

/// Renders a caption overlay from a settings value.
///
/// Implementations must be pure with respect to their input: the same
/// `Settings` produces a pixel-identical overlay (font-hinting noise aside).
/// The settings poller calls this only when the active settings change by
/// value, never per frame.
pub trait RenderOverlay: Send {
    fn render(&self, settings: &Settings) -> Result<OverlayImage, RenderError>;
}

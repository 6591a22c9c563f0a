//! Errors shared across pipeline crates (thiserror-based).

use thiserror::Error;

/// Overlay rendering errors.
///
/// Lives here (not in the overlay crate) because the [`crate::RenderOverlay`]
/// seam is defined in `cap-common` and the settings channel handles these
/// without depending on a concrete rasterizer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable font: the requested name did not resolve and no default
    /// font is available either.
    #[error("No usable font (requested {requested:?})")]
    NoFont { requested: String },

    /// Font data exists but could not be parsed.
    #[error("Font parse failed for {name:?}: {reason}")]
    FontParse { name: String, reason: String },

    /// The configured canvas has a zero dimension.
    #[error("Invalid canvas resolution: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

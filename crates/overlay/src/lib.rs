//! `cap-overlay`: Caption text rasterization.
//!
//! Turns a [`cap_common::Settings`] value into a cached [`OverlayImage`]:
//! resolve the font ([`FontCatalog`]), lay the text out centered on the
//! canvas, stamp glyph coverage (stroke first, then fill), and hand the
//! finished RGBA canvas to the pipeline. This is the expensive path that
//! runs only on settings changes, never per frame.

pub mod font;
pub mod renderer;

pub use font::FontCatalog;
pub use renderer::OverlayRenderer;

pub use cap_common::frame::OverlayImage;

//! `cap-compositor`: Per-frame compositing, kept within one frame interval.
//!
//! The compositor combines the cached caption overlay with the current
//! camera frame (or a black background when the camera is disabled) using
//! the source-over operator, and converts the result into the 32-bit BGRA
//! buffer the virtual-camera sink consumes. Everything expensive (text
//! rasterization) happens ahead of time in `cap-overlay`; this crate is the
//! hot path and does only conversion, an optional overlay scale, and one
//! blend pass.

pub mod blend;
pub mod compositor;
pub mod convert;
pub mod error;
pub mod scale;

pub use compositor::Compositor;
pub use error::{ComposeError, ConvertError};

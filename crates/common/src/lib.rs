//! `cap-common`: Shared types, traits, and errors for the CaptionCam pipeline.
//!
//! This crate is the foundation that all other pipeline crates depend on.
//! It defines the core abstractions:
//!
//! - **Types**: `Resolution`, `TimeCode` (newtypes for safety)
//! - **Color**: `PixelFormat`, `Rgb` (hex-string boundary encoding)
//! - **Settings**: `Settings`, `CaptionPosition` (the overlay value object)
//! - **Frames**: `RawFrame`, `OverlayImage`, `CompositedFrame` (data flow types)
//! - **Cell**: `OverlayCell`, `OverlaySnapshot` (atomic settings/overlay handoff)
//! - **Render seam**: `RenderOverlay` (trait between the poller and rasterizer)
//! - **Errors**: `RenderError` (thiserror-based)
//! - **Config**: `PipelineConfig`

pub mod cell;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod render;
pub mod settings;
pub mod types;

// Re-export commonly used items at crate root
pub use cell::{OverlayCell, OverlaySnapshot};
pub use color::{PixelFormat, Rgb};
pub use config::PipelineConfig;
pub use error::RenderError;
pub use frame::{CompositedFrame, OverlayImage, RawFrame};
pub use render::RenderOverlay;
pub use settings::{CaptionPosition, Settings};
pub use types::{Resolution, TimeCode};

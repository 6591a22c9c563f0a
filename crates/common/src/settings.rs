//! The caption settings value object.
//!
//! `Settings` is immutable per instance and compared by value: the settings
//! channel re-renders the overlay if and only if a decoded candidate differs
//! from the active value. The wire form is the JSON payload documented in
//! [`crate::settings::Settings`]'s serde attributes (camelCase field names,
//! position as an integer, colors as `#RRGGBB` strings).

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Vertical placement of the caption on the canvas.
///
/// Wire form is the integer 0 (top), 1 (center), 2 (bottom). Unknown
/// integers decode to `Bottom` rather than rejecting the whole payload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CaptionPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

impl From<u8> for CaptionPosition {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Top,
            1 => Self::Center,
            _ => Self::Bottom,
        }
    }
}

impl From<CaptionPosition> for u8 {
    fn from(p: CaptionPosition) -> Self {
        match p {
            CaptionPosition::Top => 0,
            CaptionPosition::Center => 1,
            CaptionPosition::Bottom => 2,
        }
    }
}

/// Overlay appearance and behavior.
///
/// Fully self-describing: no field depends on another instance. Two values
/// are equal iff all fields compare equal, and that equality is the sole
/// trigger for overlay re-rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Caption content; may be empty (renders a fully transparent overlay).
    pub text: String,
    /// Vertical placement.
    pub position: CaptionPosition,
    /// Font point size (> 0).
    pub text_size: u32,
    /// Stroke width around glyphs in pixels (0 = no stroke).
    pub border_size: u32,
    /// Glyph fill color.
    pub text_color: Rgb,
    /// Glyph stroke color.
    pub border_color: Rgb,
    /// Logical font name; empty or unresolvable falls back to the default font.
    pub font_name: String,
    /// Live camera frame as background, or a fixed black background.
    pub enable_camera: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: CaptionPosition::Bottom,
            text_size: 100,
            border_size: 2,
            text_color: Rgb::WHITE,
            border_color: Rgb::BLACK,
            font_name: String::new(),
            enable_camera: true,
        }
    }
}

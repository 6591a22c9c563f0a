//! Pixel format and color types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel format of a frame buffer in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 4 channels, 8 bits each, R-G-B-A byte order.
    Rgba8,
    /// 4 channels, 8 bits each, B-G-R-A byte order (virtual camera sink format).
    Bgra8,
    /// Packed YUV 4:2:2 (`Y0 U Y1 V`), 2 bytes per pixel (webcam capture format).
    Yuyv422,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Yuyv422 => 2,
        }
    }
}

/// An RGB color as normalized float channels.
///
/// The wire form is a `#RRGGBB` hex string. Anything that does not parse as
/// six hex digits becomes opaque black rather than an error, matching the
/// settings channel's degrade-don't-fail contract.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string. Invalid input yields black.
    pub fn from_hex(s: &str) -> Self {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Self::BLACK;
        }
        match u32::from_str_radix(hex, 16) {
            Ok(v) => Self {
                r: ((v >> 16) & 0xff) as f32 / 255.0,
                g: ((v >> 8) & 0xff) as f32 / 255.0,
                b: (v & 0xff) as f32 / 255.0,
            },
            Err(_) => Self::BLACK,
        }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.r_u8(),
            self.g_u8(),
            self.b_u8()
        )
    }

    pub fn r_u8(self) -> u8 {
        (self.r.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    pub fn g_u8(self) -> u8 {
        (self.g.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    pub fn b_u8(self) -> u8 {
        (self.b.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl From<String> for Rgb {
    fn from(s: String) -> Self {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_sizes() {
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Bgra8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Yuyv422.bytes_per_pixel(), 2);
    }

    #[test]
    fn hex_roundtrip() {
        let c = Rgb::from_hex("#ff8000");
        assert_eq!(c.r_u8(), 0xff);
        assert_eq!(c.g_u8(), 0x80);
        assert_eq!(c.b_u8(), 0x00);
        assert_eq!(c.to_hex(), "#ff8000");
    }

    #[test]
    fn hex_without_hash_prefix() {
        assert_eq!(Rgb::from_hex("ffffff"), Rgb::WHITE);
    }

    #[test]
    fn invalid_hex_is_black() {
        assert_eq!(Rgb::from_hex(""), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#fff"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#zzzzzz"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("not a color"), Rgb::BLACK);
    }

    #[test]
    fn serde_uses_hex_string() {
        let json = serde_json::to_string(&Rgb::WHITE).unwrap();
        assert_eq!(json, "\"#ffffff\"");
        let back: Rgb = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back, Rgb::BLACK);
    }
}

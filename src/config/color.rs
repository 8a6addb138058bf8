//! RGB color as carried by a configuration.

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize, Serializer};

/// Linear RGB color, each channel in `[0, 1]`.
///
/// Serializes as a `"#RRGGBB"` string so exported configurations match the
/// schema the generator produces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color([1.0, 1.0, 1.0]);

    /// Build a color from channel values, clamping each into `[0, 1]`.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        let channel = |c: f32| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Color([channel(r), channel(g), channel(b)])
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
        Ok(Color([channel(16), channel(8), channel(0)]))
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// The color as a glam vector, for uniform upload.
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::from_array(self.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Either accepted spelling of a color on ingestion.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ColorInput {
    Hex(String),
    Rgb([f32; 3]),
}

impl ColorInput {
    pub(crate) fn into_color(self) -> Result<Color, ConfigError> {
        match self {
            ColorInput::Hex(hex) => Color::from_hex(&hex),
            ColorInput::Rgb([r, g, b]) => Ok(Color::rgb(r, g, b)),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SceneError;

/// Linear RGB color with channels in `[0, 1]`.
///
/// Hex strings and packed integers are sRGB-encoded and are decoded on the way
/// in, so the channels are what the shaders consume. Serialized as a
/// `#rrggbb` string so configuration files and snapshots stay readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed sRGB `0xRRGGBB` integer.
    pub fn from_u32(packed: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((packed >> shift) & 0xff) as f32 / 255.0);
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let packed = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::from_u32(packed))
    }

    /// Resolves a CSS-style keyword or hex string.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::rgb(0.0, 0.0, 0.0)),
            "purple" => Some(Self::from_u32(0x800080)),
            "pink" => Some(Self::from_u32(0xffc0cb)),
            _ => Self::from_hex(value),
        }
    }

    /// Packs the sRGB encoding of this color as `0xRRGGBB`.
    pub fn to_u32(&self) -> u32 {
        let channel = |v: f32| (linear_to_srgb(v.clamp(0.0, 1.0)) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SceneError::msg(format!("`{s}` is not a color")))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{raw}`")))
    }
}

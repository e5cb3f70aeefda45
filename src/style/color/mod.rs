use crate::error::ColorParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub const fn alpha(self) -> u8 {
        self.a
    }

    /// Fully transparent colors are never painted.
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(raw: &str) -> Result<Self, ColorParseError> {
        let bytes = raw.as_bytes();
        if bytes.first() != Some(&b'#') {
            return Err(ColorParseError::MissingHash(raw.to_string()));
        }
        let digits = &bytes[1..];
        if !matches!(digits.len(), 3 | 4 | 6 | 8) {
            return Err(ColorParseError::BadLength(raw.to_string()));
        }
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(ColorParseError::BadDigit(raw.to_string()));
        }

        let color = match digits.len() {
            3 => Color::rgb(
                hex_1_to_u8(digits[0]) * 17,
                hex_1_to_u8(digits[1]) * 17,
                hex_1_to_u8(digits[2]) * 17,
            ),
            4 => Color::rgba(
                hex_1_to_u8(digits[0]) * 17,
                hex_1_to_u8(digits[1]) * 17,
                hex_1_to_u8(digits[2]) * 17,
                hex_1_to_u8(digits[3]) * 17,
            ),
            6 => Color::rgb(
                hex_2_to_u8(digits[0], digits[1]),
                hex_2_to_u8(digits[2], digits[3]),
                hex_2_to_u8(digits[4], digits[5]),
            ),
            _ => Color::rgba(
                hex_2_to_u8(digits[0], digits[1]),
                hex_2_to_u8(digits[2], digits[3]),
                hex_2_to_u8(digits[4], digits[5]),
                hex_2_to_u8(digits[6], digits[7]),
            ),
        };
        Ok(color)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s.trim())
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
        Color::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(high: u8, low: u8) -> u8 {
    hex_1_to_u8(high) * 16 + hex_1_to_u8(low)
}

// 🎨 Color Scheme - the app's visual palette as a serializable value
//
// Stored by ColorService as an opaque blob (JSON bytes). Colors serialize as
// "#RRGGBB" strings so the blob stays readable when inspecting the database.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::ThemeError;

// ============================================================================
// RGB COLOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse "#RRGGBB" or "RRGGBB" (case-insensitive)
    pub fn from_hex(hex: &str) -> Result<Self, ThemeError> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ThemeError::InvalidColor(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ThemeError::InvalidColor(hex.to_string()))
        };

        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// COLOR SCHEME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub mode: ThemeMode,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub background: Rgb,
    pub surface: Rgb,
    pub text: Rgb,
}

impl ColorScheme {
    /// The hardcoded default theme, also used whenever stored data can't be decoded
    pub fn light() -> Self {
        ColorScheme {
            name: "light".to_string(),
            mode: ThemeMode::Light,
            primary: Rgb::new(0x2E, 0x7D, 0x32),
            secondary: Rgb::new(0x81, 0xC7, 0x84),
            accent: Rgb::new(0xFF, 0xB3, 0x00),
            background: Rgb::new(0xFF, 0xFF, 0xFF),
            surface: Rgb::new(0xF5, 0xF5, 0xF5),
            text: Rgb::new(0x21, 0x21, 0x21),
        }
    }

    pub fn dark() -> Self {
        ColorScheme {
            name: "dark".to_string(),
            mode: ThemeMode::Dark,
            primary: Rgb::new(0x66, 0xBB, 0x6A),
            secondary: Rgb::new(0x38, 0x8E, 0x3C),
            accent: Rgb::new(0xFF, 0xCA, 0x28),
            background: Rgb::new(0x12, 0x12, 0x12),
            surface: Rgb::new(0x1E, 0x1E, 0x1E),
            text: Rgb::new(0xEE, 0xEE, 0xEE),
        }
    }

    /// Look up a built-in scheme by name
    pub fn preset(name: &str) -> Result<Self, ThemeError> {
        match name.trim().to_lowercase().as_str() {
            "light" => Ok(ColorScheme::light()),
            "dark" => Ok(ColorScheme::dark()),
            other => Err(ThemeError::UnknownPreset(other.to_string())),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::light()
    }
}

// ============================================================================
// CODEC
// ============================================================================

pub fn encode(scheme: &ColorScheme) -> Result<Vec<u8>, ThemeError> {
    serde_json::to_vec(scheme).map_err(ThemeError::Encode)
}

pub fn decode(data: &[u8]) -> Result<ColorScheme, ThemeError> {
    serde_json::from_slice(data).map_err(ThemeError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_encoded_scheme_is_equal() {
        for scheme in [ColorScheme::light(), ColorScheme::dark()] {
            let bytes = encode(&scheme).unwrap();
            assert_eq!(decode(&bytes).unwrap(), scheme);
        }
    }

    #[test]
    fn test_decode_malformed_data_errors() {
        assert!(matches!(decode(b"not json"), Err(ThemeError::Decode(_))));
        assert!(matches!(decode(&[]), Err(ThemeError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_bad_color_value() {
        let json = String::from_utf8(encode(&ColorScheme::light()).unwrap())
            .unwrap()
            .replace("#2E7D32", "#XYZ");
        assert!(decode(json.as_bytes()).is_err());
    }

    #[test]
    fn test_rgb_hex_parsing() {
        assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::new(255, 128, 0).to_hex(), "#FF8000");

        assert!(Rgb::from_hex("#fff").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_colors_serialize_as_hex_strings() {
        let json = serde_json::to_value(ColorScheme::dark()).unwrap();
        assert_eq!(json["background"], "#121212");
        assert_eq!(json["mode"], "dark");
    }

    #[test]
    fn test_presets() {
        assert_eq!(ColorScheme::preset("Dark").unwrap(), ColorScheme::dark());
        assert_eq!(ColorScheme::preset("light").unwrap(), ColorScheme::default());
        assert!(matches!(
            ColorScheme::preset("neon"),
            Err(ThemeError::UnknownPreset(_))
        ));
    }
}

//! Colour type, hex parsing, and brightness math for style derivation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QrsmithError, Result};

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a hex colour string.
    ///
    /// Supports `#RGB`, `#RRGGBB`, and `#RRGGBBAA`, with or without the
    /// leading `#`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);

        match hex.len() {
            3 => {
                let mut digits = hex.chars();
                let r = parse_hex_digit(digits.next().unwrap())?;
                let g = parse_hex_digit(digits.next().unwrap())?;
                let b = parse_hex_digit(digits.next().unwrap())?;
                Ok(Self::rgb(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            6 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                Ok(Self::rgb(r, g, b))
            }
            8 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                let a = parse_hex_byte(&hex[6..8])?;
                Ok(Self::new(r, g, b, a))
            }
            _ => Err(QrsmithError::Parse {
                message: format!("Invalid hex colour: {}", s),
                help: Some("Use #RGB, #RRGGBB, or #RRGGBBAA format".to_string()),
            }),
        }
    }

    /// Convert to an RGBA array (for `image` buffers).
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Lowercase `#rrggbb` form used in SVG markup.
    pub fn to_svg_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Average of the RGB channels, the darkness test used when styling
    /// re-derives the module grid from rendered pixels.
    pub fn luminance(self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }

    /// Add a signed delta to each RGB channel, clamping to [0, 255].
    pub fn adjusted(self, delta: i32) -> Self {
        let clamp = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b), self.a)
    }

    /// Adjust lightness in HSL space by a percentage of the remaining range.
    /// Positive lightens toward white, negative darkens toward black.
    pub fn with_lightness(self, percent: f32) -> Self {
        use palette::{Hsl, IntoColor, Srgb};

        let rgb: Srgb<f32> = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );

        let mut hsl: Hsl = rgb.into_color();
        let delta = percent / 100.0;
        if delta > 0.0 {
            hsl.lightness += (1.0 - hsl.lightness) * delta;
        } else {
            hsl.lightness += hsl.lightness * delta;
        }
        hsl.lightness = hsl.lightness.clamp(0.0, 1.0);

        let out: Srgb<f32> = hsl.into_color();
        Self::new(
            (out.red * 255.0).round() as u8,
            (out.green * 255.0).round() as u8,
            (out.blue * 255.0).round() as u8,
            self.a,
        )
    }

    /// Mix two colours by a factor (0.0 = self, 1.0 = other).
    pub fn mix(self, other: Self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let inv = 1.0 - factor;
        let ch = |a: u8, b: u8| ((a as f32 * inv) + (b as f32 * factor)).round() as u8;
        Self::new(
            ch(self.r, other.r),
            ch(self.g, other.g),
            ch(self.b, other.b),
            ch(self.a, other.a),
        )
    }
}

impl FromStr for Colour {
    type Err = QrsmithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Colour {
    type Error = QrsmithError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Colour> for String {
    fn from(c: Colour) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Adjust the brightness of a hex colour string by a signed delta.
///
/// Each RGB channel is parsed independently; a channel that fails to parse is
/// treated as 0. Channels clamp to [0, 255] after the delta is applied. The
/// result is re-encoded as lowercase `#rrggbb`.
pub fn adjust_colour_brightness(hex: &str, delta: i32) -> String {
    let hex = hex.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| -> u8 {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    let apply = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;

    format!(
        "#{:02x}{:02x}{:02x}",
        apply(channel(0..2)),
        apply(channel(2..4)),
        apply(channel(4..6)),
    )
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| QrsmithError::Parse {
            message: format!("Invalid hex digit: {}", c),
            help: None,
        })
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| QrsmithError::Parse {
        message: format!("Invalid hex byte: {}", s),
        help: None,
    })
}

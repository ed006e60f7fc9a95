//! Style configuration consumed by the generation and export pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QrsmithError, Result};

use super::Colour;

/// Named visual style applied to the QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QrStyle {
    /// Plain square modules, no transformation.
    #[default]
    Square,
    /// Rounded-corner mask over the whole symbol.
    Rounded,
    /// Modules redrawn as filled circles.
    Dots,
    /// Diagonal gradient, light noise specks, and a soft glow.
    Artistic,
}

impl fmt::Display for QrStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QrStyle::Square => "square",
            QrStyle::Rounded => "rounded",
            QrStyle::Dots => "dots",
            QrStyle::Artistic => "artistic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for QrStyle {
    type Err = QrsmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "square" => Ok(QrStyle::Square),
            "rounded" => Ok(QrStyle::Rounded),
            "dots" => Ok(QrStyle::Dots),
            "artistic" => Ok(QrStyle::Artistic),
            other => Err(QrsmithError::Parse {
                message: format!("Unknown style: {}", other),
                help: Some("Use square, rounded, dots, or artistic".to_string()),
            }),
        }
    }
}

/// Blend mode for pattern fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Overlay,
}

/// A user-supplied image tiled into the symbol's dark modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFill {
    /// Encoded image bytes (PNG, JPEG, ...), base64 in serialized form.
    #[serde(with = "base64_bytes")]
    pub image: Vec<u8>,

    /// Opacity of the stamped pattern, in [0, 1].
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// How pattern pixels combine with the module colour.
    #[serde(default)]
    pub blend: BlendMode,
}

fn default_opacity() -> f32 {
    1.0
}

impl PatternFill {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            opacity: 1.0,
            blend: BlendMode::Normal,
        }
    }
}

/// Output encoding for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Full configuration for one generation/export cycle.
///
/// Created per user edit, consumed synchronously, and discarded after the
/// styled artifact is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Text to encode, intended as a URL.
    pub text: String,

    /// Output size in pixels (square).
    #[serde(default = "default_size")]
    pub size: u32,

    /// Colour of dark modules.
    #[serde(default = "default_foreground")]
    pub foreground: Colour,

    /// Colour of light modules and background.
    #[serde(default = "default_background")]
    pub background: Colour,

    /// Visual style.
    #[serde(default)]
    pub style: QrStyle,

    /// Quiet-zone width in module units.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Optional image-pattern fill for dark modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternFill>,
}

fn default_size() -> u32 {
    400
}

fn default_foreground() -> Colour {
    Colour::BLACK
}

fn default_background() -> Colour {
    Colour::WHITE
}

fn default_margin() -> u32 {
    2
}

impl StyleConfig {
    /// Minimal config for a text with library defaults for everything else.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: default_size(),
            foreground: default_foreground(),
            background: default_background(),
            style: QrStyle::default(),
            margin: default_margin(),
            pattern: None,
        }
    }

    /// Check hard constraints, returning warning messages for soft ones.
    ///
    /// Empty text and a zero size are errors; identical foreground and
    /// background colours only warn (the pipeline does not enforce contrast).
    pub fn validate(&self) -> Result<Vec<String>> {
        if self.text.trim().is_empty() {
            return Err(QrsmithError::input("text must not be empty"));
        }
        if self.size == 0 {
            return Err(QrsmithError::Input {
                message: "size must be a positive number of pixels".to_string(),
                help: Some("Typical sizes are 200-1000".to_string()),
            });
        }
        if let Some(pattern) = &self.pattern {
            if !(0.0..=1.0).contains(&pattern.opacity) {
                return Err(QrsmithError::input("pattern opacity must be in [0, 1]"));
            }
        }

        let mut warnings = Vec::new();
        if self.foreground == self.background {
            warnings.push(
                "foreground and background colours are identical; the code will not scan"
                    .to_string(),
            );
        }
        if self.pattern.is_some() && self.style == QrStyle::Dots {
            warnings.push(
                "pattern fills replace the dots style; the pattern takes precedence".to_string(),
            );
        }
        Ok(warnings)
    }
}

/// Serde adapter storing raw bytes as standard base64.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = StyleConfig::new("https://example.com");
        assert_eq!(config.size, 400);
        assert_eq!(config.foreground, Colour::BLACK);
        assert_eq!(config.background, Colour::WHITE);
        assert_eq!(config.style, QrStyle::Square);
        assert_eq!(config.margin, 2);
        assert!(config.pattern.is_none());
    }

    #[test]
    fn test_validate_empty_text() {
        let config = StyleConfig::new("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_size() {
        let mut config = StyleConfig::new("https://example.com");
        config.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_same_colours_warns() {
        let mut config = StyleConfig::new("https://example.com");
        config.background = config.foreground;
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("identical"));
    }

    #[test]
    fn test_validate_pattern_opacity_range() {
        let mut config = StyleConfig::new("https://example.com");
        let mut pattern = PatternFill::new(vec![1, 2, 3]);
        pattern.opacity = 1.5;
        config.pattern = Some(pattern);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("rounded".parse::<QrStyle>().unwrap(), QrStyle::Rounded);
        assert_eq!("DOTS".parse::<QrStyle>().unwrap(), QrStyle::Dots);
        assert!("swirly".parse::<QrStyle>().is_err());
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let yaml = r##"
text: https://example.com
size: 512
foreground: "#1a1a2e"
style: artistic
"##;
        let config: StyleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.size, 512);
        assert_eq!(config.foreground, Colour::rgb(0x1a, 0x1a, 0x2e));
        assert_eq!(config.style, QrStyle::Artistic);
        // Unspecified fields take defaults
        assert_eq!(config.margin, 2);

        let back = serde_yaml::to_string(&config).unwrap();
        let reparsed: StyleConfig = serde_yaml::from_str(&back).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_pattern_base64_roundtrip() {
        let mut config = StyleConfig::new("https://example.com");
        config.pattern = Some(PatternFill::new(vec![0x89, 0x50, 0x4e, 0x47]));

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("iVBORw")); // base64 of the PNG magic
        let back: StyleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Svg.extension(), "svg");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
    }
}

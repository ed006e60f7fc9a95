//! Generate command implementation.
//!
//! Builds a style configuration from flags or a config file, validates the
//! URL, and exports the requested formats.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{QrsmithError, Result};
use crate::export::{export_all, Exporter};
use crate::history::{HistorySink, JsonlHistory, NullHistory};
use crate::output::{display_path, Printer};
use crate::types::{BlendMode, Colour, ExportFormat, PatternFill, QrStyle, StyleConfig};
use crate::url::{format_url, is_valid_url};

/// Generate a styled QR code and export it
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// URL to encode (bare domains gain https://)
    #[arg(required_unless_present = "config")]
    pub url: Option<String>,

    /// Style configuration file (JSON or YAML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output formats
    #[arg(long, short, value_enum, default_values_t = vec![ExportFormat::Png])]
    pub format: Vec<ExportFormat>,

    /// Output directory
    #[arg(long, short, default_value = "dist")]
    pub output: PathBuf,

    /// Image size in pixels
    #[arg(long)]
    pub size: Option<u32>,

    /// Foreground (dark module) colour, hex
    #[arg(long)]
    pub foreground: Option<String>,

    /// Background colour, hex
    #[arg(long)]
    pub background: Option<String>,

    /// Visual style
    #[arg(long, value_enum)]
    pub style: Option<QrStyle>,

    /// Quiet-zone width in modules
    #[arg(long)]
    pub margin: Option<u32>,

    /// Image file tiled into dark modules
    #[arg(long)]
    pub pattern: Option<PathBuf>,

    /// Pattern opacity in [0, 1]
    #[arg(long, default_value = "1.0")]
    pub pattern_opacity: f32,

    /// Pattern blend mode
    #[arg(long, value_enum, default_value = "normal")]
    pub pattern_blend: BlendMode,

    /// Append an export record to this JSONL history file
    #[arg(long)]
    pub history: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let printer = Printer::new();
    let config = build_config(&args)?;

    for warning in config.validate()? {
        printer.warning("Warning", &warning);
    }

    let mut history: Box<dyn HistorySink> = match &args.history {
        Some(path) => Box::new(JsonlHistory::new(path)),
        None => Box::new(NullHistory),
    };

    let exporter = Exporter::new(&args.output);
    let paths = export_all(&exporter, &config, &args.format, history.as_mut())?;

    for path in &paths {
        printer.status("Exported", &display_path(path));
    }
    printer.success(
        "Finished",
        &format!("{} artifact(s) in {}", paths.len(), display_path(&args.output)),
    );

    Ok(())
}

/// Merge the config file (if any) with command-line overrides.
fn build_config(args: &GenerateArgs) -> Result<StyleConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => StyleConfig::new(args.url.clone().unwrap_or_default()),
    };

    if let Some(url) = &args.url {
        config.text = url.clone();
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(fg) = &args.foreground {
        config.foreground = Colour::from_hex(fg)?;
    }
    if let Some(bg) = &args.background {
        config.background = Colour::from_hex(bg)?;
    }
    if let Some(style) = args.style {
        config.style = style;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if let Some(pattern_path) = &args.pattern {
        let image = fs::read(pattern_path).map_err(|e| QrsmithError::Io {
            path: pattern_path.clone(),
            message: format!("Failed to read pattern image: {}", e),
        })?;
        config.pattern = Some(PatternFill {
            image,
            opacity: args.pattern_opacity,
            blend: args.pattern_blend,
        });
    }

    if !is_valid_url(&config.text) {
        return Err(QrsmithError::Input {
            message: format!("not a valid URL: {:?}", config.text),
            help: Some("Provide an absolute URL or a bare domain like example.com".to_string()),
        });
    }
    config.text = format_url(&config.text);

    Ok(config)
}

/// Load a StyleConfig from a JSON or YAML file, chosen by extension.
fn load_config_file(path: &PathBuf) -> Result<StyleConfig> {
    let source = fs::read_to_string(path).map_err(|e| QrsmithError::Io {
        path: path.clone(),
        message: format!("Failed to read config file: {}", e),
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&source).map_err(|e| QrsmithError::Parse {
            message: format!("Invalid config file {}: {}", path.display(), e),
            help: None,
        })
    } else {
        serde_yaml::from_str(&source).map_err(|e| QrsmithError::Parse {
            message: format!("Invalid config file {}: {}", path.display(), e),
            help: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(url: &str, output: PathBuf) -> GenerateArgs {
        GenerateArgs {
            url: Some(url.to_string()),
            config: None,
            format: vec![ExportFormat::Png],
            output,
            size: None,
            foreground: None,
            background: None,
            style: None,
            margin: None,
            pattern: None,
            pattern_opacity: 1.0,
            pattern_blend: BlendMode::Normal,
            history: None,
        }
    }

    #[test]
    fn test_generate_bare_domain() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");

        run(args("example.com", output.clone())).unwrap();

        let entries: Vec<_> = fs::read_dir(&output).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_generate_rejects_invalid_url() {
        let dir = tempdir().unwrap();
        let result = run(args("not a url!!", dir.path().to_path_buf()));
        assert!(matches!(result, Err(QrsmithError::Input { .. })));
    }

    #[test]
    fn test_generate_multiple_formats_with_history() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        let history = dir.path().join("history.jsonl");

        let mut a = args("https://example.com", output.clone());
        a.format = vec![ExportFormat::Png, ExportFormat::Svg, ExportFormat::Pdf];
        a.style = Some(QrStyle::Rounded);
        a.history = Some(history.clone());
        run(a).unwrap();

        assert_eq!(fs::read_dir(&output).unwrap().count(), 3);
        assert_eq!(fs::read_to_string(&history).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_config_file_with_flag_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("style.yaml");
        fs::write(
            &config_path,
            "text: example.com\nsize: 256\nstyle: dots\n",
        )
        .unwrap();

        let mut a = args("https://other.org", dir.path().join("out"));
        a.config = Some(config_path);
        a.size = Some(512);

        let config = build_config(&a).unwrap();
        // Flag overrides file for url and size; file wins for style.
        assert_eq!(config.text, "https://other.org");
        assert_eq!(config.size, 512);
        assert_eq!(config.style, QrStyle::Dots);
    }

    #[test]
    fn test_config_file_url_is_normalized() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("style.json");
        fs::write(&config_path, r#"{"text": "example.com"}"#).unwrap();

        let mut a = args("x", dir.path().join("out"));
        a.url = None;
        a.config = Some(config_path);

        let config = build_config(&a).unwrap();
        assert_eq!(config.text, "https://example.com");
    }
}

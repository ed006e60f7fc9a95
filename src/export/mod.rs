//! Export orchestration.
//!
//! Sequences styling, format-specific encoding, and the file save, then
//! notifies the history sink. Styling failure falls back to the unstyled
//! base artifact; history failure is logged and swallowed. Only input,
//! encoding, and export errors surface to the caller.

mod pdf;

pub use pdf::{compose_pdf, placement, PAGE_HEIGHT_MM, PAGE_MARGIN_MM, PAGE_WIDTH_MM};

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::error::{QrsmithError, Result};
use crate::history::{HistoryRecord, HistorySink};
use crate::output::Printer;
use crate::style::{apply_raster_style, apply_vector_style, or_base, StyledArtifact};
use crate::symbol::{decode_png_data_url, render_raster, render_svg, to_png_bytes, Symbol};
use crate::types::{ExportFormat, QrStyle, StyleConfig};

/// Writes styled artifacts to an output directory with timestamped
/// filenames.
pub struct Exporter {
    output_dir: PathBuf,
    base_name: String,
    printer: Printer,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: "qr-code".to_string(),
            printer: Printer::new(),
        }
    }

    /// Override the fixed filename base (default `qr-code`).
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    /// Run the full pipeline for one format: encode, style (with fallback),
    /// encode to the target format, save, and notify the history sink.
    ///
    /// Returns the path of the written file.
    pub fn export(
        &self,
        config: &StyleConfig,
        format: ExportFormat,
        history: &mut dyn HistorySink,
    ) -> Result<PathBuf> {
        let symbol = Symbol::encode(&config.text)?;
        let artifact = self.styled_artifact(&symbol, config, format);
        let path = self.write_artifact(&artifact, format)?;
        self.record_history(config, format, history);
        Ok(path)
    }

    /// Build the styled artifact a format needs, degrading to the base on
    /// styling failure.
    fn styled_artifact(
        &self,
        symbol: &Symbol,
        config: &StyleConfig,
        format: ExportFormat,
    ) -> StyledArtifact {
        match format {
            ExportFormat::Png | ExportFormat::Pdf => {
                let base = render_raster(symbol, config);
                // Square with no pattern needs no styling pass at all.
                let image = if config.style == QrStyle::Square && config.pattern.is_none() {
                    base
                } else {
                    or_base(apply_raster_style(&base, config), base, |err| {
                        self.printer
                            .warning("Styling", &format!("{}; using unstyled image", err));
                    })
                };
                StyledArtifact::Raster {
                    image,
                    style: config.style,
                }
            }
            ExportFormat::Svg => {
                let base = render_svg(symbol, config);
                StyledArtifact::Vector {
                    markup: apply_vector_style(&base, config),
                    style: config.style,
                }
            }
        }
    }

    /// Encode and save an already-styled artifact.
    pub fn write_artifact(
        &self,
        artifact: &StyledArtifact,
        format: ExportFormat,
    ) -> Result<PathBuf> {
        let bytes = match (artifact, format) {
            (StyledArtifact::Raster { image, .. }, ExportFormat::Png) => to_png_bytes(image)?,
            (StyledArtifact::Raster { image, .. }, ExportFormat::Pdf) => {
                compose_pdf(&to_png_bytes(image)?)?
            }
            (StyledArtifact::Vector { markup, .. }, ExportFormat::Svg) => {
                markup.as_bytes().to_vec()
            }
            _ => {
                return Err(QrsmithError::export(format!(
                    "artifact kind does not match format {}",
                    format
                )))
            }
        };
        self.save(&bytes, format)
    }

    /// Save a pre-serialized artifact: a PNG data-URL for raster formats, or
    /// SVG markup for the vector format.
    pub fn export_serialized(&self, artifact: &str, format: ExportFormat) -> Result<PathBuf> {
        match format {
            ExportFormat::Png => {
                let image = decode_png_data_url(artifact)?;
                self.save(&to_png_bytes(&image)?, format)
            }
            ExportFormat::Pdf => {
                let image = decode_png_data_url(artifact)?;
                self.save(&compose_pdf(&to_png_bytes(&image)?)?, format)
            }
            ExportFormat::Svg => self.save(artifact.as_bytes(), format),
        }
    }

    fn save(&self, bytes: &[u8], format: ExportFormat) -> Result<PathBuf> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).map_err(|e| QrsmithError::Io {
                path: self.output_dir.clone(),
                message: format!("Failed to create output directory: {}", e),
            })?;
        }

        let path = self.output_dir.join(self.filename(format));
        fs::write(&path, bytes).map_err(|e| QrsmithError::Io {
            path: path.clone(),
            message: format!("Failed to write artifact: {}", e),
        })?;
        Ok(path)
    }

    /// Fixed base name suffixed with the current timestamp and extension.
    fn filename(&self, format: ExportFormat) -> String {
        format!(
            "{}-{}.{}",
            self.base_name,
            Local::now().format("%Y%m%d-%H%M%S"),
            format.extension()
        )
    }

    /// Best-effort history notification; failures are logged and swallowed.
    fn record_history(
        &self,
        config: &StyleConfig,
        format: ExportFormat,
        history: &mut dyn HistorySink,
    ) {
        let record = HistoryRecord {
            url: config.text.clone(),
            style: config.style,
            foreground: config.foreground,
            background: config.background,
            format,
            exported_at: Local::now().to_rfc3339(),
        };
        if let Err(err) = history.record(&record) {
            self.printer
                .warning("History", &format!("notification failed: {}", err));
        }
    }
}

/// Write a styled artifact for every requested format.
pub fn export_all(
    exporter: &Exporter,
    config: &StyleConfig,
    formats: &[ExportFormat],
    history: &mut dyn HistorySink,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(formats.len());
    for &format in formats {
        paths.push(exporter.export(config, format, history)?);
    }
    Ok(paths)
}

//! Encoded QR module matrix.

use qrcode::{Color, EcLevel, QrCode};

use crate::error::{QrsmithError, Result};

/// An encoded QR symbol: the dark/light module grid.
///
/// The matrix is first-class here so the renderers draw exact module
/// boundaries; the styling stages downstream deliberately never see it and
/// operate on serialized artifacts only.
#[derive(Debug, Clone)]
pub struct Symbol {
    modules: Vec<bool>,
    width: usize,
}

impl Symbol {
    /// Encode `text` at the middle error-correction tier.
    pub fn encode(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(QrsmithError::input("text must not be empty"));
        }

        let code = QrCode::with_error_correction_level(text, EcLevel::M).map_err(|e| {
            QrsmithError::Encoding {
                message: e.to_string(),
            }
        })?;

        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        Ok(Self { modules, width })
    }

    /// Side length of the symbol in modules (quiet zone excluded).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (x, y) is dark. Out-of-range coordinates are
    /// light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }

    /// Count of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

//! Styling stage: turns base artifacts into styled ones.
//!
//! Styling failure is never fatal. The raster engine returns `Result` and
//! callers compose it with [`or_base`]; the vector engine returns its input
//! unchanged on internal failure.

mod raster;
mod vector;

pub use raster::apply_style as apply_raster_style;
pub use vector::apply_style as apply_vector_style;

use image::RgbaImage;

use crate::error::{QrsmithError, Result};
use crate::symbol::{render_raster, render_svg, to_png_data_url, Symbol};
use crate::types::{QrStyle, StyleConfig};

/// A styled artifact, tagged with the style that produced it. Ephemeral:
/// consumed by the export stage within a single generation cycle.
#[derive(Debug, Clone)]
pub enum StyledArtifact {
    Raster { image: RgbaImage, style: QrStyle },
    Vector { markup: String, style: QrStyle },
}

impl StyledArtifact {
    /// The style this artifact carries.
    pub fn style(&self) -> QrStyle {
        match self {
            StyledArtifact::Raster { style, .. } => *style,
            StyledArtifact::Vector { style, .. } => *style,
        }
    }
}

/// Substitute `base` when styling failed, reporting the error to
/// `on_fallback` first. The explicit combinator keeps the degradation
/// visible at the call site instead of being swallowed inside the engine.
pub fn or_base<T>(
    styled: Result<T>,
    base: T,
    on_fallback: impl FnOnce(&QrsmithError),
) -> T {
    match styled {
        Ok(value) => value,
        Err(err) => {
            on_fallback(&err);
            base
        }
    }
}

/// Produce a styled raster artifact for `config`, as a PNG data-URL.
///
/// Never fails for valid text: styling errors degrade to the unstyled base
/// raster.
pub fn generate_raster_artifact(config: &StyleConfig) -> Result<String> {
    let symbol = Symbol::encode(&config.text)?;
    let base = render_raster(&symbol, config);
    let styled = or_base(apply_raster_style(&base, config), base, |_| {});
    to_png_data_url(&styled)
}

/// Produce a styled vector artifact for `config`, as SVG markup.
///
/// Never fails for valid text: the vector engine degrades to the base
/// markup internally.
pub fn generate_vector_artifact(config: &StyleConfig) -> Result<String> {
    let symbol = Symbol::encode(&config.text)?;
    let base = render_svg(&symbol, config);
    Ok(apply_vector_style(&base, config))
}

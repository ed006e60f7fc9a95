//! qrsmith - styled QR code pipeline
//!
//! A library for turning URLs into styled QR codes and exporting them as
//! PNG, SVG, or PDF. The pipeline is: normalize the URL, encode the base
//! symbol, apply a visual style (raster compositing or SVG rewriting), then
//! export with graceful degradation on styling failure.

pub mod cli;
pub mod error;
pub mod export;
pub mod history;
pub mod output;
pub mod style;
pub mod symbol;
pub mod types;
pub mod url;

pub use error::{QrsmithError, Result};
pub use export::{compose_pdf, export_all, placement, Exporter};
pub use history::{HistoryRecord, HistorySink, JsonlHistory, NullHistory};
pub use style::{
    apply_raster_style, apply_vector_style, generate_raster_artifact, generate_vector_artifact,
    or_base, StyledArtifact,
};
pub use symbol::{
    decode_png_data_url, render_raster, render_svg, to_png_bytes, to_png_data_url, Symbol,
};
pub use types::{
    adjust_colour_brightness, BlendMode, Colour, ExportFormat, PatternFill, QrStyle, StyleConfig,
};
pub use url::{format_url, is_valid_url};

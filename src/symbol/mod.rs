//! Base symbol generation.
//!
//! Wraps the external QR encoder and renders the encoded module matrix into
//! the two serialized forms the styling stages consume: a raster image and an
//! SVG markup string. Error correction is fixed at the middle tier.

mod matrix;
mod raster;
mod svg;

pub use matrix::Symbol;
pub use raster::{decode_png_data_url, render_raster, to_png_bytes, to_png_data_url};
pub use svg::render_svg;

//! Core types shared across the pipeline.

mod colour;
mod config;

pub use colour::{adjust_colour_brightness, Colour};
pub use config::{BlendMode, ExportFormat, PatternFill, QrStyle, StyleConfig};

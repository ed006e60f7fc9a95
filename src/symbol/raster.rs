//! Raster rendering of the base symbol.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{QrsmithError, Result};
use crate::types::StyleConfig;

use super::Symbol;

/// Render the symbol to a square RGBA image of exactly `config.size` pixels.
///
/// Each output pixel is mapped back onto the module grid (symbol plus quiet
/// zone), so the image is exact-size rather than snapped to a whole number of
/// pixels per module.
pub fn render_raster(symbol: &Symbol, config: &StyleConfig) -> RgbaImage {
    let size = config.size;
    let total = symbol.width() + 2 * config.margin as usize;
    let fg = Rgba(config.foreground.to_rgba());
    let bg = Rgba(config.background.to_rgba());

    let mut img: RgbaImage = ImageBuffer::from_pixel(size, size, bg);

    for y in 0..size {
        let my = (y as usize * total) / size as usize;
        for x in 0..size {
            let mx = (x as usize * total) / size as usize;
            let in_symbol = mx >= config.margin as usize
                && my >= config.margin as usize
                && mx - (config.margin as usize) < symbol.width()
                && my - (config.margin as usize) < symbol.width();
            if in_symbol
                && symbol.is_dark(mx - config.margin as usize, my - config.margin as usize)
            {
                img.put_pixel(x, y, fg);
            }
        }
    }

    img
}

/// Encode an image as PNG bytes.
pub fn to_png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| QrsmithError::export(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

/// Encode an image as a `data:image/png;base64,` URL.
pub fn to_png_data_url(image: &RgbaImage) -> Result<String> {
    let bytes = to_png_bytes(image)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
}

/// Decode a PNG data-URL back into an RGBA image.
pub fn decode_png_data_url(data_url: &str) -> Result<RgbaImage> {
    let payload = data_url
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(data_url);

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| QrsmithError::input(format!("invalid base64 image data: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| QrsmithError::input(format!("undecodable image data: {}", e)))?;
    Ok(img.to_rgba8())
}

//! Raster styling engine.
//!
//! Operates purely on the rendered pixels of the base raster: the module
//! grid is re-estimated from pixel luminance rather than read from the
//! encoder, because serialized artifacts are all this stage is given. Grid
//! estimation uses a fixed divisor of the image width (50 for dots, 25 for
//! pattern fills).

use image::{ImageBuffer, Rgba, RgbaImage};
use rand::Rng;

use crate::error::{QrsmithError, Result};
use crate::types::{BlendMode, Colour, PatternFill, QrStyle, StyleConfig};

/// Luminance below this counts a sampled cell as part of the symbol.
const DARK_THRESHOLD: u8 = 128;

/// Grid divisor for the dots style.
const DOTS_GRID_DIVISOR: u32 = 50;

/// Grid divisor for pattern fills (coarser cells so the tile shows).
const PATTERN_GRID_DIVISOR: u32 = 25;

/// Corner radius for the rounded style, as a fraction of the shorter
/// dimension (spec'd range is 8-10%).
const CORNER_RADIUS_FRACTION: f64 = 0.09;

/// Brightness delta for deriving the artistic gradient stops.
const GRADIENT_DELTA: i32 = 40;

/// Apply `config.style` (and any pattern fill) to a rendered base raster.
///
/// Returns a new image; the input is never mutated. `Square` with no pattern
/// is the identity. Errors here are recoverable by the caller: the export
/// orchestrator substitutes the unstyled base on failure.
pub fn apply_style(image: &RgbaImage, config: &StyleConfig) -> Result<RgbaImage> {
    let mut out = image.clone();

    if let Some(pattern) = &config.pattern {
        out = pattern_fill(&out, pattern)?;
        // Pattern fills take the place of dot conversion; rounded and
        // artistic still compose on top.
        match config.style {
            QrStyle::Rounded => out = rounded_mask(&out),
            QrStyle::Artistic => out = artistic_overlay(&out, config),
            QrStyle::Square | QrStyle::Dots => {}
        }
        return Ok(out);
    }

    match config.style {
        QrStyle::Square => Ok(out),
        QrStyle::Rounded => Ok(rounded_mask(&out)),
        QrStyle::Dots => Ok(dots(&out, config)),
        QrStyle::Artistic => Ok(artistic_overlay(&out, config)),
    }
}

/// Keep only pixels inside a rounded rectangle covering the whole image;
/// everything outside the mask becomes fully transparent.
fn rounded_mask(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let radius = (w.min(h) as f64 * CORNER_RADIUS_FRACTION).max(1.0);

    let mut out = image.clone();
    for y in 0..h {
        for x in 0..w {
            if !inside_rounded_rect(x, y, w, h, radius) {
                out.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }
    out
}

/// Point-in-rounded-rect test against the four corner arcs.
fn inside_rounded_rect(x: u32, y: u32, w: u32, h: u32, radius: f64) -> bool {
    let fx = x as f64 + 0.5;
    let fy = y as f64 + 0.5;
    let (w, h) = (w as f64, h as f64);

    // Corner centres; a pixel is outside only when it sits in a corner
    // square and beyond the arc.
    let corners = [
        (radius, radius),
        (w - radius, radius),
        (radius, h - radius),
        (w - radius, h - radius),
    ];

    for &(cx, cy) in &corners {
        let in_corner_x = if cx <= radius { fx < cx } else { fx > cx };
        let in_corner_y = if cy <= radius { fy < cy } else { fy > cy };
        if in_corner_x && in_corner_y {
            let dx = fx - cx;
            let dy = fy - cy;
            if dx * dx + dy * dy > radius * radius {
                return false;
            }
        }
    }
    true
}

/// Redraw the symbol as filled circles on a background-coloured canvas.
///
/// The module grid is approximated as `width / 50` pixel cells; each cell's
/// centre pixel decides whether the cell is dark and what colour its dot is.
fn dots(image: &RgbaImage, config: &StyleConfig) -> RgbaImage {
    let (w, h) = image.dimensions();
    let module = (w / DOTS_GRID_DIVISOR).max(1);

    let mut out: RgbaImage = ImageBuffer::from_pixel(w, h, Rgba(config.background.to_rgba()));

    let mut cy = 0;
    while cy < h {
        let mut cx = 0;
        while cx < w {
            let centre_x = (cx + module / 2).min(w - 1);
            let centre_y = (cy + module / 2).min(h - 1);
            let sample = *image.get_pixel(centre_x, centre_y);

            if pixel_luminance(sample) < DARK_THRESHOLD {
                draw_circle(&mut out, cx, cy, module, sample);
            }
            cx += module;
        }
        cy += module;
    }

    out
}

/// Fill a circle inscribed in the cell at (px, py).
fn draw_circle(img: &mut RgbaImage, px: u32, py: u32, module: u32, colour: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let centre_x = px as f64 + module as f64 / 2.0;
    let centre_y = py as f64 + module as f64 / 2.0;
    let radius = module as f64 / 2.0;
    let r_sq = radius * radius;

    for dy in 0..module {
        for dx in 0..module {
            let ix = px + dx;
            let iy = py + dy;
            if ix < w && iy < h {
                let dist_x = ix as f64 + 0.5 - centre_x;
                let dist_y = iy as f64 + 0.5 - centre_y;
                if dist_x * dist_x + dist_y * dist_y <= r_sq {
                    img.put_pixel(ix, iy, colour);
                }
            }
        }
    }
}

/// Multiply-blend a diagonal three-stop gradient over the image, scatter
/// sparse light specks with an overlay blend, then add a soft glow from a
/// small-radius blur.
fn artistic_overlay(image: &RgbaImage, config: &StyleConfig) -> RgbaImage {
    let (w, h) = image.dimensions();
    let stops = [
        config.foreground.adjusted(GRADIENT_DELTA),
        config.foreground,
        config.foreground.adjusted(-GRADIENT_DELTA),
    ];

    let mut out = image.clone();

    // Diagonal gradient, multiply blend.
    let span = (w + h).saturating_sub(2).max(1) as f32;
    for y in 0..h {
        for x in 0..w {
            let t = (x + y) as f32 / span;
            let grad = gradient_at(&stops, t);
            let base = *out.get_pixel(x, y);
            let blended = Rgba([
                multiply_channel(base.0[0], grad.r),
                multiply_channel(base.0[1], grad.g),
                multiply_channel(base.0[2], grad.b),
                base.0[3],
            ]);
            out.put_pixel(x, y, blended);
        }
    }

    // Sparse light noise specks, overlay blend. Speck colour is a strongly
    // lightened variant of the foreground.
    let speck = config.foreground.with_lightness(85.0);
    let mut rng = rand::thread_rng();
    let speck_count = ((w * h) / 600).max(1);
    for _ in 0..speck_count {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(0..h);
        let base = *out.get_pixel(x, y);
        let blended = Rgba([
            overlay_channel(base.0[0], speck.r),
            overlay_channel(base.0[1], speck.g),
            overlay_channel(base.0[2], speck.b),
            base.0[3],
        ]);
        out.put_pixel(x, y, blended);
    }

    // Soft glow: screen a blurred copy back over the result at low opacity.
    let blurred = image::imageops::blur(&out, 2.0);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let soft = blurred.get_pixel(x, y);
        for c in 0..3 {
            let screened = screen_channel(pixel.0[c], soft.0[c]);
            pixel.0[c] = mix_channel(pixel.0[c], screened, 0.25);
        }
    }

    out
}

/// Sample a three-stop gradient at `t` in [0, 1].
fn gradient_at(stops: &[Colour; 3], t: f32) -> Colour {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        stops[0].mix(stops[1], t * 2.0)
    } else {
        stops[1].mix(stops[2], (t - 0.5) * 2.0)
    }
}

/// Tile the pattern image into cells classified as dark.
///
/// Cells are estimated at `width / 25` pixels; the centre-pixel luminance
/// test matches the dots style. Pattern pixels land with the configured
/// opacity and blend mode. Undecodable pattern data is a styling error,
/// recovered upstream by falling back to the un-patterned artifact.
fn pattern_fill(image: &RgbaImage, pattern: &PatternFill) -> Result<RgbaImage> {
    let tile = image::load_from_memory(&pattern.image)
        .map_err(|e| QrsmithError::styling(format!("pattern image failed to decode: {}", e)))?
        .to_rgba8();
    if tile.width() == 0 || tile.height() == 0 {
        return Err(QrsmithError::styling("pattern image is empty"));
    }

    let (w, h) = image.dimensions();
    let module = (w / PATTERN_GRID_DIVISOR).max(1);
    let opacity = pattern.opacity.clamp(0.0, 1.0);

    let mut out = image.clone();

    let mut cy = 0;
    while cy < h {
        let mut cx = 0;
        while cx < w {
            let centre_x = (cx + module / 2).min(w - 1);
            let centre_y = (cy + module / 2).min(h - 1);
            if pixel_luminance(*image.get_pixel(centre_x, centre_y)) < DARK_THRESHOLD {
                stamp_cell(&mut out, &tile, cx, cy, module, opacity, pattern.blend);
            }
            cx += module;
        }
        cy += module;
    }

    Ok(out)
}

/// Stamp tiled pattern pixels into one cell.
fn stamp_cell(
    out: &mut RgbaImage,
    tile: &RgbaImage,
    cx: u32,
    cy: u32,
    module: u32,
    opacity: f32,
    blend: BlendMode,
) {
    let (w, h) = out.dimensions();
    for dy in 0..module {
        for dx in 0..module {
            let ix = cx + dx;
            let iy = cy + dy;
            if ix >= w || iy >= h {
                continue;
            }
            let src = *tile.get_pixel(ix % tile.width(), iy % tile.height());
            let dest = *out.get_pixel(ix, iy);
            out.put_pixel(ix, iy, composite(dest, src, opacity, blend));
        }
    }
}

/// Combine a pattern pixel over a destination pixel.
fn composite(dest: Rgba<u8>, src: Rgba<u8>, opacity: f32, blend: BlendMode) -> Rgba<u8> {
    let mixed = match blend {
        BlendMode::Normal => src,
        BlendMode::Multiply => Rgba([
            multiply_channel(dest.0[0], src.0[0]),
            multiply_channel(dest.0[1], src.0[1]),
            multiply_channel(dest.0[2], src.0[2]),
            src.0[3],
        ]),
        BlendMode::Overlay => Rgba([
            overlay_channel(dest.0[0], src.0[0]),
            overlay_channel(dest.0[1], src.0[1]),
            overlay_channel(dest.0[2], src.0[2]),
            src.0[3],
        ]),
    };

    // Source-over with coverage scaled by pattern opacity.
    let alpha = (mixed.0[3] as f32 / 255.0) * opacity;
    Rgba([
        mix_channel(dest.0[0], mixed.0[0], alpha),
        mix_channel(dest.0[1], mixed.0[1], alpha),
        mix_channel(dest.0[2], mixed.0[2], alpha),
        dest.0[3].max((alpha * 255.0).round() as u8),
    ])
}

fn pixel_luminance(p: Rgba<u8>) -> u8 {
    ((p.0[0] as u16 + p.0[1] as u16 + p.0[2] as u16) / 3) as u8
}

fn multiply_channel(base: u8, top: u8) -> u8 {
    ((base as u16 * top as u16) / 255) as u8
}

fn screen_channel(base: u8, top: u8) -> u8 {
    255 - (((255 - base as u16) * (255 - top as u16)) / 255) as u8
}

fn overlay_channel(base: u8, top: u8) -> u8 {
    if base < 128 {
        ((2 * base as u16 * top as u16) / 255) as u8
    } else {
        255 - ((2 * (255 - base as u16) * (255 - top as u16)) / 255) as u8
    }
}

fn mix_channel(base: u8, top: u8, factor: f32) -> u8 {
    let factor = factor.clamp(0.0, 1.0);
    (base as f32 * (1.0 - factor) + top as f32 * factor).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{render_raster, Symbol};
    use crate::types::{PatternFill, StyleConfig};
    use std::io::Cursor;

    fn base_image(style: QrStyle) -> (RgbaImage, StyleConfig) {
        let mut config = StyleConfig::new("https://example.com");
        config.style = style;
        let symbol = Symbol::encode(&config.text).unwrap();
        let img = render_raster(&symbol, &config);
        (img, config)
    }

    fn tiny_png(colour: [u8; 4]) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba(colour));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_square_is_identity() {
        let (img, config) = base_image(QrStyle::Square);
        let styled = apply_style(&img, &config).unwrap();
        assert_eq!(styled.as_raw(), img.as_raw());
    }

    #[test]
    fn test_rounded_clears_corners_keeps_centre() {
        let (img, config) = base_image(QrStyle::Rounded);
        let styled = apply_style(&img, &config).unwrap();

        assert_eq!(styled.get_pixel(0, 0).0[3], 0);
        assert_eq!(styled.get_pixel(399, 0).0[3], 0);
        assert_eq!(styled.get_pixel(0, 399).0[3], 0);
        assert_eq!(styled.get_pixel(399, 399).0[3], 0);
        // Centre untouched
        assert_eq!(styled.get_pixel(200, 200), img.get_pixel(200, 200));
        // Edge midpoints are inside the mask
        assert_eq!(styled.get_pixel(200, 0).0[3], 255);
    }

    #[test]
    fn test_dots_draws_circles_in_dark_cells() {
        // Synthetic 40x40 base: left half dark, right half light.
        let mut img: RgbaImage = ImageBuffer::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        for y in 0..40 {
            for x in 0..20 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let mut config = StyleConfig::new("https://example.com");
        config.style = QrStyle::Dots;
        config.size = 40;

        let styled = apply_style(&img, &config).unwrap();

        // 40/50 clamps to 1px cells: dark cells become 1px "circles", so the
        // dark half survives and the light half is background.
        assert_eq!(styled.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(styled.get_pixel(35, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_dots_on_rendered_symbol_produces_round_gaps() {
        let (img, config) = base_image(QrStyle::Dots);
        let styled = apply_style(&img, &config).unwrap();

        // Dots leave strictly fewer dark pixels than the square original.
        let dark = |i: &RgbaImage| {
            i.pixels()
                .filter(|p| pixel_luminance(**p) < DARK_THRESHOLD)
                .count()
        };
        let before = dark(&img);
        let after = dark(&styled);
        assert!(after > 0);
        assert!(after < before);
    }

    #[test]
    fn test_artistic_tints_image_and_keeps_size() {
        let mut config = StyleConfig::new("https://example.com");
        config.style = QrStyle::Artistic;
        // A light foreground keeps the multiply tint gentle and testable.
        config.foreground = Colour::rgb(60, 80, 200);
        let symbol = Symbol::encode(&config.text).unwrap();
        let img = render_raster(&symbol, &config);

        let styled = apply_style(&img, &config).unwrap();

        assert_eq!(styled.dimensions(), img.dimensions());
        assert_ne!(styled.as_raw(), img.as_raw());
        // The white background multiplied by the gradient takes on the tint:
        // blue channel stays well above red.
        let corner = styled.get_pixel(1, 1);
        assert!(corner.0[2] > corner.0[0]);
    }

    #[test]
    fn test_pattern_fill_stamps_dark_cells_only() {
        let (img, mut config) = base_image(QrStyle::Square);
        config.pattern = Some(PatternFill::new(tiny_png([255, 0, 0, 255])));

        let styled = apply_style(&img, &config).unwrap();

        // Quiet-zone corner cell is light: untouched.
        assert_eq!(styled.get_pixel(1, 1).0, [255, 255, 255, 255]);
        // Some formerly-black pixel is now the pattern colour.
        let has_red = styled.pixels().any(|p| p.0 == [255, 0, 0, 255]);
        assert!(has_red);
    }

    #[test]
    fn test_pattern_fill_undecodable_is_styling_error() {
        let (img, mut config) = base_image(QrStyle::Square);
        config.pattern = Some(PatternFill::new(vec![1, 2, 3, 4]));

        let err = apply_style(&img, &config).unwrap_err();
        assert!(matches!(err, QrsmithError::Styling { .. }));
    }

    #[test]
    fn test_pattern_takes_precedence_over_dots() {
        let (img, mut config) = base_image(QrStyle::Dots);
        config.pattern = Some(PatternFill::new(tiny_png([0, 255, 0, 255])));

        let styled = apply_style(&img, &config).unwrap();
        let has_green = styled.pixels().any(|p| p.0 == [0, 255, 0, 255]);
        assert!(has_green);
    }

    #[test]
    fn test_blend_channel_maths() {
        assert_eq!(multiply_channel(255, 255), 255);
        assert_eq!(multiply_channel(255, 0), 0);
        assert_eq!(screen_channel(0, 0), 0);
        assert_eq!(screen_channel(255, 10), 255);
        assert_eq!(overlay_channel(0, 200), 0);
        assert_eq!(overlay_channel(255, 10), 255);
        assert_eq!(mix_channel(0, 255, 0.5), 128);
    }

    #[test]
    fn test_gradient_endpoints() {
        let stops = [Colour::WHITE, Colour::rgb(128, 128, 128), Colour::BLACK];
        assert_eq!(gradient_at(&stops, 0.0), Colour::WHITE);
        assert_eq!(gradient_at(&stops, 1.0), Colour::BLACK);
        assert_eq!(gradient_at(&stops, 0.5), Colour::rgb(128, 128, 128));
    }
}

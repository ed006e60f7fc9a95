//! Vector styling engine.
//!
//! The SVG analogue of the raster engine: instead of pixel math, the module
//! rectangles emitted by the base renderer are structurally rewritten.
//! Internal failure is never fatal; the input markup is returned unchanged.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::types::{PatternFill, QrStyle, StyleConfig};

/// Corner radius for rounded module rects, as a fraction of module width.
const RECT_RADIUS_FRACTION: f64 = 0.3;

/// Brightness delta for the injected gradient's dark stop.
const GRADIENT_DELTA: i32 = 40;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Collision-free id for injected definitions. Monotonic across the process
/// so multiple styled SVGs can be embedded in one document.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Apply `config.style` (or the pattern fill, which takes precedence) to the
/// base SVG markup. Returns the input unchanged when the markup does not
/// have the expected structure.
pub fn apply_style(svg: &str, config: &StyleConfig) -> String {
    let rewritten = if let Some(pattern) = &config.pattern {
        pattern_rewrite(svg, pattern, config)
    } else {
        match config.style {
            QrStyle::Square => Some(svg.to_string()),
            QrStyle::Rounded => round_rects(svg),
            QrStyle::Dots => rects_to_circles(svg),
            QrStyle::Artistic => artistic_rewrite(svg, config),
        }
    };

    rewritten.unwrap_or_else(|| svg.to_string())
}

/// Parsed attributes of a module `<rect>`.
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Extract a double-quoted attribute value from an element string.
fn attr<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = element.find(&needle)? + needle.len();
    let end = element[start..].find('"')? + start;
    Some(&element[start..end])
}

fn parse_rect(element: &str) -> Option<Rect> {
    Some(Rect {
        x: attr(element, "x")?.parse().ok()?,
        y: attr(element, "y")?.parse().ok()?,
        width: attr(element, "width")?.parse().ok()?,
        height: attr(element, "height")?.parse().ok()?,
    })
}

/// Replace every self-closing `<rect .../>` element via `f`. Returns None if
/// any element fails to rewrite, leaving the caller to fall back.
fn rewrite_rects(svg: &str, mut f: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(svg.len() + 256);
    let mut rest = svg;
    while let Some(start) = rest.find("<rect ") {
        out.push_str(&rest[..start]);
        let end = rest[start..].find("/>")? + start + 2;
        out.push_str(&f(&rest[start..end])?);
        rest = &rest[end..];
    }
    out.push_str(rest);
    Some(out)
}

/// Insert a `<defs>` block right after the opening `<svg ...>` tag.
fn inject_defs(svg: &str, defs: &str) -> Option<String> {
    let open = svg.find("<svg")?;
    let tag_end = svg[open..].find('>')? + open + 1;
    let mut out = String::with_capacity(svg.len() + defs.len() + 1);
    out.push_str(&svg[..tag_end]);
    out.push('\n');
    out.push_str(defs);
    out.push_str(&svg[tag_end..]);
    Some(out)
}

/// Rounded style: corner-radius attribute on every module rect.
fn round_rects(svg: &str) -> Option<String> {
    rewrite_rects(svg, |element| {
        let rect = parse_rect(element)?;
        let radius = rect.width.min(rect.height) * RECT_RADIUS_FRACTION;
        let body = element.strip_suffix("/>")?.trim_end();
        Some(format!("{} rx=\"{:.2}\"/>", body, radius))
    })
}

/// Dots style: every module rect becomes a circle centred on it.
fn rects_to_circles(svg: &str) -> Option<String> {
    rewrite_rects(svg, |element| {
        let rect = parse_rect(element)?;
        let fill = attr(element, "fill")?;
        Some(format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            rect.x + rect.width / 2.0,
            rect.y + rect.height / 2.0,
            rect.width.min(rect.height) / 2.0,
            fill
        ))
    })
}

/// Artistic style: a linear gradient plus a drop-shadow filter in `<defs>`,
/// with every module fill rewritten to reference them.
fn artistic_rewrite(svg: &str, config: &StyleConfig) -> Option<String> {
    let gradient_id = unique_id("qr-gradient");
    let shadow_id = unique_id("qr-shadow");
    let base = config.foreground.to_svg_hex();
    let dark = config.foreground.adjusted(-GRADIENT_DELTA).to_svg_hex();

    let defs = format!(
        concat!(
            "<defs>\n",
            "<linearGradient id=\"{g}\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">\n",
            "<stop offset=\"0%\" stop-color=\"{base}\"/>\n",
            "<stop offset=\"100%\" stop-color=\"{dark}\"/>\n",
            "</linearGradient>\n",
            "<filter id=\"{s}\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">\n",
            "<feDropShadow dx=\"0\" dy=\"1\" stdDeviation=\"1.5\" flood-opacity=\"0.35\"/>\n",
            "</filter>\n",
            "</defs>\n",
        ),
        g = gradient_id,
        s = shadow_id,
        base = base,
        dark = dark,
    );

    let with_defs = inject_defs(svg, &defs)?;
    rewrite_rects(&with_defs, |element| {
        let rect = parse_rect(element)?;
        Some(format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" \
             fill=\"url(#{})\" filter=\"url(#{})\"/>",
            rect.x, rect.y, rect.width, rect.height, gradient_id, shadow_id
        ))
    })
}

/// Pattern fill: a tiled `<pattern>` definition referencing the embedded
/// image, with every module fill rewritten to it. Takes precedence over the
/// named styles.
fn pattern_rewrite(svg: &str, pattern: &PatternFill, config: &StyleConfig) -> Option<String> {
    // Only decode for dimensions; the tile ships as-is in the data URI.
    let decoded = image::load_from_memory(&pattern.image).ok()?;
    let (pw, ph) = (decoded.width(), decoded.height());
    if pw == 0 || ph == 0 {
        return None;
    }

    let pattern_id = unique_id("qr-pattern");
    let tile_w = config.size as f64 / 6.0;
    let tile_h = tile_w * ph as f64 / pw as f64;
    let data_uri = format!(
        "data:{};base64,{}",
        sniff_mime(&pattern.image),
        BASE64.encode(&pattern.image)
    );

    let defs = format!(
        concat!(
            "<defs>\n",
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" ",
            "width=\"{w:.2}\" height=\"{h:.2}\">\n",
            "<image href=\"{uri}\" width=\"{w:.2}\" height=\"{h:.2}\" ",
            "opacity=\"{opacity}\"/>\n",
            "</pattern>\n",
            "</defs>\n",
        ),
        id = pattern_id,
        w = tile_w,
        h = tile_h,
        uri = data_uri,
        opacity = pattern.opacity.clamp(0.0, 1.0),
    );

    let with_defs = inject_defs(svg, &defs)?;
    rewrite_rects(&with_defs, |element| {
        let rect = parse_rect(element)?;
        Some(format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"url(#{})\"/>",
            rect.x, rect.y, rect.width, rect.height, pattern_id
        ))
    })
}

/// Detect the MIME type of embedded image bytes from magic numbers.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]) {
        "image/png"
    } else if bytes.starts_with(&[0xff, 0xd8]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") {
        "image/webp"
    } else {
        "image/png"
    }
}

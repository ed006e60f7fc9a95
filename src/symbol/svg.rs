//! Vector rendering of the base symbol.
//!
//! One `<rect>` per dark module over a background `<path>`. Keeping the
//! modules as individual rectangles is what lets the vector styling engine
//! rewrite them structurally (corner radii, circle substitution, fill
//! references).

use crate::types::StyleConfig;

use super::Symbol;

/// Render the symbol as an SVG document string of `config.size` user units.
pub fn render_svg(symbol: &Symbol, config: &StyleConfig) -> String {
    let size = config.size;
    let total = symbol.width() + 2 * config.margin as usize;
    let module = size as f64 / total as f64;
    let fg = config.foreground.to_svg_hex();
    let bg = config.background.to_svg_hex();

    let mut svg = format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" ",
            "width=\"{size}\" height=\"{size}\">\n",
            "<path d=\"M0 0h{size}v{size}H0z\" fill=\"{bg}\"/>\n",
        ),
        size = size,
        bg = bg,
    );

    for y in 0..symbol.width() {
        for x in 0..symbol.width() {
            if symbol.is_dark(x, y) {
                let px = (x + config.margin as usize) as f64 * module;
                let py = (y + config.margin as usize) as f64 * module;
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
                    px, py, module, module, fg
                ));
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_structure() {
        let symbol = Symbol::encode("https://example.com").unwrap();
        let config = StyleConfig::new("https://example.com");
        let svg = render_svg(&symbol, &config);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("viewBox=\"0 0 400 400\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_one_rect_per_dark_module() {
        let symbol = Symbol::encode("https://example.com").unwrap();
        let config = StyleConfig::new("https://example.com");
        let svg = render_svg(&symbol, &config);

        let rects = svg.matches("<rect ").count();
        assert_eq!(rects, symbol.dark_count());
    }

    #[test]
    fn test_colours_in_markup() {
        let symbol = Symbol::encode("https://example.com").unwrap();
        let mut config = StyleConfig::new("https://example.com");
        config.foreground = crate::types::Colour::rgb(0x12, 0x34, 0x56);
        config.background = crate::types::Colour::rgb(0xfe, 0xdc, 0xba);
        let svg = render_svg(&symbol, &config);

        assert!(svg.contains("fill=\"#123456\""));
        assert!(svg.contains("fill=\"#fedcba\""));
    }
}

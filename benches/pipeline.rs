//! Benchmarks for the qrsmith pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qrsmith::{
    apply_raster_style, apply_vector_style, compose_pdf, render_raster, render_svg, to_png_bytes,
    QrStyle, StyleConfig, Symbol,
};

fn config(style: QrStyle) -> StyleConfig {
    let mut config = StyleConfig::new("https://example.com/some/long/path?with=query");
    config.style = style;
    config
}

// -- Encoding benchmarks --

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    group.bench_function("encode_symbol", |b| {
        b.iter(|| Symbol::encode(black_box("https://example.com")).unwrap())
    });

    let cfg = config(QrStyle::Square);
    let symbol = Symbol::encode(&cfg.text).unwrap();

    group.bench_function("render_raster_400", |b| {
        b.iter(|| render_raster(black_box(&symbol), black_box(&cfg)))
    });

    group.bench_function("render_svg_400", |b| {
        b.iter(|| render_svg(black_box(&symbol), black_box(&cfg)))
    });

    group.finish();
}

// -- Styling benchmarks --

fn bench_styling(c: &mut Criterion) {
    let mut group = c.benchmark_group("styling");

    for style in [QrStyle::Rounded, QrStyle::Dots, QrStyle::Artistic] {
        let cfg = config(style);
        let symbol = Symbol::encode(&cfg.text).unwrap();
        let base = render_raster(&symbol, &cfg);

        group.bench_function(format!("raster_{}", style), |b| {
            b.iter(|| apply_raster_style(black_box(&base), black_box(&cfg)).unwrap())
        });

        let svg = render_svg(&symbol, &cfg);
        group.bench_function(format!("vector_{}", style), |b| {
            b.iter(|| apply_vector_style(black_box(&svg), black_box(&cfg)))
        });
    }

    group.finish();
}

// -- Export benchmarks --

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    group.sample_size(20);

    let cfg = config(QrStyle::Square);
    let symbol = Symbol::encode(&cfg.text).unwrap();
    let image = render_raster(&symbol, &cfg);

    group.bench_function("png_encode", |b| {
        b.iter(|| to_png_bytes(black_box(&image)).unwrap())
    });

    let png = to_png_bytes(&image).unwrap();
    group.bench_function("pdf_compose", |b| {
        b.iter(|| compose_pdf(black_box(&png)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_encoding, bench_styling, bench_export);
criterion_main!(benches);

//! Benchmarks for grid layout and page rendering.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_truncation
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokensheet::export::{export_pdf, render_raster};
use tokensheet::frames::FrameCatalog;
use tokensheet::ingest::{decode_image, encode_png};
use tokensheet::layout::compute_grid;
use tokensheet::{GridConfig, SheetState};

fn a4(cell_size_mm: f64) -> GridConfig {
    GridConfig {
        page_width_mm: 210.0,
        page_height_mm: 297.0,
        cell_size_mm,
        cut_line_offset_mm: 1.0,
        cut_lines_enabled: true,
        margin_mm: 5.0,
    }
}

/// Sheet with every cell filled from one shared image.
fn full_sheet() -> SheetState {
    let pixels = image::RgbaImage::from_fn(256, 256, |x, y| {
        image::Rgba([x as u8, y as u8, 128, 255])
    });
    let png = encode_png(&pixels).expect("encode");
    let image = decode_image(png, Some("image/png")).expect("decode");
    let mut sheet = SheetState::default();
    for i in 0..sheet.len() {
        sheet.set_image(i, image.clone());
        sheet.set_frame(i, Some("metal-gold".into()));
    }
    sheet
}

/// Grid computation across cell sizes, from a handful of cells to thousands
fn bench_compute_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_grid");
    for size in [63.5, 25.4, 5.0, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let config = a4(size);
            b.iter(|| compute_grid(black_box(&config)));
        });
    }
    group.finish();
}

/// Rasterize a full sheet at preview and print resolution
fn bench_render_raster(c: &mut Criterion) {
    let sheet = full_sheet();
    let frames = FrameCatalog::builtin();
    let mut group = c.benchmark_group("render_raster");
    group.sample_size(10);
    for dpi in [72.0, 300.0] {
        group.bench_with_input(BenchmarkId::from_parameter(dpi), &dpi, |b, &dpi| {
            b.iter(|| render_raster(black_box(&sheet), &frames, dpi).expect("render"));
        });
    }
    group.finish();
}

/// Build the PDF for a full sheet
fn bench_export_pdf(c: &mut Criterion) {
    let sheet = full_sheet();
    let frames = FrameCatalog::builtin();
    let mut group = c.benchmark_group("export_pdf");
    group.sample_size(10);
    group.bench_function("full_a4", |b| {
        b.iter(|| export_pdf(black_box(&sheet), &frames).expect("export"));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_compute_grid,
    bench_render_raster,
    bench_export_pdf
);
criterion_main!(benches);

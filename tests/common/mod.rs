//! Shared helpers for the integration tests.
//!
//! Images are synthesized in memory with the `image` encoders so the tests
//! carry no binary fixtures.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use tokensheet::ingest::decode_image;
use tokensheet::{CellImage, SheetSettings, SheetState};

/// Tolerance for comparing millimeter values.
pub const EPS: f64 = 1e-9;

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Solid-color PNG bytes.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    out.into_inner()
}

/// Solid-color baseline JPEG bytes (3 components).
pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out.into_inner()
}

pub fn png_image(width: u32, height: u32, color: [u8; 4]) -> CellImage {
    decode_image(png_bytes(width, height, color), Some("image/png")).unwrap()
}

pub fn jpeg_image(width: u32, height: u32, color: [u8; 3]) -> CellImage {
    decode_image(jpeg_bytes(width, height, color), Some("image/jpeg")).unwrap()
}

/// Default A4 sheet with the given images placed into cells 0, 1, 2...
pub fn sheet_with(images: &[CellImage]) -> SheetState {
    let mut sheet = SheetState::new(SheetSettings::default());
    for (i, image) in images.iter().enumerate() {
        sheet.set_image(i, image.clone());
    }
    sheet
}

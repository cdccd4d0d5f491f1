//! Export tests: raster pages at print resolution and the one-page PDF.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

mod common;

use common::{jpeg_bytes, jpeg_image, png_image, sheet_with};
use lopdf::content::Content;
use lopdf::{Document, Object};
use test_case::test_case;
use tokensheet::color::Rgb;
use tokensheet::export::{
    encode_raster, export_image, export_pdf, render_raster, ExportLatch, RasterFormat,
};
use tokensheet::frames::FrameCatalog;
use tokensheet::render::px_for_mm;
use tokensheet::{CellShape, SheetError, SheetSettings, SheetState};

const RED: [u8; 4] = [255, 0, 0, 255];

fn pixel_at(page: &image::RgbaImage, x_mm: f64, y_mm: f64, dpi: f64) -> [u8; 4] {
    let x = (x_mm * dpi / 25.4).floor() as u32;
    let y = (y_mm * dpi / 25.4).floor() as u32;
    page.get_pixel(x, y).0
}

fn image_streams(doc: &Document) -> Vec<&lopdf::Stream> {
    doc.objects
        .values()
        .filter_map(|o| match o {
            Object::Stream(s) => Some(s),
            _ => None,
        })
        .filter(|s| matches!(s.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image"))
        .collect()
}

fn page_operators(doc: &Document) -> Vec<String> {
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content.operations.into_iter().map(|op| op.operator).collect()
}

// ============================================================================
// Raster
// ============================================================================

#[test_case(210.0 => 2480 ; "a4 width")]
#[test_case(297.0 => 3508 ; "a4 height")]
#[test_case(215.9 => 2550 ; "letter width")]
#[test_case(279.4 => 3300 ; "letter height")]
#[test_case(0.01 => 1 ; "never zero")]
fn pixels_at_print_resolution(mm: f64) -> u32 {
    px_for_mm(mm, 300.0)
}

#[test]
fn png_export_is_full_page_at_300_dpi() {
    let sheet = sheet_with(&[png_image(16, 16, RED)]);
    let bytes = export_image(&sheet, &FrameCatalog::builtin(), RasterFormat::Png).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2480, 3508));
}

#[test]
fn images_are_clipped_to_the_circle() {
    let sheet = sheet_with(&[png_image(16, 16, RED)]);
    let dpi = 100.0;
    let page = render_raster(&sheet, &FrameCatalog::builtin(), dpi).unwrap();
    let cell = sheet.geometry().cells[0];
    let (cx, cy) = cell.center();

    assert_eq!(pixel_at(&page, cx, cy, dpi), RED);
    // Inside the bounding square, outside the disk.
    let corner = pixel_at(&page, cell.x_mm + 1.0, cell.y_mm + 1.0, dpi);
    assert_eq!(corner, [255, 255, 255, 255]);
}

#[test]
fn cells_paint_at_their_grid_position_after_resize() {
    let mut sheet = SheetState::default();
    sheet.resize(2, 2);
    sheet.set_image(2, png_image(16, 16, RED));
    let dpi = 100.0;
    let page = render_raster(&sheet, &FrameCatalog::builtin(), dpi).unwrap();
    let geometry = sheet.geometry();

    let below = geometry.cell(geometry.index_of(1, 0).unwrap()).unwrap().center();
    assert_eq!(pixel_at(&page, below.0, below.1, dpi), RED);
    let right = geometry.cell(geometry.index_of(0, 2).unwrap()).unwrap().center();
    assert_eq!(pixel_at(&page, right.0, right.1, dpi), [255, 255, 255, 255]);
}

#[test]
fn empty_cells_are_left_blank() {
    let mut sheet = sheet_with(&[png_image(16, 16, RED)]);
    sheet.set_background_color(1, Rgb::new(0, 0, 255));
    let dpi = 100.0;
    let page = render_raster(&sheet, &FrameCatalog::builtin(), dpi).unwrap();
    let (cx, cy) = sheet.geometry().cells[1].center();
    assert_eq!(pixel_at(&page, cx, cy, dpi), [255, 255, 255, 255]);
}

#[test]
fn background_shows_through_transparent_images() {
    let mut sheet = SheetState::new(SheetSettings {
        shape: CellShape::Square,
        ..SheetSettings::default()
    });
    sheet.set_image(0, png_image(8, 8, [0, 0, 0, 0]));
    sheet.set_background_color(0, Rgb::new(0, 128, 0));
    let dpi = 100.0;
    let page = render_raster(&sheet, &FrameCatalog::builtin(), dpi).unwrap();
    let cell = sheet.geometry().cells[0];
    let (cx, cy) = cell.center();
    assert_eq!(pixel_at(&page, cx, cy, dpi), [0, 128, 0, 255]);
    // Square clip reaches the corners.
    assert_eq!(
        pixel_at(&page, cell.x_mm + 1.0, cell.y_mm + 1.0, dpi),
        [0, 128, 0, 255]
    );
}

#[test]
fn unknown_frames_do_not_fail_the_export() {
    let mut sheet = sheet_with(&[png_image(8, 8, RED)]);
    sheet.set_frame(0, Some("no-such-frame".into()));
    let page = render_raster(&sheet, &FrameCatalog::builtin(), 50.0).unwrap();
    assert_eq!(page.width(), px_for_mm(210.0, 50.0));
}

#[test]
fn jpeg_export_has_jpeg_signature() {
    let sheet = sheet_with(&[png_image(8, 8, RED)]);
    let page = render_raster(&sheet, &FrameCatalog::builtin(), 30.0).unwrap();
    let bytes = encode_raster(&page, RasterFormat::Jpeg { quality: 80 }).unwrap();
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), page.width());
}

// ============================================================================
// PDF
// ============================================================================

#[test]
fn pdf_is_one_page_sized_to_the_paper() {
    let sheet = sheet_with(&[png_image(8, 8, RED)]);
    let bytes = export_pdf(&sheet, &FrameCatalog::builtin()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let doc = Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = doc.get_dictionary(*pages.values().next().unwrap()).unwrap();
    let media: Vec<f64> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => f64::from(*r),
            _ => panic!("unexpected MediaBox entry {o:?}"),
        })
        .collect();
    assert!((media[2] - 595.28).abs() < 0.01);
    assert!((media[3] - 841.89).abs() < 0.01);
}

#[test]
fn shared_image_is_embedded_once() {
    let mut sheet = sheet_with(&[png_image(8, 8, RED)]);
    assert_eq!(sheet.duplicate_to_next(0), Some(1));
    assert_eq!(sheet.duplicate_to_next(1), Some(2));
    let doc = Document::load_mem(&export_pdf(&sheet, &FrameCatalog::builtin()).unwrap()).unwrap();
    assert_eq!(image_streams(&doc).len(), 1);

    let draws = page_operators(&doc).iter().filter(|op| *op == "Do").count();
    assert_eq!(draws, 3);
}

#[test]
fn jpeg_bytes_pass_through_unchanged() {
    let original = jpeg_bytes(12, 8, [10, 200, 30]);
    let sheet = sheet_with(&[jpeg_image(12, 8, [10, 200, 30])]);
    let doc = Document::load_mem(&export_pdf(&sheet, &FrameCatalog::builtin()).unwrap()).unwrap();
    let images = image_streams(&doc);
    assert_eq!(images.len(), 1);
    let stream = images[0];
    assert!(matches!(stream.dict.get(b"Filter"), Ok(Object::Name(n)) if n == b"DCTDecode"));
    assert!(
        matches!(stream.dict.get(b"ColorSpace"), Ok(Object::Name(n)) if n == b"DeviceRGB")
    );
    assert_eq!(stream.content, original);
}

#[test]
fn translucent_png_gets_a_soft_mask() {
    let sheet = sheet_with(&[png_image(8, 8, [255, 0, 0, 128])]);
    let doc = Document::load_mem(&export_pdf(&sheet, &FrameCatalog::builtin()).unwrap()).unwrap();
    let images = image_streams(&doc);
    assert_eq!(images.len(), 2);
    assert!(images.iter().any(|s| s.dict.get(b"SMask").is_ok()));
}

#[test]
fn frames_are_embedded_as_images() {
    let mut sheet = sheet_with(&[png_image(8, 8, RED), png_image(8, 8, RED)]);
    sheet.set_frame(0, Some("thin".into()));
    sheet.set_frame(1, Some("thin".into()));
    let doc = Document::load_mem(&export_pdf(&sheet, &FrameCatalog::builtin()).unwrap()).unwrap();
    // Equal bytes collapse to one photo; the frame tile adds an RGB image
    // and its alpha mask.
    assert_eq!(image_streams(&doc).len(), 3);
    let draws = page_operators(&doc).iter().filter(|op| *op == "Do").count();
    assert_eq!(draws, 4);
}

#[test]
fn cut_lines_follow_the_setting() {
    let with = sheet_with(&[png_image(8, 8, RED)]);
    let doc = Document::load_mem(&export_pdf(&with, &FrameCatalog::builtin()).unwrap()).unwrap();
    let ops = page_operators(&doc);
    assert!(ops.iter().any(|op| op == "d"));
    assert!(ops.iter().any(|op| op == "S"));

    let mut without = SheetState::new(SheetSettings {
        cut_lines: false,
        ..SheetSettings::default()
    });
    without.set_image(0, png_image(8, 8, RED));
    let doc = Document::load_mem(&export_pdf(&without, &FrameCatalog::builtin()).unwrap()).unwrap();
    assert!(!page_operators(&doc).iter().any(|op| op == "d"));
}

#[test]
fn empty_sheet_still_exports() {
    let sheet = SheetState::default();
    let doc = Document::load_mem(&export_pdf(&sheet, &FrameCatalog::builtin()).unwrap()).unwrap();
    assert!(image_streams(&doc).is_empty());
    assert!(!page_operators(&doc).iter().any(|op| op == "Do"));
}

// ============================================================================
// Latch
// ============================================================================

#[test]
fn latch_serializes_exports() {
    let latch = ExportLatch::new();
    let sheet = sheet_with(&[png_image(4, 4, RED)]);
    let nested = latch.run(|| {
        let inner = latch.run(|| export_pdf(&sheet, &FrameCatalog::builtin()));
        assert!(matches!(inner, Err(SheetError::ExportBusy)));
        export_pdf(&sheet, &FrameCatalog::builtin())
    });
    assert!(nested.unwrap().starts_with(b"%PDF"));
    assert!(!latch.is_busy());
}

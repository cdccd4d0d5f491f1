//! Compositing math tests: cover fit, coordinate spaces and cell plans.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{approx, png_image, sheet_with};
use test_case::test_case;
use tokensheet::compose::{
    clip_path, compute_image_draw_rect, plan_cell, Axis, PathEl, Rect, Space,
};
use tokensheet::frames::FrameCatalog;
use tokensheet::CellShape;

const CELL: Rect = Rect::new(10.0, 20.0, 30.0, 30.0);

// ============================================================================
// Cover fit
// ============================================================================

#[test_case(1.0 ; "square")]
#[test_case(2.0 ; "wide")]
#[test_case(0.25 ; "tall")]
#[test_case(16.0 / 9.0 ; "widescreen")]
fn cover_fit_covers_the_cell(aspect: f64) {
    let r = compute_image_draw_rect(CELL, aspect, 1.0, 0.0, 0.0, Axis::Down);
    assert!(r.x <= CELL.x + 1e-9 && r.right() >= CELL.right() - 1e-9);
    assert!(r.y <= CELL.y + 1e-9 && r.bottom() >= CELL.bottom() - 1e-9);
    // Tight on the limiting axis.
    assert!(approx(r.width, CELL.width) || approx(r.height, CELL.height));
    assert!(approx(r.width / r.height, aspect));
    let (cx, cy) = r.center();
    assert!(approx(cx, 25.0) && approx(cy, 35.0));
}

#[test_case(0.5 ; "zoomed out")]
#[test_case(2.0 ; "zoomed in")]
fn scale_multiplies_both_edges(scale: f64) {
    let base = compute_image_draw_rect(CELL, 1.5, 1.0, 0.0, 0.0, Axis::Down);
    let r = compute_image_draw_rect(CELL, 1.5, scale, 0.0, 0.0, Axis::Down);
    assert!(approx(r.width, base.width * scale));
    assert!(approx(r.height, base.height * scale));
    assert_eq!(r.center(), base.center());
}

#[test]
fn offset_shifts_after_centering() {
    let centered = compute_image_draw_rect(CELL, 1.0, 1.0, 0.0, 0.0, Axis::Down);
    let r = compute_image_draw_rect(CELL, 1.0, 1.0, 4.0, -2.0, Axis::Down);
    assert_eq!(r.x, centered.x + 4.0);
    assert_eq!(r.y, centered.y - 2.0);
}

// ============================================================================
// Spaces
// ============================================================================

#[test]
fn bottom_up_mirrors_top_down() {
    let down = Space::top_down(2.0, 297.0);
    let up = Space::bottom_up(2.0, 297.0);
    let a = down.rect(10.0, 20.0, 30.0, 40.0);
    let b = up.rect(10.0, 20.0, 30.0, 40.0);
    assert_eq!(a.x, b.x);
    assert_eq!((a.width, a.height), (b.width, b.height));
    // Top edge in one is the mirrored top edge in the other.
    assert!(approx(a.y, 297.0 * 2.0 - b.bottom()));
}

#[test]
fn offset_moves_image_down_the_page_in_both_spaces() {
    let sheet = {
        let mut s = sheet_with(&[png_image(4, 4, [0, 0, 0, 255])]);
        s.set_image_offset(0, 0.0, 5.0);
        s
    };
    let layout = sheet.geometry().cells[0];
    let state = sheet.cell(0).unwrap();

    let down = Space::top_down(1.0, sheet.geometry().page_height_mm);
    let plan = plan_cell(0, &layout, state, CellShape::Circle, &down);
    let (_, r) = plan.image.unwrap();
    assert!(approx(r.y - plan.rect.y, 5.0));

    let up = Space::bottom_up(1.0, sheet.geometry().page_height_mm);
    let plan = plan_cell(0, &layout, state, CellShape::Circle, &up);
    let (_, r) = plan.image.unwrap();
    assert!(approx(r.y - plan.rect.y, -5.0));
}

#[test]
fn plan_scales_offsets_into_space_units() {
    let mut sheet = sheet_with(&[png_image(4, 4, [0, 0, 0, 255])]);
    sheet.set_image_offset(0, 2.0, 0.0);
    let layout = sheet.geometry().cells[0];
    let space = Space::top_down(300.0 / 25.4, sheet.geometry().page_height_mm);
    let plan = plan_cell(0, &layout, sheet.cell(0).unwrap(), CellShape::Square, &space);
    let (_, r) = plan.image.unwrap();
    assert!(approx(r.x - plan.rect.x, 2.0 * 300.0 / 25.4));
}

#[test]
fn empty_cell_plan_has_no_image() {
    let sheet = sheet_with(&[]);
    let layout = sheet.geometry().cells[3];
    let space = Space::top_down(1.0, 297.0);
    let plan = plan_cell(3, &layout, sheet.cell(3).unwrap(), CellShape::Circle, &space);
    assert!(plan.image.is_none());
    assert!(plan.frame_id.is_none());
    assert_eq!(plan.index, 3);
}

// ============================================================================
// Clip paths
// ============================================================================

#[test]
fn circle_clip_is_four_curves() {
    let path = clip_path(CellShape::Circle, CELL);
    let curves = path
        .elements()
        .iter()
        .filter(|e| matches!(e, PathEl::CubicTo(..)))
        .count();
    assert_eq!(curves, 4);
}

#[test]
fn square_clip_is_the_cell() {
    let path = clip_path(CellShape::Square, CELL);
    assert!(path
        .elements()
        .iter()
        .any(|e| matches!(e, PathEl::LineTo(..))));
    assert!(!path
        .elements()
        .iter()
        .any(|e| matches!(e, PathEl::CubicTo(..))));
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn every_builtin_frame_draws_something() {
    let catalog = FrameCatalog::builtin();
    for frame in catalog.iter() {
        for shape in [CellShape::Circle, CellShape::Square] {
            assert!(
                !frame.decorate(shape, CELL).is_empty(),
                "{} drew nothing for {shape:?}",
                frame.id()
            );
        }
    }
}

#[test]
fn catalog_json_lists_every_frame() {
    let json = tokensheet::frame_catalog_json();
    let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), FrameCatalog::builtin().len());
    assert!(rows.iter().all(|r| r["categoryName"].is_string()));
}

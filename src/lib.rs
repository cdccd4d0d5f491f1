//! tokensheet - printable token sheets for the web
//!
//! Lays out a page as a grid of round or square token cells, composites an
//! image into each cell, and exports the sheet at print size:
//! - Grid layout with cut-line gutters, centered on the page
//! - Cover-fit images with per-cell offset, scale, background and frame
//! - Canvas 2D preview with pan/zoom (WebAssembly)
//! - 300 DPI PNG/JPEG and a one-page PDF sized to the paper
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { SheetView } from 'tokensheet';
//! await init();
//! const view = new SheetView(canvas, devicePixelRatio);
//! await view.load_image(0, bytes, 'image/png');
//! view.render();
//! const pdf = view.export_pdf();
//! ```

pub mod color;
pub mod compose;
pub mod error;
pub mod export;
pub mod frames;
pub mod ingest;
pub mod layout;
pub mod project;
pub mod render;
pub mod sheet;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export the main viewer struct
pub use viewer::SheetView;

pub use error::{Result, SheetError};
pub use layout::{compute_grid, GridGeometry};
pub use sheet::SheetState;
pub use types::*;

/// Compute the grid for raw layout inputs and return it as JSON.
///
/// Inputs are clamped the same way the viewer clamps them, so this never fails
/// for numeric input.
#[must_use]
#[wasm_bindgen(js_name = compute_grid)]
pub fn compute_grid_json(
    page_width_mm: f64,
    page_height_mm: f64,
    cell_size_mm: f64,
    cut_line_offset_mm: f64,
    cut_lines_enabled: bool,
    margin_mm: f64,
) -> String {
    let geometry = compute_grid(&GridConfig {
        page_width_mm,
        page_height_mm,
        cell_size_mm,
        cut_line_offset_mm,
        cut_lines_enabled,
        margin_mm,
    });
    serde_json::to_string(&geometry).unwrap_or_default()
}

/// Paper sizes as JSON: `[{ "id", "label", "widthMm", "heightMm" }]`.
#[must_use]
#[wasm_bindgen(js_name = paper_sizes)]
pub fn paper_sizes_json() -> String {
    serde_json::to_string(&paper_table()).unwrap_or_default()
}

/// Token size presets as JSON.
#[must_use]
#[wasm_bindgen(js_name = token_presets)]
pub fn token_presets_json() -> String {
    serde_json::to_string(&token_preset_table()).unwrap_or_default()
}

/// Built-in frames as JSON: `[{ "id", "name", "category", "categoryName" }]`.
#[must_use]
#[wasm_bindgen(js_name = frame_catalog)]
pub fn frame_catalog_json() -> String {
    serde_json::to_string(&frames::FrameCatalog::builtin().infos()).unwrap_or_default()
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

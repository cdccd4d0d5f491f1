//! Rendering engine with pluggable backends.
//!
//! This module provides:
//! - The backend-agnostic [`RenderBackend`] trait and the shared paint driver
//! - A tiny-skia raster backend used for PNG/JPEG export and frame tiles
//! - Canvas 2D preview backend (wasm32 only)

pub mod backend;
mod paint;
pub mod raster;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use backend::{CellFilter, CutLineStyle, RenderBackend, RenderParams, Segment};
pub use paint::{cut_line_segments, paint_cell, paint_sheet};
pub use raster::{px_for_mm, RasterSurface, MM_PER_INCH};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

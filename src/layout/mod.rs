//! Layout engine for computing cell positions and viewport management.
//!
//! This module handles:
//! - Computing the grid of cells and cut lines from page and cell parameters
//! - Hit testing page points against cells
//! - Managing the preview viewport (fit-to-page, zoom, pan)

mod grid;
mod viewport;

pub use grid::{
    compute_grid, CellLayout, CutSegment, GridGeometry, CUT_LINE_EPSILON_MM, MAX_GRID_DIM,
};
pub use viewport::{Viewport, PAGE_PADDING_PX};

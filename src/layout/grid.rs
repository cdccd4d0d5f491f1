//! Grid layout engine.
//!
//! Turns page and cell parameters into the positions of every cell on the
//! page plus the cut-line coordinates. Everything here is in page-local
//! millimeters with the origin at the top-left corner of the page.

use serde::Serialize;

use crate::types::{CellShape, GridConfig};

/// Upper bound on cells per axis; a 1 mm cell on an A3 page stays well below it.
pub const MAX_GRID_DIM: u32 = 4096;

/// Tolerance for treating two cut-line coordinates as the same line.
pub const CUT_LINE_EPSILON_MM: f64 = 1e-9;

/// Image area of one cell, excluding the cut-line margin around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLayout {
    pub row: u32,
    pub col: u32,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl CellLayout {
    pub fn center(&self) -> (f64, f64) {
        (
            self.x_mm + self.width_mm / 2.0,
            self.y_mm + self.height_mm / 2.0,
        )
    }

    /// Point-in-cell test honoring the clip shape (disk for circles).
    pub fn contains(&self, x_mm: f64, y_mm: f64, shape: CellShape) -> bool {
        match shape {
            CellShape::Square => {
                x_mm >= self.x_mm
                    && x_mm <= self.x_mm + self.width_mm
                    && y_mm >= self.y_mm
                    && y_mm <= self.y_mm + self.height_mm
            }
            CellShape::Circle => {
                let (cx, cy) = self.center();
                let r = self.width_mm / 2.0;
                let (dx, dy) = (x_mm - cx, y_mm - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }
}

/// A cut-line segment in page millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Derived grid geometry. Recomputed on every config change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridGeometry {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub cols: u32,
    pub rows: u32,
    pub cell_size_mm: f64,
    pub cell_pitch_mm: f64,
    pub grid_width_mm: f64,
    pub grid_height_mm: f64,
    pub origin_x_mm: f64,
    pub origin_y_mm: f64,
    /// Row-major; `index = row * cols + col`.
    pub cells: Vec<CellLayout>,
    pub cut_lines_vertical: Vec<f64>,
    pub cut_lines_horizontal: Vec<f64>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fit_count(usable: f64, pitch: f64) -> u32 {
    let n = (usable / pitch).floor();
    if n.is_finite() && n >= 1.0 {
        n.min(f64::from(MAX_GRID_DIM)) as u32
    } else {
        1
    }
}

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < CUT_LINE_EPSILON_MM);
    values
}

/// Compute the grid for a page. Pure and total: degenerate inputs are
/// clamped and always yield at least one row and one column.
pub fn compute_grid(config: &GridConfig) -> GridGeometry {
    let config = config.sanitized();
    let offset = if config.cut_lines_enabled {
        config.cut_line_offset_mm
    } else {
        0.0
    };
    let size = config.cell_size_mm;
    let pitch = size + 2.0 * offset;

    let usable_w = config.page_width_mm - 2.0 * config.margin_mm;
    let usable_h = config.page_height_mm - 2.0 * config.margin_mm;
    let cols = fit_count(usable_w, pitch);
    let rows = fit_count(usable_h, pitch);

    let grid_width_mm = f64::from(cols) * pitch;
    let grid_height_mm = f64::from(rows) * pitch;
    let origin_x_mm = (config.page_width_mm - grid_width_mm) / 2.0;
    let origin_y_mm = (config.page_height_mm - grid_height_mm) / 2.0;

    let left = |c: u32| origin_x_mm + f64::from(c) * pitch + offset;
    let top = |r: u32| origin_y_mm + f64::from(r) * pitch + offset;

    let mut cells = Vec::with_capacity((cols as usize) * (rows as usize));
    for row in 0..rows {
        for col in 0..cols {
            cells.push(CellLayout {
                row,
                col,
                x_mm: left(col),
                y_mm: top(row),
                width_mm: size,
                height_mm: size,
            });
        }
    }

    let (cut_lines_vertical, cut_lines_horizontal) = if config.cut_lines_enabled {
        (
            sorted_unique((0..cols).flat_map(|c| [left(c), left(c) + size]).collect()),
            sorted_unique((0..rows).flat_map(|r| [top(r), top(r) + size]).collect()),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    log::debug!(
        "grid {cols}x{rows} pitch={pitch:.3}mm origin=({origin_x_mm:.3}, {origin_y_mm:.3})"
    );

    GridGeometry {
        page_width_mm: config.page_width_mm,
        page_height_mm: config.page_height_mm,
        cols,
        rows,
        cell_size_mm: size,
        cell_pitch_mm: pitch,
        grid_width_mm,
        grid_height_mm,
        origin_x_mm,
        origin_y_mm,
        cells,
        cut_lines_vertical,
        cut_lines_horizontal,
    }
}

impl GridGeometry {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Row-major index of (row, col), or `None` outside the grid.
    pub fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn cell(&self, index: usize) -> Option<&CellLayout> {
        self.cells.get(index)
    }

    /// Cell under a page point, honoring the clip shape.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_at(&self, x_mm: f64, y_mm: f64, shape: CellShape) -> Option<usize> {
        let gx = (x_mm - self.origin_x_mm) / self.cell_pitch_mm;
        let gy = (y_mm - self.origin_y_mm) / self.cell_pitch_mm;
        if !(gx.is_finite() && gy.is_finite()) || gx < 0.0 || gy < 0.0 {
            return None;
        }
        let col = gx.floor().min(f64::from(MAX_GRID_DIM)) as u32;
        let row = gy.floor().min(f64::from(MAX_GRID_DIM)) as u32;
        let index = self.index_of(row, col)?;
        self.cells
            .get(index)
            .filter(|cell| cell.contains(x_mm, y_mm, shape))
            .map(|_| index)
    }

    /// Cut-line segments. Lines span the grid block only, not the full page.
    pub fn cut_segments(&self) -> Vec<CutSegment> {
        let top = self.origin_y_mm;
        let bottom = self.origin_y_mm + self.grid_height_mm;
        let left = self.origin_x_mm;
        let right = self.origin_x_mm + self.grid_width_mm;

        let vertical = self.cut_lines_vertical.iter().map(|&x| CutSegment {
            x1: x,
            y1: top,
            x2: x,
            y2: bottom,
        });
        let horizontal = self.cut_lines_horizontal.iter().map(|&y| CutSegment {
            x1: left,
            y1: y,
            x2: right,
            y2: y,
        });
        vertical.chain(horizontal).collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn a4(cell: f64, offset: f64, cut: bool) -> GridConfig {
        GridConfig {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            cell_size_mm: cell,
            cut_line_offset_mm: offset,
            cut_lines_enabled: cut,
            margin_mm: 5.0,
        }
    }

    #[test]
    fn test_cells_are_row_major() {
        let g = compute_grid(&a4(25.4, 1.0, true));
        for (i, cell) in g.cells.iter().enumerate() {
            assert_eq!(g.index_of(cell.row, cell.col), Some(i));
        }
        assert_eq!(g.cells[1].row, 0);
        assert_eq!(g.cells[1].col, 1);
    }

    #[test]
    fn test_zero_offset_dedupes_shared_edges() {
        let g = compute_grid(&a4(50.0, 0.0, true));
        assert_eq!(g.cols, 4);
        // 4 cells with touching edges share 3 lines: 5 unique x positions.
        assert_eq!(g.cut_lines_vertical.len(), 5);
        assert!(g.cut_lines_vertical.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_offset_ignored_without_cut_lines() {
        let g = compute_grid(&a4(25.4, 3.0, false));
        assert_eq!(g.cell_pitch_mm, 25.4);
        assert!(g.cut_lines_vertical.is_empty());
        assert!(g.cut_segments().is_empty());
    }

    #[test]
    fn test_cell_at_circle_excludes_corners() {
        let g = compute_grid(&a4(25.4, 1.0, true));
        let c = g.cells[0];
        let (cx, cy) = c.center();
        assert_eq!(g.cell_at(cx, cy, CellShape::Circle), Some(0));
        let (corner_x, corner_y) = (c.x_mm + 0.5, c.y_mm + 0.5);
        assert_eq!(g.cell_at(corner_x, corner_y, CellShape::Circle), None);
        assert_eq!(g.cell_at(corner_x, corner_y, CellShape::Square), Some(0));
    }

    #[test]
    fn test_cell_at_outside_grid() {
        let g = compute_grid(&a4(25.4, 1.0, true));
        assert_eq!(g.cell_at(1.0, 1.0, CellShape::Square), None);
        assert_eq!(g.cell_at(209.0, 296.0, CellShape::Square), None);
        assert_eq!(g.cell_at(f64::NAN, 10.0, CellShape::Square), None);
    }

    #[test]
    fn test_cut_segments_span_grid_block() {
        let g = compute_grid(&a4(25.4, 1.0, true));
        let segs = g.cut_segments();
        assert_eq!(
            segs.len(),
            g.cut_lines_vertical.len() + g.cut_lines_horizontal.len()
        );
        let v = segs[0];
        assert_eq!(v.y1, g.origin_y_mm);
        assert_eq!(v.y2, g.origin_y_mm + g.grid_height_mm);
    }
}

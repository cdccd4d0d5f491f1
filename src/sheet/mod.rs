//! Live sheet state: settings, derived geometry and per-cell content.
//!
//! `SheetState` is owned by whoever drives the UI (the wasm viewer, the CLI)
//! and passed explicitly to the output adapters. Every mutator applies
//! immediately; out-of-range indices are silently ignored.

mod load;

use std::collections::HashMap;

pub use load::LoadTicket;

use crate::color::Rgb;
use crate::layout::{compute_grid, CellLayout, GridGeometry};
use crate::types::{
    clamp_image_scale, CellImage, CellShape, CellState, SheetSettings, IMAGE_SCALE_STEP,
};

#[derive(Debug, Clone)]
pub struct SheetState {
    settings: SheetSettings,
    geometry: GridGeometry,
    cells: Vec<CellState>,
    cols: u32,
    rows: u32,
    selected: Option<usize>,
    next_load: u64,
}

impl Default for SheetState {
    fn default() -> Self {
        Self::new(SheetSettings::default())
    }
}

impl SheetState {
    pub fn new(settings: SheetSettings) -> Self {
        let geometry = compute_grid(&settings.grid_config());
        let mut state = Self {
            settings,
            cells: Vec::new(),
            cols: 0,
            rows: 0,
            geometry,
            selected: None,
            next_load: 1,
        };
        state.resize(state.geometry.cols, state.geometry.rows);
        state
    }

    pub fn settings(&self) -> &SheetSettings {
        &self.settings
    }

    pub fn shape(&self) -> CellShape {
        self.settings.shape
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&CellState> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current `(cols, rows)` of the cell list.
    pub fn dims(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Replace the settings and recompute the grid. Cells whose (row, col)
    /// survive keep their content.
    pub fn set_settings(&mut self, settings: SheetSettings) {
        self.settings = settings;
        self.geometry = compute_grid(&settings.grid_config());
        self.resize(self.geometry.cols, self.geometry.rows);
    }

    /// Reconcile the cell list with a `cols x rows` grid by (row, col).
    /// Surviving positions keep their state, new positions start empty,
    /// vanished ones are dropped along with any load aimed at them.
    pub fn resize(&mut self, cols: u32, rows: u32) {
        let mut previous: HashMap<(u32, u32), CellState> = self
            .cells
            .drain(..)
            .map(|cell| ((cell.row, cell.col), cell))
            .collect();

        self.cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                previous
                    .remove(&(row, col))
                    .unwrap_or_else(|| CellState::new(row, col))
            })
            .collect();
        self.cols = cols;
        self.rows = rows;

        if !previous.is_empty() {
            log::debug!("resize to {cols}x{rows} dropped {} cells", previous.len());
        }
        if self.selected.is_some_and(|i| i >= self.cells.len()) {
            self.selected = None;
        }
    }

    /// Row-major index of (row, col) in the current cell list.
    pub fn cell_index(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Page placement of a cell, matched to the geometry by (row, col).
    /// `None` when the grid has no slot at that position.
    pub fn cell_layout(&self, index: usize) -> Option<&CellLayout> {
        let cell = self.cells.get(index)?;
        let slot = self.geometry.index_of(cell.row, cell.col)?;
        self.geometry.cell(slot)
    }

    /// Cell under a page point, honoring the clip shape.
    pub fn cell_at(&self, x_mm: f64, y_mm: f64) -> Option<usize> {
        let slot = self.geometry.cell_at(x_mm, y_mm, self.shape())?;
        let layout = self.geometry.cell(slot)?;
        self.cell_index(layout.row, layout.col)
    }

    pub fn first_empty_cell(&self) -> Option<usize> {
        self.cells.iter().position(|c| !c.has_image())
    }

    /// Select a cell, or clear the selection with `None`. Invalid indices deselect.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.cells.len());
    }

    /// Set a new image. Offset and scale reset, and any load still in
    /// flight for the cell is superseded.
    pub fn set_image(&mut self, index: usize, image: CellImage) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.image = Some(image);
            cell.reset_transform();
            cell.pending_load = None;
        }
    }

    /// Nudge the image by a delta in millimeters.
    pub fn move_image(&mut self, index: usize, dx_mm: f64, dy_mm: f64) {
        if let Some(cell) = self.cells.get_mut(index).filter(|c| c.has_image()) {
            cell.offset_x_mm += dx_mm;
            cell.offset_y_mm += dy_mm;
        }
    }

    pub fn set_image_offset(&mut self, index: usize, x_mm: f64, y_mm: f64) {
        if let Some(cell) = self.cells.get_mut(index).filter(|c| c.has_image()) {
            cell.offset_x_mm = x_mm;
            cell.offset_y_mm = y_mm;
        }
    }

    pub fn center_image(&mut self, index: usize) {
        self.set_image_offset(index, 0.0, 0.0);
    }

    /// Set the image scale as given. Range enforcement belongs to the caller.
    pub fn set_scale(&mut self, index: usize, scale: f64) {
        if let Some(cell) = self.cells.get_mut(index).filter(|c| c.has_image()) {
            cell.scale = scale;
        }
    }

    /// Scroll-wheel style zoom: `steps` increments of the scale step, clamped.
    pub fn step_scale(&mut self, index: usize, steps: i32) {
        if let Some(current) = self.cells.get(index).filter(|c| c.has_image()).map(|c| c.scale) {
            let next = clamp_image_scale(current + f64::from(steps) * IMAGE_SCALE_STEP);
            self.set_scale(index, next);
        }
    }

    /// Copy a cell's content into the next cell. The image is shared, not
    /// copied. Returns the target index, or `None` if there is nothing to
    /// copy or no next cell.
    pub fn duplicate_to_next(&mut self, index: usize) -> Option<usize> {
        let target = index.checked_add(1)?;
        if target >= self.cells.len() {
            return None;
        }
        let source = self.cells.get(index).filter(|c| c.has_image())?.clone();
        let cell = self.cells.get_mut(target)?;
        cell.image = source.image;
        cell.offset_x_mm = source.offset_x_mm;
        cell.offset_y_mm = source.offset_y_mm;
        cell.scale = source.scale;
        cell.background = source.background;
        cell.frame_id = source.frame_id;
        cell.pending_load = None;
        Some(target)
    }

    /// Reset a cell to its empty state.
    pub fn clear(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = CellState::new(cell.row, cell.col);
        }
    }

    /// Reset every cell and drop the selection.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            *cell = CellState::new(cell.row, cell.col);
        }
        self.selected = None;
    }

    pub fn set_background_color(&mut self, index: usize, color: Rgb) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.background = color;
        }
    }

    pub fn set_frame(&mut self, index: usize, frame_id: Option<String>) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.frame_id = frame_id;
        }
    }

    /// Indices for loading `count` images into consecutive cells, starting at
    /// the selection (or the first empty cell) and stopping at the grid end.
    pub fn load_targets(&self, count: usize) -> Vec<usize> {
        let start = self.selected.or_else(|| self.first_empty_cell()).unwrap_or(0);
        let end = start.saturating_add(count).min(self.cells.len());
        (start..end).collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::types::{DecodedImage, ImageFormat};

    fn image() -> CellImage {
        CellImage::new(
            DecodedImage::new(image::RgbaImage::new(4, 2)),
            vec![1, 2, 3],
            ImageFormat::Png,
        )
    }

    #[test]
    fn default_sheet_is_seven_by_ten() {
        let sheet = SheetState::default();
        assert_eq!(sheet.len(), 70);
        assert_eq!(sheet.cell_index(1, 0), Some(7));
        assert_eq!(sheet.cell_index(10, 0), None);
    }

    #[test]
    fn step_scale_clamps() {
        let mut sheet = SheetState::default();
        sheet.set_image(0, image());
        sheet.step_scale(0, 1);
        assert!((sheet.cell(0).unwrap().scale - 1.05).abs() < 1e-12);
        sheet.step_scale(0, 1000);
        assert_eq!(sheet.cell(0).unwrap().scale, 3.0);
        sheet.step_scale(0, -1000);
        assert_eq!(sheet.cell(0).unwrap().scale, 0.5);
    }

    #[test]
    fn selection_dropped_when_grid_shrinks() {
        let mut sheet = SheetState::default();
        sheet.select(Some(69));
        let settings = SheetSettings {
            cell_size_mm: 50.8,
            ..SheetSettings::default()
        };
        sheet.set_settings(settings);
        assert!(sheet.len() < 70);
        assert_eq!(sheet.selected(), None);
    }

    #[test]
    fn load_targets_start_at_selection() {
        let mut sheet = SheetState::default();
        sheet.select(Some(68));
        assert_eq!(sheet.load_targets(5), vec![68, 69]);
        sheet.select(None);
        sheet.set_image(0, image());
        assert_eq!(sheet.load_targets(2), vec![1, 2]);
    }
}

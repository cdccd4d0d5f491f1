//! Render backend trait for pluggable output adapters.
//!
//! The preview canvas, the raster exporter and the PDF exporter implement
//! [`RenderBackend`]; [`super::paint_sheet`] drives them so that every
//! adapter paints cells in the same order with the same geometry.

use crate::color::Rgb;
use crate::compose::{Path, Rect, Space};
use crate::error::Result;
use crate::frames::{FrameCatalog, FrameDecoration};
use crate::sheet::SheetState;
use crate::types::{CellImage, CellShape};

/// Cut-line appearance, in the backend's own units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutLineStyle {
    pub color: Rgb,
    pub width: f64,
    /// On/off dash lengths.
    pub dash: [f64; 2],
}

/// A straight segment in backend units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Which cells get painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFilter {
    /// Every cell, including empty ones (preview).
    All,
    /// Only cells holding an image (exports leave empty cells blank).
    WithImage,
}

/// Render parameters passed to [`super::paint_sheet`].
pub struct RenderParams<'a> {
    pub sheet: &'a SheetState,
    pub frames: &'a FrameCatalog,
    pub cells: CellFilter,
    pub cut_lines: Option<CutLineStyle>,
}

/// Drawing primitives an output adapter provides.
///
/// Calls for one cell always arrive as: `push_clip`, `fill_rect`,
/// optionally `draw_image`, optionally `draw_frame`, `pop_clip`, and then
/// `draw_frame` again only for frames that bleed outside the clip.
pub trait RenderBackend {
    /// Coordinate space this backend draws in.
    fn space(&self) -> Space;

    fn push_clip(&mut self, clip: &Path) -> Result<()>;

    fn pop_clip(&mut self) -> Result<()>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<()>;

    /// Draw an image scaled into `dest`. Backends that cannot place a
    /// particular image should log it and return `Ok`.
    fn draw_image(&mut self, image: &CellImage, dest: Rect) -> Result<()>;

    fn draw_frame(&mut self, frame: &dyn FrameDecoration, shape: CellShape, cell: Rect)
        -> Result<()>;

    fn stroke_segments(&mut self, segments: &[Segment], style: &CutLineStyle) -> Result<()>;
}

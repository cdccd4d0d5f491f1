//! Cell compositing math shared by every output adapter.
//!
//! The preview, the raster export and the PDF export all place images with
//! [`compute_image_draw_rect`] and clip with [`clip_path`]; they differ only in
//! the [`Space`] they map page millimeters into.

mod path;

pub use path::{Path, PathEl, CIRCLE_KAPPA};

use crate::color::Rgb;
use crate::layout::CellLayout;
use crate::types::{CellImage, CellShape, CellState};

/// Axis-aligned rectangle. `(x, y)` is the minimum corner in the target
/// space: top-left for top-down spaces, bottom-left for bottom-up ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow by `d` on every side.
    pub fn inflate(&self, d: f64) -> Self {
        Self::new(self.x - d, self.y - d, self.width + 2.0 * d, self.height + 2.0 * d)
    }
}

/// Direction of the target space's y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// y grows downward (canvas, raster images).
    Down,
    /// y grows upward (PDF user space).
    Up,
}

impl Axis {
    /// Sign applied to a page-space vertical offset. A positive offset moves
    /// the image down the page, which is `-y` in a bottom-up space.
    pub const fn offset_y_sign(self) -> f64 {
        match self {
            Self::Down => 1.0,
            Self::Up => -1.0,
        }
    }
}

/// Mapping from page millimeters into an adapter's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Space {
    pub units_per_mm: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub axis: Axis,
    pub page_height_mm: f64,
}

impl Space {
    /// Top-down space with the page corner at the origin.
    pub fn top_down(units_per_mm: f64, page_height_mm: f64) -> Self {
        Self {
            units_per_mm,
            origin_x: 0.0,
            origin_y: 0.0,
            axis: Axis::Down,
            page_height_mm,
        }
    }

    /// Bottom-up space with the page's bottom-left corner at the origin.
    pub fn bottom_up(units_per_mm: f64, page_height_mm: f64) -> Self {
        Self {
            axis: Axis::Up,
            ..Self::top_down(units_per_mm, page_height_mm)
        }
    }

    pub fn length(&self, mm: f64) -> f64 {
        mm * self.units_per_mm
    }

    pub fn point(&self, x_mm: f64, y_mm: f64) -> (f64, f64) {
        let x = self.origin_x + x_mm * self.units_per_mm;
        let y = match self.axis {
            Axis::Down => self.origin_y + y_mm * self.units_per_mm,
            Axis::Up => self.origin_y + (self.page_height_mm - y_mm) * self.units_per_mm,
        };
        (x, y)
    }

    /// Map a page rectangle given by its top-left corner and size in mm.
    pub fn rect(&self, x_mm: f64, y_mm: f64, w_mm: f64, h_mm: f64) -> Rect {
        let (x, y) = match self.axis {
            Axis::Down => self.point(x_mm, y_mm),
            Axis::Up => self.point(x_mm, y_mm + h_mm),
        };
        Rect::new(x, y, self.length(w_mm), self.length(h_mm))
    }

    pub fn cell_rect(&self, cell: &CellLayout) -> Rect {
        self.rect(cell.x_mm, cell.y_mm, cell.width_mm, cell.height_mm)
    }
}

/// Cover-fit placement of an image inside a cell.
///
/// The image is scaled so it covers the cell on its limiting axis, times
/// `scale`, centered, then shifted by the offset. Units are whatever the cell
/// rectangle is in. `axis` only decides the sign of the vertical offset.
pub fn compute_image_draw_rect(
    cell: Rect,
    image_aspect: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    axis: Axis,
) -> Rect {
    let aspect = if image_aspect.is_finite() && image_aspect > 0.0 {
        image_aspect
    } else {
        1.0
    };
    let cell_aspect = cell.width / cell.height;

    let (draw_w, draw_h) = if aspect > cell_aspect {
        let h = cell.height * scale;
        (h * aspect, h)
    } else {
        let w = cell.width * scale;
        (w, w / aspect)
    };

    Rect::new(
        cell.x + (cell.width - draw_w) / 2.0 + offset_x,
        cell.y + (cell.height - draw_h) / 2.0 + axis.offset_y_sign() * offset_y,
        draw_w,
        draw_h,
    )
}

/// Clip region of a cell: the inscribed disk or the cell rectangle.
pub fn clip_path(shape: CellShape, rect: Rect) -> Path {
    match shape {
        CellShape::Circle => {
            let (cx, cy) = rect.center();
            Path::circle(cx, cy, rect.width / 2.0)
        }
        CellShape::Square => Path::rect(rect),
    }
}

/// Everything an adapter needs to paint one cell, already in its space.
#[derive(Debug, Clone)]
pub struct CellPlan<'a> {
    pub index: usize,
    pub rect: Rect,
    pub clip: Path,
    pub background: Rgb,
    pub image: Option<(&'a CellImage, Rect)>,
    pub frame_id: Option<&'a str>,
}

pub fn plan_cell<'a>(
    index: usize,
    layout: &CellLayout,
    state: &'a CellState,
    shape: CellShape,
    space: &Space,
) -> CellPlan<'a> {
    let rect = space.cell_rect(layout);
    let image = state.image.as_ref().map(|img| {
        let draw = compute_image_draw_rect(
            rect,
            img.aspect_ratio(),
            state.scale,
            space.length(state.offset_x_mm),
            space.length(state.offset_y_mm),
            space.axis,
        );
        (img, draw)
    });
    CellPlan {
        index,
        rect,
        clip: clip_path(shape, rect),
        background: state.background,
        image,
        frame_id: state.frame_id.as_deref(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn bottom_up_rect_uses_lower_corner() {
        let space = Space::bottom_up(2.0, 100.0);
        let r = space.rect(10.0, 20.0, 5.0, 5.0);
        assert_eq!(r.x, 20.0);
        assert_eq!(r.y, (100.0 - 25.0) * 2.0);
        assert_eq!(r.height, 10.0);
    }

    #[test]
    fn offset_sign_flips_for_bottom_up() {
        let cell = Rect::new(0.0, 0.0, 10.0, 10.0);
        let down = compute_image_draw_rect(cell, 1.0, 1.0, 0.0, 3.0, Axis::Down);
        let up = compute_image_draw_rect(cell, 1.0, 1.0, 0.0, 3.0, Axis::Up);
        assert_eq!(down.y, 3.0);
        assert_eq!(up.y, -3.0);
    }

    #[test]
    fn degenerate_aspect_is_treated_as_square() {
        let cell = Rect::new(0.0, 0.0, 10.0, 10.0);
        let r = compute_image_draw_rect(cell, f64::NAN, 1.0, 0.0, 0.0, Axis::Down);
        assert_eq!(r, cell);
    }
}

//! Viewport state for the interactive preview: fit-to-page scale, zoom and pan.

use super::GridGeometry;
use crate::compose::{Axis, Space};

/// Padding kept around the page when it is fitted into the view (CSS pixels).
pub const PAGE_PADDING_PX: f64 = 40.0;

/// Preview viewport. Screen units are CSS pixels; page units are millimeters.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// User zoom on top of the fit-to-page scale (1.0 = whole page visible)
    pub zoom: f64,
    /// Pan offset of the page center from the view center, in pixels
    pub pan_x: f64,
    pub pan_y: f64,
    page_width_mm: f64,
    page_height_mm: f64,
    cell_size_mm: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            cell_size_mm: 25.4,
        }
    }

    /// Track the page being previewed. Zoom and pan are re-clamped.
    pub fn set_page(&mut self, geometry: &GridGeometry) {
        self.page_width_mm = geometry.page_width_mm;
        self.page_height_mm = geometry.page_height_mm;
        self.cell_size_mm = geometry.cell_size_mm;
        self.zoom = self.zoom.clamp(1.0, self.max_zoom());
        self.clamp_pan();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.zoom = self.zoom.clamp(1.0, self.max_zoom());
        self.clamp_pan();
    }

    /// Pixels per millimeter that fit the whole page with padding.
    pub fn base_scale(&self) -> f64 {
        let avail_w = (self.width - 2.0 * PAGE_PADDING_PX).max(1.0);
        let avail_h = (self.height - 2.0 * PAGE_PADDING_PX).max(1.0);
        (avail_w / self.page_width_mm).min(avail_h / self.page_height_mm)
    }

    /// Effective pixels per millimeter.
    pub fn scale(&self) -> f64 {
        self.base_scale() * self.zoom
    }

    /// Zoom at which a single cell fills the shorter side of the view.
    pub fn max_zoom(&self) -> f64 {
        let avail = (self.width.min(self.height) - 2.0 * PAGE_PADDING_PX).max(1.0);
        (avail / (self.cell_size_mm * self.base_scale())).max(1.0)
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(1.0, self.max_zoom())
        } else {
            1.0
        };
        self.clamp_pan();
    }

    /// Multiply the zoom while keeping the page point under `(sx, sy)` fixed.
    pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
        let (px, py) = self.to_page(sx, sy);
        self.set_zoom(self.zoom * factor);
        let (nx, ny) = self.to_screen(px, py);
        self.pan_x += sx - nx;
        self.pan_y += sy - ny;
        self.clamp_pan();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
        self.clamp_pan();
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Keep the page from leaving the view. Pan is zero along any axis
    /// where the page already fits.
    pub fn clamp_pan(&mut self) {
        let s = self.scale();
        self.pan_x = clamp_axis(self.pan_x, self.page_width_mm * s, self.width);
        self.pan_y = clamp_axis(self.pan_y, self.page_height_mm * s, self.height);
    }

    /// Screen position of the page's top-left corner.
    pub fn page_origin(&self) -> (f64, f64) {
        let s = self.scale();
        (
            (self.width - self.page_width_mm * s) / 2.0 + self.pan_x,
            (self.height - self.page_height_mm * s) / 2.0 + self.pan_y,
        )
    }

    /// Page millimeters to screen pixels.
    pub fn to_screen(&self, x_mm: f64, y_mm: f64) -> (f64, f64) {
        let (ox, oy) = self.page_origin();
        let s = self.scale();
        (ox + x_mm * s, oy + y_mm * s)
    }

    /// Screen pixels to page millimeters.
    pub fn to_page(&self, sx: f64, sy: f64) -> (f64, f64) {
        let (ox, oy) = self.page_origin();
        let s = self.scale();
        ((sx - ox) / s, (sy - oy) / s)
    }

    /// A pointer drag of `(dx, dy)` pixels expressed in millimeters.
    pub fn screen_delta_to_mm(&self, dx: f64, dy: f64) -> (f64, f64) {
        let s = self.scale();
        (dx / s, dy / s)
    }

    /// Mapping used by the preview backend.
    pub fn space(&self) -> Space {
        let (origin_x, origin_y) = self.page_origin();
        Space {
            units_per_mm: self.scale(),
            origin_x,
            origin_y,
            axis: Axis::Down,
            page_height_mm: self.page_height_mm,
        }
    }
}

fn clamp_axis(pan: f64, content: f64, view: f64) -> f64 {
    let overflow = content + 2.0 * PAGE_PADDING_PX - view;
    if overflow <= 0.0 || !pan.is_finite() {
        return 0.0;
    }
    let limit = overflow / 2.0;
    pan.clamp(-limit, limit)
}

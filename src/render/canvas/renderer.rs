//! Canvas 2D rendering backend.
//!
//! Implements the RenderBackend trait using HTML Canvas 2D API via web-sys.

use std::collections::HashMap;

use base64::Engine as _;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use crate::color::{Rgb, Rgba};
use crate::compose::{Path, PathEl, Rect, Space};
use crate::error::Result;
use crate::frames::{DrawOp, FrameCatalog, FrameDecoration};
use crate::layout::Viewport;
use crate::render::backend::{CellFilter, CutLineStyle, RenderBackend, RenderParams, Segment};
use crate::render::paint::{cut_line_segments, paint_sheet};
use crate::sheet::SheetState;
use crate::types::{CellImage, CellShape};

/// UI Constants
const WORKSPACE_BG: &str = "#1e1e1e";
const PAGE_BG: &str = "#ffffff";
const PAGE_SHADOW: &str = "rgba(0, 0, 0, 0.4)";
const PAGE_SHADOW_BLUR: f64 = 20.0;
const PAGE_SHADOW_OFFSET: f64 = 4.0;
const CELL_BORDER: &str = "#555555";
const CELL_SELECTED_BORDER: &str = "#4a9eff";

/// Cut-line look in the preview (CSS pixels).
pub const PREVIEW_CUT_LINES: CutLineStyle = CutLineStyle {
    color: Rgb::new(0x88, 0x88, 0x88),
    width: 1.0,
    dash: [4.0, 4.0],
};

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f32,
    space: Space,
    /// Cache for image elements (key: decoded image id)
    image_cache: HashMap<u64, HtmlImageElement>,
    /// Set when a frame skipped an image that had not finished decoding.
    images_pending: bool,
}

impl CanvasRenderer {
    /// Create a new Canvas renderer from an HtmlCanvasElement
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        Ok(Self {
            canvas,
            ctx,
            dpr: 1.0,
            space: Space::top_down(1.0, 0.0),
            image_cache: HashMap::new(),
            images_pending: false,
        })
    }

    /// True if the last render skipped an image element that is still loading.
    pub fn has_pending_images(&self) -> bool {
        self.images_pending
    }

    /// Resize the backing store to physical pixels.
    pub fn resize(&mut self, width: u32, height: u32, dpr: f32) {
        self.dpr = dpr;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// Drop cached image elements whose bitmaps are no longer on the sheet.
    pub fn retain_images(&mut self, sheet: &SheetState) {
        let live: std::collections::HashSet<u64> = sheet
            .cells()
            .iter()
            .filter_map(|c| c.image.as_ref().map(|i| i.decoded.id()))
            .collect();
        self.image_cache.retain(|id, _| live.contains(id));
    }

    /// Draw a filled rectangle
    fn fill_css_rect(&self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn set_line_dash(&self, dash: Option<[f64; 2]>) {
        let segments = js_sys::Array::new();
        if let Some([on, off]) = dash {
            segments.push(&JsValue::from_f64(on));
            segments.push(&JsValue::from_f64(off));
        }
        let _ = self.ctx.set_line_dash(&segments);
    }

    /// Trace a path into the context's current path.
    fn trace(&self, path: &Path) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(x, y) => self.ctx.move_to(x, y),
                PathEl::LineTo(x, y) => self.ctx.line_to(x, y),
                PathEl::CubicTo(x1, y1, x2, y2, x, y) => {
                    self.ctx.bezier_curve_to(x1, y1, x2, y2, x, y);
                }
                PathEl::Close => self.ctx.close_path(),
            }
        }
    }

    /// Get the document for creating image elements
    fn get_document(&self) -> Option<Document> {
        web_sys::window()?.document()
    }

    fn get_or_create_image(&mut self, image: &CellImage) -> Option<HtmlImageElement> {
        let id = image.decoded.id();
        if let Some(img) = self.image_cache.get(&id) {
            return Some(img.clone());
        }

        let document = self.get_document()?;
        let img = document
            .create_element("img")
            .ok()?
            .dyn_into::<HtmlImageElement>()
            .ok()?;

        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        let data_url = format!("data:{};base64,{}", image.format.mime(), data);
        img.set_src(&data_url);

        self.image_cache.insert(id, img.clone());
        Some(img)
    }

    fn stroke_cell_border(&self, rect: Rect, shape: CellShape, selected: bool) {
        let (color, width) = if selected {
            (CELL_SELECTED_BORDER, 2.0)
        } else {
            (CELL_BORDER, 1.0)
        };
        self.trace(&crate::compose::clip_path(shape, rect));
        self.set_line_dash(None);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    /// Render the page, every cell, cell outlines and cut lines.
    pub fn render(
        &mut self,
        sheet: &SheetState,
        frames: &FrameCatalog,
        viewport: &Viewport,
    ) -> Result<()> {
        let dpr = f64::from(self.dpr);
        self.ctx
            .set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
            .map_err(|_| "Failed to set transform")?;
        self.images_pending = false;
        self.space = viewport.space();

        self.fill_css_rect(0.0, 0.0, viewport.width, viewport.height, WORKSPACE_BG);

        let geometry = sheet.geometry();
        let page = self
            .space
            .rect(0.0, 0.0, geometry.page_width_mm, geometry.page_height_mm);
        self.ctx.save();
        self.ctx.set_shadow_color(PAGE_SHADOW);
        self.ctx.set_shadow_blur(PAGE_SHADOW_BLUR);
        self.ctx.set_shadow_offset_x(PAGE_SHADOW_OFFSET);
        self.ctx.set_shadow_offset_y(PAGE_SHADOW_OFFSET);
        self.fill_css_rect(page.x, page.y, page.width, page.height, PAGE_BG);
        self.ctx.restore();

        let params = RenderParams {
            sheet,
            frames,
            cells: CellFilter::All,
            cut_lines: None,
        };
        // Restore clean state even if a cell fails midway.
        self.ctx.save();
        let painted = paint_sheet(self, &params);
        self.ctx.restore();
        painted?;

        let shape = sheet.shape();
        for index in 0..sheet.len() {
            let Some(layout) = sheet.cell_layout(index) else {
                continue;
            };
            let rect = self.space.cell_rect(layout);
            self.stroke_cell_border(rect, shape, sheet.selected() == Some(index));
        }

        if sheet.settings().cut_lines {
            let segments = cut_line_segments(geometry, &self.space);
            self.stroke_segments(&segments, &PREVIEW_CUT_LINES)?;
        }
        Ok(())
    }
}

impl RenderBackend for CanvasRenderer {
    fn space(&self) -> Space {
        self.space
    }

    fn push_clip(&mut self, clip: &Path) -> Result<()> {
        self.ctx.save();
        self.trace(clip);
        self.ctx.clip();
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.ctx.restore();
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<()> {
        self.fill_css_rect(rect.x, rect.y, rect.width, rect.height, &color.to_hex());
        Ok(())
    }

    fn draw_image(&mut self, image: &CellImage, dest: Rect) -> Result<()> {
        let Some(img) = self.get_or_create_image(image) else {
            log::warn!("could not create an image element");
            return Ok(());
        };
        if img.natural_width() == 0 {
            self.images_pending = true;
            return Ok(());
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                &img,
                dest.x,
                dest.y,
                dest.width,
                dest.height,
            )
            .map_err(|_| "Failed to draw image")?;
        Ok(())
    }

    fn draw_frame(
        &mut self,
        frame: &dyn FrameDecoration,
        shape: CellShape,
        cell: Rect,
    ) -> Result<()> {
        for op in frame.decorate(shape, cell) {
            match op {
                DrawOp::Fill { path, color } => {
                    self.trace(&path);
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx.fill();
                }
                DrawOp::Stroke {
                    path,
                    color,
                    width,
                    dash,
                    round_cap,
                } => {
                    self.trace(&path);
                    self.set_line_dash(dash);
                    self.ctx.set_line_cap(if round_cap { "round" } else { "butt" });
                    self.ctx.set_stroke_style_str(&color.to_css());
                    self.ctx.set_line_width(width);
                    self.ctx.stroke();
                }
            }
        }
        self.set_line_dash(None);
        self.ctx.set_line_cap("butt");
        Ok(())
    }

    fn stroke_segments(&mut self, segments: &[Segment], style: &CutLineStyle) -> Result<()> {
        self.ctx.begin_path();
        for s in segments {
            self.ctx.move_to(s.x1, s.y1);
            self.ctx.line_to(s.x2, s.y2);
        }
        self.set_line_dash(Some(style.dash));
        self.ctx
            .set_stroke_style_str(&Rgba::from(style.color).to_css());
        self.ctx.set_line_width(style.width);
        self.ctx.stroke();
        self.set_line_dash(None);
        Ok(())
    }
}

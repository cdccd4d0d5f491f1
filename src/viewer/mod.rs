//! Main SheetView struct - the primary entry point for the browser front end.
//!
//! This module provides the WASM-exported `SheetView` struct that handles:
//! - Owning the sheet state, frame catalog and preview viewport
//! - Asynchronous image loads guarded by load tickets
//! - Canvas 2D preview rendering
//! - PDF / PNG / JPEG export behind a re-entrancy latch
//!
//! Pointer and keyboard wiring lives in JavaScript; it calls the methods
//! below with canvas-relative CSS pixel coordinates.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::Promise;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::{future_to_promise, JsFuture};
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

use crate::color::Rgb;
use crate::error::Result;
use crate::export::{export_image, export_pdf, ExportLatch, RasterFormat};
use crate::frames::FrameCatalog;
use crate::ingest::decode_image;
use crate::layout::Viewport;
#[cfg(target_arch = "wasm32")]
use crate::render::CanvasRenderer;
use crate::sheet::SheetState;
use crate::types::{clamp_image_scale, SheetSettings};

/// Shared state that outlives a single call (wasm32 load futures hold it)
pub(crate) struct ViewState {
    sheet: SheetState,
    frames: FrameCatalog,
    viewport: Viewport,
    needs_render: bool,
}

/// Which file an export produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Raster(RasterFormat),
}

/// The main viewer struct exported to JavaScript
#[wasm_bindgen]
pub struct SheetView {
    state: Rc<RefCell<ViewState>>,
    latch: ExportLatch,
    #[cfg(target_arch = "wasm32")]
    renderer: CanvasRenderer,
}

fn index_or_none(index: Option<usize>) -> i32 {
    index.and_then(|i| i32::try_from(i).ok()).unwrap_or(-1)
}

fn index_from_js(index: i32) -> Option<usize> {
    usize::try_from(index).ok()
}

// ============================================================================
// Rust API (all targets)
// ============================================================================

impl SheetView {
    fn from_parts(width: f64, height: f64) -> (Rc<RefCell<ViewState>>, ExportLatch) {
        let sheet = SheetState::default();
        let mut viewport = Viewport::new(width, height);
        viewport.set_page(sheet.geometry());
        let state = ViewState {
            sheet,
            frames: FrameCatalog::builtin(),
            viewport,
            needs_render: true,
        };
        (Rc::new(RefCell::new(state)), ExportLatch::new())
    }

    /// Run `f` against the sheet and mark the preview dirty.
    fn mutate<T>(&self, f: impl FnOnce(&mut SheetState) -> T) -> T {
        let mut s = self.state.borrow_mut();
        s.needs_render = true;
        f(&mut s.sheet)
    }

    /// Read-only access to the sheet.
    pub fn with_sheet<T>(&self, f: impl FnOnce(&SheetState) -> T) -> T {
        f(&self.state.borrow().sheet)
    }

    pub fn apply_settings(&self, settings: SheetSettings) {
        let mut s = self.state.borrow_mut();
        s.sheet.set_settings(settings);
        let ViewState {
            sheet, viewport, ..
        } = &mut *s;
        viewport.set_page(sheet.geometry());
        s.needs_render = true;
    }

    /// Decode and place an image without yielding. Returns the index it
    /// landed in, or `None` if a newer load or edit superseded it.
    pub fn load_bytes(
        &self,
        index: usize,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<Option<usize>> {
        let ticket = self
            .state
            .borrow_mut()
            .sheet
            .begin_load(index)
            .ok_or_else(|| format!("no cell at index {index}"))?;
        complete_decode(&self.state, ticket, bytes, mime)
    }

    /// Export under the latch. A second call while one runs fails with
    /// [`crate::error::SheetError::ExportBusy`].
    pub fn export(&self, kind: ExportKind) -> Result<Vec<u8>> {
        self.latch.run(|| {
            let s = self.state.borrow();
            match kind {
                ExportKind::Pdf => export_pdf(&s.sheet, &s.frames),
                ExportKind::Raster(format) => export_image(&s.sheet, &s.frames, format),
            }
        })
    }
}

fn complete_decode(
    state: &Rc<RefCell<ViewState>>,
    ticket: crate::sheet::LoadTicket,
    bytes: Vec<u8>,
    mime: Option<&str>,
) -> Result<Option<usize>> {
    match decode_image(bytes, mime) {
        Ok(image) => {
            let mut s = state.borrow_mut();
            let landed = s.sheet.complete_load(&ticket, image);
            s.needs_render |= landed.is_some();
            Ok(landed)
        }
        Err(e) => {
            log::warn!("image load #{} failed: {e}", ticket.generation());
            state.borrow_mut().sheet.fail_load(&ticket);
            Err(e)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SheetView {
    /// Viewer without a canvas, for native callers and tests.
    pub fn headless(width: f64, height: f64) -> Self {
        let (state, latch) = Self::from_parts(width, height);
        Self { state, latch }
    }

    pub fn latch(&self) -> &ExportLatch {
        &self.latch
    }
}

// ============================================================================
// Interaction API (exported, all targets)
// ============================================================================

#[wasm_bindgen]
impl SheetView {
    pub fn cell_count(&self) -> usize {
        self.with_sheet(SheetState::len)
    }

    pub fn cols(&self) -> u32 {
        self.with_sheet(|s| s.dims().0)
    }

    pub fn rows(&self) -> u32 {
        self.with_sheet(|s| s.dims().1)
    }

    /// Selected cell index, or -1.
    pub fn selected(&self) -> i32 {
        index_or_none(self.with_sheet(SheetState::selected))
    }

    /// Whether the preview should be redrawn.
    pub fn needs_render(&self) -> bool {
        self.state.borrow().needs_render
    }

    /// Cell under a canvas point, or -1. Circles only hit inside the disk.
    pub fn cell_at(&self, sx: f64, sy: f64) -> i32 {
        let s = self.state.borrow();
        let (x, y) = s.viewport.to_page(sx, sy);
        index_or_none(s.sheet.cell_at(x, y))
    }

    /// Select the cell under a canvas point (or nothing). Returns the index or -1.
    pub fn select_at(&self, sx: f64, sy: f64) -> i32 {
        let index = index_from_js(self.cell_at(sx, sy));
        self.mutate(|s| s.select(index));
        self.selected()
    }

    pub fn select(&self, index: i32) {
        self.mutate(|s| s.select(index_from_js(index)));
    }

    /// Move a cell's image by a pointer drag measured in canvas pixels.
    pub fn drag_image(&self, index: usize, dx: f64, dy: f64) {
        let (dx_mm, dy_mm) = self.state.borrow().viewport.screen_delta_to_mm(dx, dy);
        self.mutate(|s| s.move_image(index, dx_mm, dy_mm));
    }

    pub fn set_image_offset(&self, index: usize, x_mm: f64, y_mm: f64) {
        self.mutate(|s| s.set_image_offset(index, x_mm, y_mm));
    }

    pub fn center_image(&self, index: usize) {
        self.mutate(|s| s.center_image(index));
    }

    /// Set the image scale, clamped to the UI range.
    pub fn set_scale(&self, index: usize, scale: f64) {
        self.mutate(|s| s.set_scale(index, clamp_image_scale(scale)));
    }

    /// Wheel over a cell: one step per notch, sign from the wheel delta.
    pub fn wheel_scale(&self, index: usize, delta_y: f64) {
        let steps = if delta_y > 0.0 { -1 } else { 1 };
        self.mutate(|s| s.step_scale(index, steps));
    }

    /// Returns the target index or -1.
    pub fn duplicate_to_next(&self, index: usize) -> i32 {
        index_or_none(self.mutate(|s| s.duplicate_to_next(index)))
    }

    pub fn clear(&self, index: usize) {
        self.mutate(|s| s.clear(index));
    }

    pub fn clear_all(&self) {
        self.mutate(SheetState::clear_all);
    }

    /// Set a background from a CSS hex color. Returns false if unparsable.
    pub fn set_background(&self, index: usize, hex: &str) -> bool {
        let Some(color) = Rgb::from_hex(hex) else {
            return false;
        };
        self.mutate(|s| s.set_background_color(index, color));
        true
    }

    /// Set or remove (`None`) a cell's frame. Unknown ids are rejected.
    pub fn set_frame(&self, index: usize, frame_id: Option<String>) -> bool {
        let known = {
            let s = self.state.borrow();
            match frame_id.as_deref() {
                Some(id) => s.frames.contains(id),
                None => true,
            }
        };
        if known {
            self.mutate(|s| s.set_frame(index, frame_id));
        }
        known
    }

    /// Cells that `count` images would be loaded into, in order.
    pub fn load_targets(&self, count: usize) -> Vec<u32> {
        self.with_sheet(|s| s.load_targets(count))
            .into_iter()
            .filter_map(|i| u32::try_from(i).ok())
            .collect()
    }

    pub fn is_loading(&self, index: usize) -> bool {
        self.with_sheet(|s| s.cell(index).is_some_and(|c| c.is_loading()))
    }

    pub fn is_exporting(&self) -> bool {
        self.latch.is_busy()
    }

    // ---- viewport ----

    /// Additive zoom step (toolbar buttons).
    pub fn zoom_by(&self, delta: f64) {
        let mut s = self.state.borrow_mut();
        let zoom = s.viewport.zoom + delta;
        s.viewport.set_zoom(zoom);
        s.needs_render = true;
    }

    /// Zoom by `factor` keeping the canvas point `(sx, sy)` fixed.
    pub fn zoom_at(&self, factor: f64, sx: f64, sy: f64) {
        let mut s = self.state.borrow_mut();
        s.viewport.zoom_at(factor, sx, sy);
        s.needs_render = true;
    }

    pub fn zoom(&self) -> f64 {
        self.state.borrow().viewport.zoom
    }

    pub fn pan_by(&self, dx: f64, dy: f64) {
        let mut s = self.state.borrow_mut();
        s.viewport.pan_by(dx, dy);
        s.needs_render = true;
    }

    pub fn reset_view(&self) {
        let mut s = self.state.borrow_mut();
        s.viewport.reset();
        s.needs_render = true;
    }
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SheetView {
    /// Create a viewer drawing into `canvas`, whose backing store is already
    /// sized in physical pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, dpr: f32) -> std::result::Result<SheetView, JsValue> {
        console_error_panic_hook::set_once();

        let physical_width = canvas.width().max(1);
        let physical_height = canvas.height().max(1);
        let mut renderer = CanvasRenderer::new(canvas)?;
        renderer.resize(physical_width, physical_height, dpr);

        let (state, latch) = Self::from_parts(
            f64::from(physical_width) / f64::from(dpr),
            f64::from(physical_height) / f64::from(dpr),
        );
        Ok(Self {
            state,
            latch,
            renderer,
        })
    }

    pub fn resize(&mut self, physical_width: u32, physical_height: u32, dpr: f32) {
        self.renderer.resize(physical_width, physical_height, dpr);
        let mut s = self.state.borrow_mut();
        s.viewport.resize(
            f64::from(physical_width) / f64::from(dpr),
            f64::from(physical_height) / f64::from(dpr),
        );
        s.needs_render = true;
    }

    pub fn render(&mut self) -> std::result::Result<(), JsValue> {
        let mut s = self.state.borrow_mut();
        self.renderer.render(&s.sheet, &s.frames, &s.viewport)?;
        self.renderer.retain_images(&s.sheet);
        // Keep redrawing until image elements have decoded.
        s.needs_render = self.renderer.has_pending_images();
        Ok(())
    }

    pub fn settings(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.borrow().sheet.settings())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_settings(&self, settings: JsValue) -> std::result::Result<(), JsValue> {
        let settings: SheetSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.apply_settings(settings);
        Ok(())
    }

    pub fn geometry(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.borrow().sheet.geometry())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Decode `bytes` and place them in cell `index`. Resolves to `true` if
    /// the image landed, `false` if a newer load or edit superseded it.
    pub fn load_image(&self, index: usize, bytes: Vec<u8>, mime: Option<String>) -> Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            let ticket = state
                .borrow_mut()
                .sheet
                .begin_load(index)
                .ok_or_else(|| JsValue::from_str(&format!("no cell at index {index}")))?;
            // Let the page repaint before the decode blocks the thread.
            JsFuture::from(Promise::resolve(&JsValue::NULL)).await?;
            let landed = complete_decode(&state, ticket, bytes, mime.as_deref())?;
            Ok(JsValue::from_bool(landed.is_some()))
        })
    }

    pub fn export_pdf(&self) -> std::result::Result<Vec<u8>, JsValue> {
        Ok(self.export(ExportKind::Pdf)?)
    }

    pub fn export_png(&self) -> std::result::Result<Vec<u8>, JsValue> {
        Ok(self.export(ExportKind::Raster(RasterFormat::Png))?)
    }

    pub fn export_jpeg(&self, quality: u8) -> std::result::Result<Vec<u8>, JsValue> {
        Ok(self.export(ExportKind::Raster(RasterFormat::Jpeg { quality }))?)
    }
}

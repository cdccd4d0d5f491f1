//! Sheet export pipeline.
//!
//! Two outputs share the paint driver with the preview: a 300 DPI raster
//! image (PNG or JPEG) and a one-page print PDF. Exports paint only cells
//! that hold an image, so empty cells print blank.

pub mod pdf;

use std::cell::Cell;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};

use crate::color::Rgb;
use crate::error::{Result, SheetError};
use crate::frames::FrameCatalog;
use crate::ingest::encode_png;
use crate::render::{paint_sheet, CellFilter, CutLineStyle, RasterSurface, RenderParams};
use crate::sheet::SheetState;

pub use pdf::export_pdf;

/// Raster export resolution.
pub const EXPORT_DPI: f64 = 300.0;

/// Cut-line look in raster exports (pixels at 300 DPI).
pub const RASTER_CUT_LINES: CutLineStyle = CutLineStyle {
    color: Rgb::new(0x88, 0x88, 0x88),
    width: 1.0,
    dash: [6.0, 6.0],
};

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encoded raster output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    /// Quality is clamped to 1..=100.
    Jpeg { quality: u8 },
}

impl RasterFormat {
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// Pick a format from an output file name.
    pub fn from_path(path: &Path, quality: u8) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg { quality }),
            _ => None,
        }
    }
}

/// Re-entrancy latch: at most one export at a time.
///
/// Clones share the same flag. The guard returned by [`ExportLatch::acquire`]
/// releases it on drop, whatever the export's outcome.
#[derive(Debug, Clone, Default)]
pub struct ExportLatch {
    busy: Rc<Cell<bool>>,
}

#[derive(Debug)]
pub struct ExportGuard {
    busy: Rc<Cell<bool>>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

impl ExportLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn acquire(&self) -> Result<ExportGuard> {
        if self.busy.replace(true) {
            log::warn!("export requested while another one is running");
            return Err(SheetError::ExportBusy);
        }
        Ok(ExportGuard {
            busy: Rc::clone(&self.busy),
        })
    }

    /// Run `f` while holding the latch.
    pub fn run<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self.acquire()?;
        f()
    }
}

/// Paint the sheet onto a white page at `dpi`.
pub fn render_raster(sheet: &SheetState, frames: &FrameCatalog, dpi: f64) -> Result<RgbaImage> {
    let geometry = sheet.geometry();
    let mut surface = RasterSurface::new(geometry.page_width_mm, geometry.page_height_mm, dpi)?;
    let style = CutLineStyle {
        width: RASTER_CUT_LINES.width * dpi / EXPORT_DPI,
        dash: RASTER_CUT_LINES.dash.map(|d| d * dpi / EXPORT_DPI),
        ..RASTER_CUT_LINES
    };
    let params = RenderParams {
        sheet,
        frames,
        cells: CellFilter::WithImage,
        cut_lines: sheet.settings().cut_lines.then_some(style),
    };
    paint_sheet(&mut surface, &params)?;
    surface.to_rgba_image()
}

/// Encode a page image.
pub fn encode_raster(image: &RgbaImage, format: RasterFormat) -> Result<Vec<u8>> {
    match format {
        RasterFormat::Png => encode_png(image),
        RasterFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut out = Cursor::new(Vec::new());
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
            Ok(out.into_inner())
        }
    }
}

/// Render the sheet at 300 DPI and encode it.
pub fn export_image(
    sheet: &SheetState,
    frames: &FrameCatalog,
    format: RasterFormat,
) -> Result<Vec<u8>> {
    let page = render_raster(sheet, frames, EXPORT_DPI)?;
    let bytes = encode_raster(&page, format)?;
    log::info!(
        "exported {}x{} {} ({} bytes)",
        page.width(),
        page.height(),
        format.extension(),
        bytes.len()
    );
    Ok(bytes)
}

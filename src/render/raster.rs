//! CPU raster backend on top of tiny-skia.
//!
//! The surface is a premultiplied RGBA pixmap in a top-down pixel space.
//! Clips are coverage masks; images are uploaded once per decoded bitmap
//! and reused by every cell that shows them.

use std::collections::HashMap;

use image::RgbaImage;
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, Mask, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

use super::backend::{CutLineStyle, RenderBackend, Segment};
use crate::color::{Rgb, Rgba};
use crate::compose::{Path, PathEl, Rect, Space};
use crate::error::{Result, SheetError};
use crate::frames::{DrawOp, FrameDecoration};
use crate::types::{CellImage, CellShape};

pub const MM_PER_INCH: f64 = 25.4;

/// Pixel count covering `mm` at `dpi`, never less than one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn px_for_mm(mm: f64, dpi: f64) -> u32 {
    let px = (mm * dpi / MM_PER_INCH).round();
    if px.is_finite() {
        px.clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[allow(clippy::cast_possible_truncation)]
fn f(v: f64) -> f32 {
    v as f32
}

pub(crate) fn skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(x, y) => pb.move_to(f(x), f(y)),
            PathEl::LineTo(x, y) => pb.line_to(f(x), f(y)),
            PathEl::CubicTo(x1, y1, x2, y2, x, y) => {
                pb.cubic_to(f(x1), f(y1), f(x2), f(y2), f(x), f(y));
            }
            PathEl::Close => pb.close(),
        }
    }
    pb.finish()
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Draw frame ops onto a pixmap. Ops that degenerate to an empty path are
/// skipped.
pub(crate) fn paint_ops(
    pixmap: &mut Pixmap,
    ops: &[DrawOp],
    transform: Transform,
    mask: Option<&Mask>,
) {
    for op in ops {
        match op {
            DrawOp::Fill { path, color } => {
                let Some(path) = skia_path(path) else { continue };
                pixmap.fill_path(&path, &paint_for(*color), FillRule::Winding, transform, mask);
            }
            DrawOp::Stroke {
                path,
                color,
                width,
                dash,
                round_cap,
            } => {
                let Some(path) = skia_path(path) else { continue };
                let stroke = Stroke {
                    width: f(*width),
                    line_cap: if *round_cap { LineCap::Round } else { LineCap::Butt },
                    dash: dash.and_then(|[on, off]| StrokeDash::new(vec![f(on), f(off)], 0.0)),
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint_for(*color), &stroke, transform, mask);
            }
        }
    }
}

/// Upload straight-alpha pixels into a premultiplied pixmap.
pub(crate) fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        SheetError::Raster(format!(
            "cannot allocate {}x{} pixmap",
            image.width(),
            image.height()
        ))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Read a pixmap back as straight-alpha RGBA.
pub(crate) fn rgba_from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| SheetError::Raster("pixel buffer size mismatch".into()))
}

/// Rasterize one frame into a transparent tile of `width_px` by `height_px`.
pub(crate) fn render_frame_tile(
    frame: &dyn FrameDecoration,
    shape: CellShape,
    width_px: u32,
    height_px: u32,
) -> Result<Pixmap> {
    let mut tile = Pixmap::new(width_px, height_px)
        .ok_or_else(|| SheetError::Raster("cannot allocate frame tile".into()))?;
    let bounds = Rect::new(0.0, 0.0, f64::from(width_px), f64::from(height_px));
    paint_ops(
        &mut tile,
        &frame.decorate(shape, bounds),
        Transform::identity(),
        None,
    );
    Ok(tile)
}

/// Transform that maps a `src_w` by `src_h` bitmap onto `dest`.
fn place(dest: Rect, src_w: u32, src_h: u32) -> Transform {
    let sx = dest.width / f64::from(src_w.max(1));
    let sy = dest.height / f64::from(src_h.max(1));
    Transform::from_row(f(sx), 0.0, 0.0, f(sy), f(dest.x), f(dest.y))
}

/// Offscreen page surface.
pub struct RasterSurface {
    pixmap: Pixmap,
    space: Space,
    clips: Vec<Mask>,
    images: HashMap<u64, Pixmap>,
}

impl RasterSurface {
    /// Blank white page of the given size at `dpi`.
    pub fn new(page_width_mm: f64, page_height_mm: f64, dpi: f64) -> Result<Self> {
        let width = px_for_mm(page_width_mm, dpi);
        let height = px_for_mm(page_height_mm, dpi);
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| SheetError::Raster(format!("cannot allocate {width}x{height} page")))?;
        pixmap.fill(Color::WHITE);
        log::debug!("raster surface {width}x{height} px at {dpi} dpi");
        Ok(Self {
            pixmap,
            space: Space::top_down(dpi / MM_PER_INCH, page_height_mm),
            clips: Vec::new(),
            images: HashMap::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        rgba_from_pixmap(&self.pixmap)
    }

    fn uploaded(&mut self, image: &CellImage) -> Result<&Pixmap> {
        let id = image.decoded.id();
        if !self.images.contains_key(&id) {
            let pixmap = pixmap_from_rgba(image.decoded.pixels())?;
            self.images.insert(id, pixmap);
        }
        self.images
            .get(&id)
            .ok_or_else(|| SheetError::Raster("image cache miss".into()))
    }
}

impl RenderBackend for RasterSurface {
    fn space(&self) -> Space {
        self.space
    }

    fn push_clip(&mut self, clip: &Path) -> Result<()> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| SheetError::Raster("cannot allocate clip mask".into()))?;
        if let Some(path) = skia_path(clip) {
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
        }
        if let Some(outer) = self.clips.last() {
            for (d, o) in mask.data_mut().iter_mut().zip(outer.data()) {
                let v = (u16::from(*d) * u16::from(*o) + 127) / 255;
                *d = u8::try_from(v).unwrap_or(u8::MAX);
            }
        }
        self.clips.push(mask);
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.clips
            .pop()
            .map(|_| ())
            .ok_or_else(|| SheetError::Render("clip stack underflow".into()))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<()> {
        let Some(r) =
            tiny_skia::Rect::from_xywh(f(rect.x), f(rect.y), f(rect.width), f(rect.height))
        else {
            return Ok(());
        };
        let paint = paint_for(color.into());
        self.pixmap
            .fill_rect(r, &paint, Transform::identity(), self.clips.last());
        Ok(())
    }

    fn draw_image(&mut self, image: &CellImage, dest: Rect) -> Result<()> {
        let transform = place(dest, image.decoded.width(), image.decoded.height());
        // Split borrows: the source lives in the cache, the target is the page.
        let id = image.decoded.id();
        self.uploaded(image)?;
        let Self {
            pixmap,
            clips,
            images,
            ..
        } = self;
        if let Some(src) = images.get(&id) {
            let paint = PixmapPaint {
                quality: FilterQuality::Bicubic,
                ..PixmapPaint::default()
            };
            pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, clips.last());
        }
        Ok(())
    }

    fn draw_frame(
        &mut self,
        frame: &dyn FrameDecoration,
        shape: CellShape,
        cell: Rect,
    ) -> Result<()> {
        let ops = frame.decorate(shape, cell);
        paint_ops(&mut self.pixmap, &ops, Transform::identity(), self.clips.last());
        Ok(())
    }

    fn stroke_segments(&mut self, segments: &[Segment], style: &CutLineStyle) -> Result<()> {
        let mut pb = PathBuilder::new();
        for s in segments {
            pb.move_to(f(s.x1), f(s.y1));
            pb.line_to(f(s.x2), f(s.y2));
        }
        let Some(path) = pb.finish() else {
            return Ok(());
        };
        let stroke = Stroke {
            width: f(style.width),
            dash: StrokeDash::new(vec![f(style.dash[0]), f(style.dash[1])], 0.0),
            ..Stroke::default()
        };
        let paint = paint_for(style.color.into());
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{DecodedImage, ImageFormat};

    fn pixel(surface: &RasterSurface, x: u32, y: u32) -> [u8; 4] {
        let c = surface.pixmap().pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn page_size_at_300_dpi() {
        assert_eq!(px_for_mm(210.0, 300.0), 2480);
        assert_eq!(px_for_mm(297.0, 300.0), 3508);
        assert_eq!(px_for_mm(0.0, 300.0), 1);
    }

    #[test]
    fn fill_respects_circular_clip() {
        let mut s = RasterSurface::new(10.0, 10.0, MM_PER_INCH * 10.0).unwrap();
        assert_eq!(s.width(), 100);
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        s.push_clip(&crate::compose::clip_path(CellShape::Circle, cell))
            .unwrap();
        s.fill_rect(cell, Rgb::BLACK).unwrap();
        s.pop_clip().unwrap();
        assert_eq!(pixel(&s, 50, 50), [0, 0, 0, 255]);
        // Corners lie outside the inscribed disk.
        assert_eq!(pixel(&s, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn image_is_scaled_into_destination() {
        let mut s = RasterSurface::new(10.0, 10.0, MM_PER_INCH * 10.0).unwrap();
        let red = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let img = CellImage::new(DecodedImage::new(red), vec![], ImageFormat::Png);
        s.draw_image(&img, Rect::new(20.0, 20.0, 40.0, 40.0)).unwrap();
        assert_eq!(pixel(&s, 40, 40), [255, 0, 0, 255]);
        assert_eq!(pixel(&s, 10, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn pop_without_push_is_an_error() {
        let mut s = RasterSurface::new(10.0, 10.0, 72.0).unwrap();
        assert!(s.pop_clip().is_err());
    }

    #[test]
    fn premultiply_round_trip_keeps_opaque_pixels() {
        let src = RgbaImage::from_pixel(3, 1, image::Rgba([10, 200, 30, 255]));
        let back = rgba_from_pixmap(&pixmap_from_rgba(&src).unwrap()).unwrap();
        assert_eq!(back, src);
    }
}

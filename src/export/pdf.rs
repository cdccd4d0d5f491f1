//! One-page print PDF.
//!
//! The page is sized exactly to the paper (1 mm = 72/25.4 pt) and asks
//! viewers not to scale it when printing. Every distinct image is embedded
//! once and referenced by each cell that shows it. JPEG data passes through
//! untouched; everything else goes in as deflated RGB with a soft mask for
//! alpha. Frames are rasterized at 4 px/mm and embedded the same way.

use std::collections::HashMap;
use std::rc::Rc;

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::color::Rgb;
use crate::compose::{Path, PathEl, Rect, Space};
use crate::error::Result;
use crate::frames::{FrameCatalog, FrameDecoration};
use crate::render::raster::{px_for_mm, render_frame_tile, rgba_from_pixmap, MM_PER_INCH};
use crate::render::{paint_sheet, CellFilter, CutLineStyle, RenderBackend, RenderParams, Segment};
use crate::sheet::SheetState;
use crate::types::{CellImage, CellShape, ImageFormat};

pub const PT_PER_MM: f64 = 72.0 / MM_PER_INCH;

/// Frame tile resolution.
pub const FRAME_PX_PER_MM: f64 = 4.0;

/// Cut-line look in the PDF (points).
pub const PDF_CUT_LINES: CutLineStyle = CutLineStyle {
    color: Rgb::new(153, 153, 153),
    width: 0.5,
    dash: [3.0, 3.0],
};

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn num(v: f64) -> Object {
    v.into()
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    color.to_unit().iter().map(|c| num(*c)).collect()
}

/// Number of color components declared by the first SOF marker.
pub(crate) fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if bytes.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut i = 2;
    loop {
        if *bytes.get(i)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(i + 1)?;
        match marker {
            0xFF => {
                i += 1;
                continue;
            }
            0x01 | 0xD0..=0xD7 => {
                i += 2;
                continue;
            }
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return bytes.get(i + 9).copied();
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }
        let len = u16::from_be_bytes([*bytes.get(i + 2)?, *bytes.get(i + 3)?]);
        i += 2 + usize::from(len);
    }
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    }
}

struct PdfPage {
    doc: Document,
    space: Space,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    next_name: usize,
    /// Embedded images by encoded bytes.
    images: HashMap<Rc<[u8]>, String>,
    frames: HashMap<(String, CellShape, u32, u32), Option<String>>,
}

impl PdfPage {
    fn new(page_height_mm: f64) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            space: Space::bottom_up(PT_PER_MM, page_height_mm),
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            next_name: 1,
            images: HashMap::new(),
            frames: HashMap::new(),
        }
    }

    fn register(&mut self, id: ObjectId) -> String {
        let name = format!("Im{}", self.next_name);
        self.next_name += 1;
        self.xobjects.set(name.as_bytes().to_vec(), id);
        name
    }

    /// Deflated RGB plus an alpha soft mask when any pixel is translucent.
    fn embed_rgba(&mut self, pixels: &RgbaImage) -> ObjectId {
        let (w, h) = pixels.dimensions();
        let mut rgb = Vec::with_capacity(pixels.as_raw().len() / 4 * 3);
        let mut alpha = Vec::with_capacity(pixels.as_raw().len() / 4);
        for p in pixels.pixels() {
            let [r, g, b, a] = p.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }
        let mut dict = image_dict(w, h, "DeviceRGB");
        if alpha.iter().any(|a| *a < 255) {
            let smask = self
                .doc
                .add_object(Stream::new(image_dict(w, h, "DeviceGray"), alpha));
            dict.set("SMask", smask);
        }
        self.doc.add_object(Stream::new(dict, rgb))
    }

    fn embed_jpeg(&mut self, image: &CellImage) -> Option<ObjectId> {
        let color_space = match jpeg_components(&image.bytes)? {
            1 => "DeviceGray",
            3 => "DeviceRGB",
            _ => return None,
        };
        let mut dict = image_dict(image.decoded.width(), image.decoded.height(), color_space);
        dict.set("Filter", "DCTDecode");
        let stream = Stream::new(dict, image.bytes.to_vec()).with_compression(false);
        Some(self.doc.add_object(stream))
    }

    fn embed_image(&mut self, image: &CellImage) -> String {
        if let Some(name) = self.images.get(&image.bytes) {
            return name.clone();
        }
        let id = match image.format {
            ImageFormat::Jpeg => self.embed_jpeg(image).unwrap_or_else(|| {
                log::debug!("JPEG color space not passed through, re-encoding as RGB");
                self.embed_rgba(image.decoded.pixels())
            }),
            ImageFormat::Png => self.embed_rgba(image.decoded.pixels()),
        };
        let name = self.register(id);
        self.images.insert(Rc::clone(&image.bytes), name.clone());
        name
    }

    fn embed_frame(
        &mut self,
        frame: &dyn FrameDecoration,
        shape: CellShape,
        cell: Rect,
    ) -> Option<String> {
        let w_px = px_for_mm(cell.width / PT_PER_MM, FRAME_PX_PER_MM * MM_PER_INCH);
        let h_px = px_for_mm(cell.height / PT_PER_MM, FRAME_PX_PER_MM * MM_PER_INCH);
        let key = (frame.id().to_string(), shape, w_px, h_px);
        if let Some(name) = self.frames.get(&key) {
            return name.clone();
        }
        let name = match render_frame_tile(frame, shape, w_px, h_px)
            .and_then(|tile| rgba_from_pixmap(&tile))
        {
            Ok(pixels) => {
                let id = self.embed_rgba(&pixels);
                Some(self.register(id))
            }
            Err(e) => {
                log::warn!("frame '{}' could not be rasterized: {e}", frame.id());
                None
            }
        };
        self.frames.insert(key, name.clone());
        name
    }

    /// Place a named XObject so its unit square covers `dest`.
    fn place(&mut self, name: &str, dest: Rect) {
        self.ops.push(op("q", vec![]));
        self.ops.push(op(
            "cm",
            vec![
                num(dest.width),
                num(0.0),
                num(0.0),
                num(dest.height),
                num(dest.x),
                num(dest.y),
            ],
        ));
        self.ops
            .push(op("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(op("Q", vec![]));
    }

    fn trace(&mut self, path: &Path) {
        for el in path.elements() {
            let o = match *el {
                PathEl::MoveTo(x, y) => op("m", vec![num(x), num(y)]),
                PathEl::LineTo(x, y) => op("l", vec![num(x), num(y)]),
                PathEl::CubicTo(x1, y1, x2, y2, x, y) => op(
                    "c",
                    vec![num(x1), num(y1), num(x2), num(y2), num(x), num(y)],
                ),
                PathEl::Close => op("h", vec![]),
            };
            self.ops.push(o);
        }
    }

    fn finish(mut self, page_width_mm: f64, page_height_mm: f64) -> Result<Vec<u8>> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let resources_id = self.doc.add_object(dictionary! {
            "XObject" => self.xobjects.clone(),
        });

        let pages_id = self.doc.new_object_id();
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                num(0.0),
                num(0.0),
                num(page_width_mm * PT_PER_MM),
                num(page_height_mm * PT_PER_MM),
            ],
        });
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "ViewerPreferences" => dictionary! {
                "PrintScaling" => "None",
            },
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

impl RenderBackend for PdfPage {
    fn space(&self) -> Space {
        self.space
    }

    fn push_clip(&mut self, clip: &Path) -> Result<()> {
        self.ops.push(op("q", vec![]));
        self.trace(clip);
        self.ops.push(op("W", vec![]));
        self.ops.push(op("n", vec![]));
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.ops.push(op("Q", vec![]));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<()> {
        self.ops.push(op("rg", rgb_operands(color)));
        self.ops.push(op(
            "re",
            vec![num(rect.x), num(rect.y), num(rect.width), num(rect.height)],
        ));
        self.ops.push(op("f", vec![]));
        Ok(())
    }

    fn draw_image(&mut self, image: &CellImage, dest: Rect) -> Result<()> {
        let name = self.embed_image(image);
        self.place(&name, dest);
        Ok(())
    }

    fn draw_frame(
        &mut self,
        frame: &dyn FrameDecoration,
        shape: CellShape,
        cell: Rect,
    ) -> Result<()> {
        if let Some(name) = self.embed_frame(frame, shape, cell) {
            self.place(&name, cell);
        }
        Ok(())
    }

    fn stroke_segments(
        &mut self,
        segments: &[Segment],
        style: &CutLineStyle,
    ) -> Result<()> {
        self.ops.push(op("q", vec![]));
        self.ops.push(op("RG", rgb_operands(style.color)));
        self.ops.push(op("w", vec![num(style.width)]));
        self.ops.push(op(
            "d",
            vec![
                Object::Array(vec![num(style.dash[0]), num(style.dash[1])]),
                num(0.0),
            ],
        ));
        for s in segments {
            self.ops.push(op("m", vec![num(s.x1), num(s.y1)]));
            self.ops.push(op("l", vec![num(s.x2), num(s.y2)]));
        }
        self.ops.push(op("S", vec![]));
        self.ops.push(op("Q", vec![]));
        Ok(())
    }
}

/// Build the print PDF for the sheet.
pub fn export_pdf(sheet: &SheetState, frames: &FrameCatalog) -> Result<Vec<u8>> {
    let geometry = sheet.geometry();
    let mut page = PdfPage::new(geometry.page_height_mm);
    let params = RenderParams {
        sheet,
        frames,
        cells: CellFilter::WithImage,
        cut_lines: sheet.settings().cut_lines.then_some(PDF_CUT_LINES),
    };
    paint_sheet(&mut page, &params)?;
    let embedded = page.images.len();
    let bytes = page.finish(geometry.page_width_mm, geometry.page_height_mm)?;
    log::info!(
        "exported PDF {:.1}x{:.1} mm, {embedded} distinct images ({} bytes)",
        geometry.page_width_mm,
        geometry.page_height_mm,
        bytes.len()
    );
    Ok(bytes)
}

//! The shared paint driver.

use super::backend::{CellFilter, RenderBackend, RenderParams, Segment};
use crate::compose::{plan_cell, CellPlan, Space};
use crate::error::Result;
use crate::frames::{FrameCatalog, FrameDecoration};
use crate::layout::GridGeometry;
use crate::types::CellShape;

fn lookup_frame<'a>(frames: &'a FrameCatalog, plan: &CellPlan) -> Option<&'a dyn FrameDecoration> {
    let id = plan.frame_id?;
    let frame = frames.get(id);
    if frame.is_none() {
        log::warn!("cell {}: unknown frame '{id}', skipping", plan.index);
    }
    frame
}

fn paint_clipped<B: RenderBackend + ?Sized>(
    backend: &mut B,
    plan: &CellPlan,
    shape: CellShape,
    frame: Option<&dyn FrameDecoration>,
) -> Result<()> {
    backend.fill_rect(plan.rect, plan.background)?;
    if let Some((image, dest)) = plan.image {
        backend.draw_image(image, dest)?;
    }
    if let Some(frame) = frame.filter(|f| !f.bleeds()) {
        backend.draw_frame(frame, shape, plan.rect)?;
    }
    Ok(())
}

/// Paint one cell: background, image and frame inside the clip, then any
/// bleeding frame on top. The clip is always popped, even on error.
pub fn paint_cell<B: RenderBackend + ?Sized>(
    backend: &mut B,
    plan: &CellPlan,
    shape: CellShape,
    frames: &FrameCatalog,
) -> Result<()> {
    let frame = lookup_frame(frames, plan);

    backend.push_clip(&plan.clip)?;
    let clipped = paint_clipped(backend, plan, shape, frame);
    backend.pop_clip()?;
    clipped?;

    if let Some(frame) = frame.filter(|f| f.bleeds()) {
        backend.draw_frame(frame, shape, plan.rect)?;
    }
    Ok(())
}

/// Paint the sheet's cells and cut lines through a backend.
pub fn paint_sheet<B: RenderBackend + ?Sized>(backend: &mut B, params: &RenderParams) -> Result<()> {
    let sheet = params.sheet;
    let geometry = sheet.geometry();
    let shape = sheet.shape();
    let space = backend.space();

    for (index, state) in sheet.cells().iter().enumerate() {
        if params.cells == CellFilter::WithImage && !state.has_image() {
            continue;
        }
        let Some(layout) = sheet.cell_layout(index) else {
            continue;
        };
        let plan = plan_cell(index, layout, state, shape, &space);
        paint_cell(backend, &plan, shape, params.frames)?;
    }

    if let Some(style) = params.cut_lines {
        let segments = cut_line_segments(geometry, &space);
        if !segments.is_empty() {
            backend.stroke_segments(&segments, &style)?;
        }
    }
    Ok(())
}

/// Cut-line segments mapped into `space`.
pub fn cut_line_segments(geometry: &GridGeometry, space: &Space) -> Vec<Segment> {
    geometry
        .cut_segments()
        .iter()
        .map(|s| {
            let (x1, y1) = space.point(s.x1, s.y1);
            let (x2, y2) = space.point(s.x2, s.y2);
            Segment { x1, y1, x2, y2 }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::compose::{Path, Rect, Space};
    use crate::render::{CutLineStyle, RenderBackend};
    use crate::sheet::SheetState;
    use crate::types::{CellImage, DecodedImage, ImageFormat, SheetSettings};

    /// Records the call sequence.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_image: bool,
    }

    impl RenderBackend for Recorder {
        fn space(&self) -> Space {
            Space::top_down(1.0, 297.0)
        }
        fn push_clip(&mut self, _clip: &Path) -> Result<()> {
            self.calls.push("clip".into());
            Ok(())
        }
        fn pop_clip(&mut self) -> Result<()> {
            self.calls.push("unclip".into());
            Ok(())
        }
        fn fill_rect(&mut self, _rect: Rect, _color: Rgb) -> Result<()> {
            self.calls.push("bg".into());
            Ok(())
        }
        fn draw_image(&mut self, _image: &CellImage, _dest: Rect) -> Result<()> {
            self.calls.push("image".into());
            if self.fail_image {
                return Err("boom".into());
            }
            Ok(())
        }
        fn draw_frame(
            &mut self,
            frame: &dyn FrameDecoration,
            _shape: CellShape,
            _cell: Rect,
        ) -> Result<()> {
            self.calls.push(format!("frame:{}", frame.id()));
            Ok(())
        }
        fn stroke_segments(&mut self, segments: &[Segment], _style: &CutLineStyle) -> Result<()> {
            self.calls.push(format!("cuts:{}", segments.len()));
            Ok(())
        }
    }

    fn sheet_with_one_image() -> SheetState {
        let mut sheet = SheetState::new(SheetSettings::default());
        let img = CellImage::new(
            DecodedImage::new(image::RgbaImage::new(2, 2)),
            vec![0],
            ImageFormat::Png,
        );
        sheet.set_image(0, img);
        sheet.set_frame(0, Some("thin".into()));
        sheet
    }

    #[test]
    fn order_is_background_image_frame() {
        let sheet = sheet_with_one_image();
        let frames = FrameCatalog::builtin();
        let mut rec = Recorder::default();
        let params = RenderParams {
            sheet: &sheet,
            frames: &frames,
            cells: CellFilter::WithImage,
            cut_lines: None,
        };
        paint_sheet(&mut rec, &params).unwrap();
        assert_eq!(rec.calls, ["clip", "bg", "image", "frame:thin", "unclip"]);
    }

    #[test]
    fn clip_is_released_when_a_draw_fails() {
        let sheet = sheet_with_one_image();
        let frames = FrameCatalog::builtin();
        let mut rec = Recorder {
            fail_image: true,
            ..Recorder::default()
        };
        let params = RenderParams {
            sheet: &sheet,
            frames: &frames,
            cells: CellFilter::All,
            cut_lines: None,
        };
        assert!(paint_sheet(&mut rec, &params).is_err());
        assert_eq!(rec.calls.last().unwrap(), "unclip");
    }

    #[test]
    fn all_cells_and_cut_lines() {
        let sheet = SheetState::default();
        let frames = FrameCatalog::new();
        let mut rec = Recorder::default();
        let params = RenderParams {
            sheet: &sheet,
            frames: &frames,
            cells: CellFilter::All,
            cut_lines: Some(CutLineStyle {
                color: Rgb::BLACK,
                width: 1.0,
                dash: [4.0, 4.0],
            }),
        };
        paint_sheet(&mut rec, &params).unwrap();
        let bgs = rec.calls.iter().filter(|c| *c == "bg").count();
        assert_eq!(bgs, sheet.len());
        let g = sheet.geometry();
        let expected = format!(
            "cuts:{}",
            g.cut_lines_vertical.len() + g.cut_lines_horizontal.len()
        );
        assert_eq!(rec.calls.last().unwrap(), &expected);
    }
}

//! Decorative cell frames.
//!
//! A frame turns a cell's bounds into a list of [`DrawOp`]s. The ops are
//! backend-neutral and always expressed in a top-down space, so the preview
//! and raster backends draw them directly while the PDF exporter rasterizes
//! them into an image first.

mod builtin;
mod parts;

use std::collections::HashMap;

use serde::Serialize;

use crate::color::Rgba;
use crate::compose::{Path, Rect};
use crate::types::CellShape;

pub use parts::Part;

/// One drawing instruction emitted by a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        path: Path,
        color: Rgba,
    },
    Stroke {
        path: Path,
        color: Rgba,
        width: f64,
        /// On/off lengths, if dashed.
        dash: Option<[f64; 2]>,
        round_cap: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameCategory {
    Fantasy,
    Dark,
    Scifi,
    Anime,
    Metal,
    Minimal,
}

impl FrameCategory {
    pub const ALL: [Self; 6] = [
        Self::Fantasy,
        Self::Dark,
        Self::Scifi,
        Self::Anime,
        Self::Metal,
        Self::Minimal,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fantasy => "Classic Fantasy",
            Self::Dark => "Dark & Horror",
            Self::Scifi => "Sci-Fi & Cyber",
            Self::Anime => "Anime & Stylized",
            Self::Metal => "Metal & Material",
            Self::Minimal => "Minimal & Clean",
        }
    }
}

/// A renderable frame, addressed by id.
pub trait FrameDecoration {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> FrameCategory;

    /// Drawing ops for a cell with the given shape and bounds (top-down space).
    fn decorate(&self, shape: CellShape, bounds: Rect) -> Vec<DrawOp>;

    /// Frames that bleed are drawn outside the cell clip.
    fn bleeds(&self) -> bool {
        false
    }
}

/// Frame defined by a list of parts, all sized relative to the cell width.
pub struct RecipeFrame {
    id: String,
    name: String,
    category: FrameCategory,
    parts: Vec<Part>,
}

impl RecipeFrame {
    pub fn new(id: &str, name: &str, category: FrameCategory, parts: Vec<Part>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            parts,
        }
    }
}

impl FrameDecoration for RecipeFrame {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> FrameCategory {
        self.category
    }

    fn decorate(&self, shape: CellShape, bounds: Rect) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        for part in &self.parts {
            part.emit(shape, bounds, &mut ops);
        }
        ops
    }
}

/// Catalog row exposed to the front end.
#[derive(Debug, Clone, Serialize)]
pub struct FrameInfo {
    pub id: String,
    pub name: String,
    pub category: FrameCategory,
    #[serde(rename = "categoryName")]
    pub category_name: &'static str,
}

/// Frames by id, in registration order.
#[derive(Default)]
pub struct FrameCatalog {
    frames: Vec<Box<dyn FrameDecoration>>,
    by_id: HashMap<String, usize>,
}

impl FrameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in frame.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for frame in builtin::frames() {
            catalog.register(Box::new(frame));
        }
        catalog
    }

    /// Add a frame. A frame with the same id replaces the earlier one.
    pub fn register(&mut self, frame: Box<dyn FrameDecoration>) {
        let id = frame.id().to_string();
        match self.by_id.get(&id).copied() {
            Some(i) => {
                if let Some(slot) = self.frames.get_mut(i) {
                    *slot = frame;
                }
            }
            None => {
                self.by_id.insert(id, self.frames.len());
                self.frames.push(frame);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn FrameDecoration> {
        let i = *self.by_id.get(id)?;
        self.frames.get(i).map(|f| f.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FrameDecoration> {
        self.frames.iter().map(|f| f.as_ref())
    }

    pub fn in_category(
        &self,
        category: FrameCategory,
    ) -> impl Iterator<Item = &dyn FrameDecoration> {
        self.iter().filter(move |f| f.category() == category)
    }

    pub fn infos(&self) -> Vec<FrameInfo> {
        self.iter()
            .map(|f| FrameInfo {
                id: f.id().to_string(),
                name: f.name().to_string(),
                category: f.category(),
                category_name: f.category().name(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique_and_resolvable() {
        let catalog = FrameCatalog::builtin();
        assert!(catalog.len() >= 20);
        for info in catalog.infos() {
            assert_eq!(catalog.get(&info.id).unwrap().id(), info.id);
        }
        assert!(catalog.get("no-such-frame").is_none());
    }

    #[test]
    fn every_category_has_frames() {
        let catalog = FrameCatalog::builtin();
        for cat in FrameCategory::ALL {
            assert!(catalog.in_category(cat).count() > 0, "{cat:?} is empty");
        }
    }

    #[test]
    fn register_replaces_same_id() {
        let mut catalog = FrameCatalog::builtin();
        let before = catalog.len();
        catalog.register(Box::new(RecipeFrame::new(
            "thin",
            "Replaced",
            FrameCategory::Minimal,
            Vec::new(),
        )));
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.get("thin").unwrap().name(), "Replaced");
    }

    #[test]
    fn thin_frame_is_one_white_ring() {
        let catalog = FrameCatalog::builtin();
        let ops = catalog
            .get("thin")
            .unwrap()
            .decorate(CellShape::Circle, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            DrawOp::Stroke { color, width, .. } => {
                assert_eq!(*color, Rgba::new(255, 255, 255, 255));
                assert!((width - 1.8).abs() < 1e-9);
            }
            DrawOp::Fill { .. } => panic!("expected a stroke"),
        }
    }
}

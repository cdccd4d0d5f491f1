//! JSON project files for the command-line exporter.
//!
//! ```json
//! {
//!   "settings": { "paper": "a4", "cellSizeMm": 25.4, "shape": "circle" },
//!   "cells": [
//!     { "row": 0, "col": 0, "image": "goblin.png", "scale": 1.2,
//!       "offsetX": 1.5, "frame": "metal-gold", "copies": 4 }
//!   ],
//!   "images": ["orc.jpg", "troll.webp"]
//! }
//! ```
//!
//! Image paths are relative to the project file. `cells` entries without a
//! position go into the first empty cell; `images` fill consecutive cells
//! after everything in `cells` has been placed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::Result;
use crate::ingest::load_image_file;
use crate::sheet::SheetState;
use crate::types::{clamp_image_scale, CellImage, SheetSettings};

fn one() -> u32 {
    1
}

/// One placed token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    pub image: PathBuf,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    /// Clamped to the image scale limits when the sheet is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    /// Total number of cells showing this token, including the first.
    #[serde(default = "one")]
    pub copies: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub settings: SheetSettings,
    pub cells: Vec<CellEntry>,
    pub images: Vec<PathBuf>,
}

impl Project {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Build a sheet, reading images from `base_dir`.
    pub fn build_sheet(&self, base_dir: &Path) -> Result<SheetState> {
        let mut loader = ImageLoader {
            base_dir,
            cache: HashMap::new(),
        };
        self.build_sheet_with(|path| loader.load(path))
    }

    /// Build a sheet with a caller-supplied image source. Paths are passed
    /// exactly as written in the project.
    pub fn build_sheet_with(
        &self,
        mut load: impl FnMut(&Path) -> Result<CellImage>,
    ) -> Result<SheetState> {
        let mut sheet = SheetState::new(self.settings);

        for entry in &self.cells {
            let index = match (entry.row, entry.col) {
                (Some(row), Some(col)) => sheet.cell_index(row, col),
                _ => sheet.first_empty_cell(),
            };
            let Some(index) = index else {
                log::warn!("no room on the sheet for {}", entry.image.display());
                continue;
            };

            sheet.set_image(index, load(&entry.image)?);
            sheet.set_image_offset(index, entry.offset_x, entry.offset_y);
            if let Some(scale) = entry.scale {
                sheet.set_scale(index, clamp_image_scale(scale));
            }
            if let Some(color) = entry.background {
                sheet.set_background_color(index, color);
            }
            sheet.set_frame(index, entry.frame.clone());

            let mut last = index;
            for _ in 1..entry.copies.max(1) {
                match sheet.duplicate_to_next(last) {
                    Some(next) => last = next,
                    None => {
                        log::warn!("ran out of cells copying {}", entry.image.display());
                        break;
                    }
                }
            }
        }

        let targets = sheet.load_targets(self.images.len());
        if targets.len() < self.images.len() {
            log::warn!(
                "{} of {} images did not fit on the sheet",
                self.images.len() - targets.len(),
                self.images.len()
            );
        }
        for (index, path) in targets.into_iter().zip(&self.images) {
            sheet.set_image(index, load(path)?);
        }

        Ok(sheet)
    }
}

/// Loads each distinct file once so repeated tokens share one bitmap.
struct ImageLoader<'a> {
    base_dir: &'a Path,
    cache: HashMap<PathBuf, CellImage>,
}

impl ImageLoader<'_> {
    fn load(&mut self, path: &Path) -> Result<CellImage> {
        let full = self.base_dir.join(path);
        if let Some(image) = self.cache.get(&full) {
            return Ok(image.clone());
        }
        let image = load_image_file(&full)?;
        log::debug!(
            "loaded {} ({}x{})",
            full.display(),
            image.decoded.width(),
            image.decoded.height()
        );
        self.cache.insert(full, image.clone());
        Ok(image)
    }
}

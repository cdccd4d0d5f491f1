use serde::{Deserialize, Serialize};

use super::page::{Orientation, PaperSize};

/// Smallest cell edge accepted after sanitizing, in millimeters.
pub const MIN_CELL_SIZE_MM: f64 = 1.0;
/// Smallest page edge accepted after sanitizing, in millimeters.
pub const MIN_PAGE_SIZE_MM: f64 = 10.0;

/// Image zoom limits and step used by the scale controls.
pub const IMAGE_SCALE_MIN: f64 = 0.5;
pub const IMAGE_SCALE_MAX: f64 = 3.0;
pub const IMAGE_SCALE_STEP: f64 = 0.05;

/// Clamp a user-facing image scale into `[IMAGE_SCALE_MIN, IMAGE_SCALE_MAX]`.
pub fn clamp_image_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX)
}

/// Shape of the clip region applied to every cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellShape {
    #[default]
    Circle,
    Square,
}

/// Raw inputs of the grid layout engine, in millimeters.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub cell_size_mm: f64,
    pub cut_line_offset_mm: f64,
    pub cut_lines_enabled: bool,
    pub margin_mm: f64,
}

fn positive_or(value: f64, min: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.max(min)
    } else {
        min
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl GridConfig {
    /// Clamp every field into its valid domain. Never fails.
    pub fn sanitized(self) -> Self {
        Self {
            page_width_mm: positive_or(self.page_width_mm, MIN_PAGE_SIZE_MM),
            page_height_mm: positive_or(self.page_height_mm, MIN_PAGE_SIZE_MM),
            cell_size_mm: positive_or(self.cell_size_mm, MIN_CELL_SIZE_MM),
            cut_line_offset_mm: non_negative(self.cut_line_offset_mm),
            cut_lines_enabled: self.cut_lines_enabled,
            margin_mm: non_negative(self.margin_mm),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        SheetSettings::default().grid_config()
    }
}

/// User-editable sheet settings. This is what the settings panel and the
/// project file carry; [`GridConfig`] is derived from it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetSettings {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub cell_size_mm: f64,
    pub shape: CellShape,
    pub cut_lines: bool,
    pub cut_line_offset_mm: f64,
    pub margin_mm: f64,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            cell_size_mm: 25.4,
            shape: CellShape::Circle,
            cut_lines: true,
            cut_line_offset_mm: 1.0,
            margin_mm: 5.0,
        }
    }
}

impl SheetSettings {
    pub fn page_size_mm(&self) -> (f64, f64) {
        self.paper.oriented_mm(self.orientation)
    }

    pub fn grid_config(&self) -> GridConfig {
        let (page_width_mm, page_height_mm) = self.page_size_mm();
        GridConfig {
            page_width_mm,
            page_height_mm,
            cell_size_mm: self.cell_size_mm,
            cut_line_offset_mm: self.cut_line_offset_mm,
            cut_lines_enabled: self.cut_lines,
            margin_mm: self.margin_mm,
        }
        .sanitized()
    }
}

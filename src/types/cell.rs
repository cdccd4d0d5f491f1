use std::rc::Rc;

use crate::color::Rgb;

use super::bitmap::{DecodedImage, ImageFormat};

/// The image a cell displays: the decoded bitmap for drawing plus the
/// original encoded bytes for document embedding. Both are shared handles;
/// duplicating a cell aliases them instead of copying pixel data.
#[derive(Debug, Clone)]
pub struct CellImage {
    pub decoded: Rc<DecodedImage>,
    pub bytes: Rc<[u8]>,
    pub format: ImageFormat,
}

impl CellImage {
    pub fn new(decoded: DecodedImage, bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            decoded: Rc::new(decoded),
            bytes: bytes.into(),
            format,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.decoded.aspect_ratio()
    }

    /// True when both handles point at the same allocations.
    pub fn same_source(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.decoded, &other.decoded) && Rc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl PartialEq for CellImage {
    fn eq(&self, other: &Self) -> bool {
        self.same_source(other) && self.format == other.format
    }
}

/// Per-cell content: image, its transform within the cell, background and frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub row: u32,
    pub col: u32,
    pub image: Option<CellImage>,
    /// Image offset from centered, in millimeters.
    pub offset_x_mm: f64,
    pub offset_y_mm: f64,
    pub scale: f64,
    pub background: Rgb,
    pub frame_id: Option<String>,
    /// Generation of the latest load aimed at this cell, if one is in flight.
    pub(crate) pending_load: Option<u64>,
}

impl CellState {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            image: None,
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
            scale: 1.0,
            background: Rgb::WHITE,
            frame_id: None,
            pending_load: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub(crate) fn reset_transform(&mut self) {
        self.offset_x_mm = 0.0;
        self.offset_y_mm = 0.0;
        self.scale = 1.0;
    }
}

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Encoded formats a cell keeps around for document embedding.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A decoded bitmap. Shared by `Rc` between every cell that shows it, so
/// the id doubles as a cache key for backend-side textures.
pub struct DecodedImage {
    id: u64,
    pixels: RgbaImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Width over height. Zero-sized images report 1.0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.pixels.height() == 0 || self.pixels.width() == 0 {
            return 1.0;
        }
        f64::from(self.pixels.width()) / f64::from(self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn has_transparency(&self) -> bool {
        self.pixels.pixels().any(|p| p.0[3] < 255)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

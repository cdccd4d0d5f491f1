//! Image ingestion: decode user-supplied bytes into a [`CellImage`].
//!
//! PNG and JPEG keep their original bytes for document embedding. Anything
//! else the decoder understands is transcoded to PNG first, so the exporters
//! only ever see those two formats.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};

use crate::error::{Result, SheetError};
use crate::types::{CellImage, DecodedImage, ImageFormat};

/// Formats accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
}

impl SourceFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jfif" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Identify the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::Webp),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// The stored format, if the bytes can be kept as-is.
    fn passthrough(self) -> Option<ImageFormat> {
        match self {
            Self::Png => Some(ImageFormat::Png),
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Webp | Self::Gif | Self::Bmp => None,
        }
    }
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out.into_inner())
}

/// Decode image bytes. The signature wins over the MIME tag when they
/// disagree; the tag is only a fallback for unsniffable data.
pub fn decode_image(bytes: Vec<u8>, mime: Option<&str>) -> Result<CellImage> {
    let source = SourceFormat::sniff(&bytes)
        .or_else(|| mime.and_then(SourceFormat::from_mime))
        .ok_or_else(|| {
            SheetError::UnsupportedFormat(mime.unwrap_or("unknown").to_string())
        })?;

    let decoded: DynamicImage = image::load_from_memory_with_format(&bytes, source.codec())?;
    let pixels = decoded.to_rgba8();

    let (bytes, format) = match source.passthrough() {
        Some(format) => (bytes, format),
        None => {
            log::debug!("transcoding {source:?} image to PNG");
            (encode_png(&pixels)?, ImageFormat::Png)
        }
    };

    Ok(CellImage::new(DecodedImage::new(pixels), bytes, format))
}

/// Read and decode an image file, using its extension as the MIME hint.
pub fn load_image_file(path: &Path) -> Result<CellImage> {
    let bytes = std::fs::read(path)?;
    let mime = SourceFormat::from_extension(path).map(|f| match f {
        SourceFormat::Png => "image/png",
        SourceFormat::Jpeg => "image/jpeg",
        SourceFormat::Webp => "image/webp",
        SourceFormat::Gif => "image/gif",
        SourceFormat::Bmp => "image/bmp",
    });
    decode_image(bytes, mime)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        encode_png(&img).unwrap()
    }

    #[test]
    fn png_is_kept_verbatim() {
        let bytes = png_bytes();
        let img = decode_image(bytes.clone(), Some("image/png")).unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert_eq!(&*img.bytes, bytes.as_slice());
        assert_eq!(img.decoded.width(), 3);
    }

    #[test]
    fn bmp_is_transcoded_to_png() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 0, 0]));
        let mut bmp = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut bmp, image::ImageFormat::Bmp)
            .unwrap();
        let img = decode_image(bmp.into_inner(), Some("image/bmp")).unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert_eq!(SourceFormat::sniff(&img.bytes), Some(SourceFormat::Png));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = decode_image(vec![0, 1, 2, 3], Some("text/plain")).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat(_)));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let mut bytes = png_bytes();
        bytes.truncate(20);
        let err = decode_image(bytes, None).unwrap_err();
        assert!(matches!(err, SheetError::Decode(_)));
    }

    #[test]
    fn mime_aliases() {
        assert_eq!(SourceFormat::from_mime("IMAGE/JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_mime("image/svg+xml"), None);
    }
}

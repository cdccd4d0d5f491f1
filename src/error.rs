//! Structured error types for tokensheet.

/// All errors that can occur while loading images and exporting sheets.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The image bytes could not be decoded (or transcoded to PNG).
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// The MIME tag or sniffed content is not an image format we ingest.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Print document assembly failed.
    #[error("PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Raster surface could not be created or encoded.
    #[error("Raster export: {0}")]
    Raster(String),

    /// Rendering error in an output adapter.
    #[error("Render error: {0}")]
    Render(String),

    /// An export was requested while another one is still running.
    #[error("An export is already in progress")]
    ExportBusy,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or project JSON could not be read or written.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for ad-hoc messages.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetError>;

impl From<String> for SheetError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SheetError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SheetError> for wasm_bindgen::JsValue {
    fn from(e: SheetError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

//! Canvas 2D preview backend.
//!
//! Draws the interactive sheet preview with the HTML Canvas 2D API via
//! web-sys. Only built for wasm32.

mod renderer;

pub use renderer::CanvasRenderer;

//! Data types shared by the layout engine, the cell store and the output adapters.

mod cell;
mod bitmap;
mod page;
mod settings;

pub use cell::*;
pub use bitmap::*;
pub use page::*;
pub use settings::*;

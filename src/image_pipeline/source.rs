//! Source image reading module
//!
//! This module decodes the input raster together with its color mode and
//! any embedded XMP packet.

mod reader;
mod tiff_reader;
pub mod types;

pub use reader::SourceImageReader;
pub use tiff_reader::TiffSourceReader;
pub use types::{RasterBuffer, SourceImage};

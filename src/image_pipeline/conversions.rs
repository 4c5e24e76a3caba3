//! Pipeline conversions module
//!
//! This module contains orchestration logic for the TIFF to DNG conversion.

mod tiff_to_dng;


pub use tiff_to_dng::{ConversionSummary, PreparedDng, TiffToDngPipeline};

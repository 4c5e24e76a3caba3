//! Image processing pipeline module
//!
//! This module converts decoded raster images and their embedded XMP
//! metadata into linear raw DNG files, with separate modules for source
//! reading, pixel format resolution, metadata extraction, timestamp
//! normalization, tag assembly and conversion orchestration.

pub mod common;
pub mod conversions;
pub mod dng;
pub mod metadata;
pub mod pixel_format;
pub mod source;
pub mod timestamp;

pub use common::{
    ConversionError,
    Result,
};

pub use source::{
    RasterBuffer,
    SourceImage,
    SourceImageReader,
    TiffSourceReader,
};

pub use pixel_format::{
    ColorMode,
    PixelFormat,
};

pub use metadata::{
    ExtractedField,
    XmpFields,
};

pub use dng::{
    ConversionConfig,
    ConversionConfigBuilder,
    DngIdentity,
    DngWriter,
    StandardDngWriter,
    TagAssembler,
    TagId,
    TagTable,
    TagValue,
};

pub use conversions::{
    ConversionSummary,
    TiffToDngPipeline,
};

//! DNG assembly and writing module
//!
//! This module turns decoded sources into linear raw DNG files: the tag
//! registry, the assembler that applies the tag precedence rules, and the
//! container writer.

mod assembler;
mod standard_dng_writer;
pub mod tags;
pub mod types;
mod writer;

pub use assembler::TagAssembler;
pub use standard_dng_writer::StandardDngWriter;
pub use tags::{PHOTOMETRIC_LINEAR_RAW, SUBFILE_MAIN_IMAGE, TagEntry, TagId, TagTable, TagValue};
pub use types::{ConversionConfig, ConversionConfigBuilder, DngIdentity};
pub use writer::DngWriter;

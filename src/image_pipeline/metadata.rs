//! Embedded metadata module
//!
//! Best-effort extraction of provenance fields from an XMP packet.

mod error;
mod fields;
mod xmp;

pub use error::MetadataError;
pub use fields::{CRS_NAMESPACE, ExtractedField, XMP_NAMESPACE, XmpFields, file_name_component};
pub use xmp::{XMP_START_MARKER, extract, locate_xmp_start, parse_xmp};

use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::dng::tags::TagTable;
use crate::image_pipeline::source::types::RasterBuffer;

pub trait DngWriter {
    fn write_dng(&self, tags: &TagTable, raster: &RasterBuffer, output: &mut dyn Write) -> Result<()>;
}

use std::io::{Cursor, Seek, Write};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKindStandard};
use tiff::tags::{PhotometricInterpretation, SampleFormat, Tag};
use tracing::debug;
use crate::image_pipeline::common::error::{Result, ConversionError};
use crate::image_pipeline::dng::tags::{TagEntry, TagTable, TagValue};
use crate::image_pipeline::dng::writer::DngWriter;
use crate::image_pipeline::source::types::RasterBuffer;

/// Uncompressed 16-bit DNG writer built on the tiff crate encoder.
///
/// The encoder lays out the structural tags for the sample layout; every
/// entry of the tag table is then written over them, so the table decides
/// the final value of any tag both sides set.
pub struct StandardDngWriter;

/// Gray plus one extra sample, 16 bits each. The tiff crate ships no
/// two-sample color type.
struct GrayA16;

impl ColorType for GrayA16 {
    type Inner = u16;
    const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::BlackIsZero;
    const BITS_PER_SAMPLE: &'static [u16] = &[16, 16];
    const SAMPLE_FORMAT: &'static [SampleFormat] = &[SampleFormat::Uint, SampleFormat::Uint];

    fn horizontal_predict(row: &[u16], result: &mut Vec<u16>) {
        let samples = Self::SAMPLE_FORMAT.len();
        if row.len() < samples {
            return;
        }
        result.extend_from_slice(&row[..samples]);
        result.extend(
            row.iter()
                .zip(&row[samples..])
                .map(|(prev, current)| current.wrapping_sub(*prev)),
        );
    }
}

impl DngWriter for StandardDngWriter {
    fn write_dng(&self, tags: &TagTable, raster: &RasterBuffer, output: &mut dyn Write) -> Result<()> {
        debug!(
            "Encoding DNG image: {}x{} with {} channel(s), {} tags",
            raster.width,
            raster.height,
            raster.channels,
            tags.len()
        );

        let mut buffer = Vec::new();

        match raster.channels {
            1 => encode_image::<colortype::Gray16>(&mut buffer, tags, raster)?,
            2 => encode_image::<GrayA16>(&mut buffer, tags, raster)?,
            3 => encode_image::<colortype::RGB16>(&mut buffer, tags, raster)?,
            4 => encode_image::<colortype::RGBA16>(&mut buffer, tags, raster)?,
            n => {
                return Err(ConversionError::UnsupportedFormat(format!(
                    "{} samples per pixel",
                    n
                )));
            }
        }

        output
            .write_all(&buffer)
            .and_then(|_| output.flush())
            .map_err(|e| ConversionError::OutputWriteError(e.to_string()))?;

        debug!("DNG encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

fn encode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::EncodeError(e.to_string())
}

fn encode_image<C>(buffer: &mut Vec<u8>, tags: &TagTable, raster: &RasterBuffer) -> Result<()>
where
    C: ColorType<Inner = u16>,
{
    let mut encoder = TiffEncoder::new(Cursor::new(buffer)).map_err(encode_error)?;
    let mut image = encoder
        .new_image::<C>(raster.width, raster.height)
        .map_err(encode_error)?;

    for entry in tags.iter() {
        write_entry(image.encoder(), entry)?;
    }

    image.write_data(&raster.data).map_err(encode_error)?;
    Ok(())
}

fn write_entry<W: Write + Seek>(
    directory: &mut DirectoryEncoder<'_, W, TiffKindStandard>,
    entry: &TagEntry,
) -> Result<()> {
    let tag = Tag::from_u16_exhaustive(entry.id.code());
    let written = match &entry.value {
        TagValue::Short(v) => directory.write_tag(tag, *v),
        TagValue::Long(v) => directory.write_tag(tag, *v),
        TagValue::Shorts(v) => directory.write_tag(tag, v.as_slice()),
        TagValue::Bytes(v) => directory.write_tag(tag, v.as_slice()),
        TagValue::Ascii(s) => directory.write_tag(tag, s.as_str()),
    };
    written.map_err(|e| ConversionError::EncodeError(format!("{}: {}", entry.id, e)))
}

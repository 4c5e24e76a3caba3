//! Source reader implementation using the tiff crate decoder.
//!
//! Decodes the first image of a TIFF file, maps its color type onto a
//! [`ColorMode`], widens every sample to u16 and picks up the XMP packet
//! stored in tag 700 when there is one.

use std::io::{Cursor, Read, Seek};

use tiff::ColorType;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pixel_format::ColorMode;
use crate::image_pipeline::source::reader::SourceImageReader;
use crate::image_pipeline::source::types::{RasterBuffer, SourceImage};

/// TIFF tag holding the embedded XMP packet.
const XMP_TAG: u16 = 700;

/// Source reader for TIFF input files.
pub struct TiffSourceReader;

impl SourceImageReader for TiffSourceReader {
    fn read_source(&self, data: &[u8]) -> Result<SourceImage> {
        debug!("Decoding TIFF source, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(decode_error)?;

        let (width, height) = decoder.dimensions().map_err(decode_error)?;
        let color_type = decoder.colortype().map_err(decode_error)?;
        debug!("Source image: {}x{} {:?}", width, height, color_type);

        let xmp = read_xmp_packet(&mut decoder);

        let decoded = decoder.read_image().map_err(decode_error)?;
        let is_float = matches!(decoded, DecodingResult::F32(_) | DecodingResult::F64(_));
        let color_mode = color_mode_for(color_type, is_float);

        let mut samples = widen_samples(decoded)?;
        if matches!(color_type, ColorType::Gray(1)) {
            samples = unpack_bilevel(&samples, width, height);
        }

        let channels = channel_count(color_type)
            .unwrap_or_else(|| infer_channel_count(samples.len(), width, height));

        debug!(
            "Resolved color mode {} with {} channel(s), xmp present: {}",
            color_mode,
            channels,
            xmp.is_some()
        );

        let raster = RasterBuffer::new(width, height, channels, samples)?;

        Ok(SourceImage {
            raster,
            color_mode,
            xmp,
        })
    }
}

fn decode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

/// Metadata is best-effort: a missing or oddly typed XMP tag yields `None`.
fn read_xmp_packet<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<Vec<u8>> {
    match decoder.find_tag(Tag::from_u16_exhaustive(XMP_TAG)) {
        Ok(Some(Value::Ascii(text))) => Some(text.into_bytes()),
        Ok(Some(value)) => match value.into_u8_vec() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("Ignoring unreadable XMP tag: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            debug!("Ignoring unreadable XMP tag: {}", e);
            None
        }
    }
}

fn color_mode_for(color_type: ColorType, is_float: bool) -> ColorMode {
    match color_type {
        ColorType::Gray(1) => ColorMode::Binary,
        ColorType::Gray(8) => ColorMode::Gray8,
        ColorType::Gray(16) => ColorMode::Int16,
        ColorType::Gray(32) if is_float => ColorMode::Float32,
        ColorType::Gray(32) => ColorMode::Int32,
        ColorType::Palette(8) => ColorMode::Palette,
        ColorType::RGB(8) => ColorMode::Rgb8,
        ColorType::RGB(16) => ColorMode::Rgb16,
        ColorType::RGBA(8) => ColorMode::Rgba8,
        ColorType::RGBA(16) => ColorMode::Rgba16,
        ColorType::CMYK(8) => ColorMode::Cmyk8,
        ColorType::YCbCr(8) => ColorMode::YCbCr8,
        other => ColorMode::Unrecognized(format!("{:?}", other)),
    }
}

fn channel_count(color_type: ColorType) -> Option<u16> {
    match color_type {
        ColorType::Gray(_) | ColorType::Palette(_) => Some(1),
        ColorType::GrayA(_) => Some(2),
        ColorType::RGB(_) | ColorType::YCbCr(_) => Some(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Some(4),
        ColorType::Multiband { num_samples, .. } => Some(num_samples),
        _ => None,
    }
}

fn infer_channel_count(sample_count: usize, width: u32, height: u32) -> u16 {
    let pixels = width as usize * height as usize;
    if pixels == 0 {
        return 1;
    }
    u16::try_from(sample_count / pixels).unwrap_or(1).max(1)
}

/// Casts decoded samples to u16. Wider integers wrap and floats saturate.
fn widen_samples(decoded: DecodingResult) -> Result<Vec<u16>> {
    let samples = match decoded {
        DecodingResult::U8(values) => values.into_iter().map(u16::from).collect(),
        DecodingResult::U16(values) => values,
        DecodingResult::U32(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::I8(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::I16(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::I32(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::F32(values) => values.into_iter().map(|v| v as u16).collect(),
        DecodingResult::F64(values) => values.into_iter().map(|v| v as u16).collect(),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(ConversionError::UnsupportedFormat(
                "sample type cannot be widened to u16".to_string(),
            ));
        }
    };
    Ok(samples)
}

/// Expands MSB-first packed 1-bit rows into one 0/1 sample per pixel.
///
/// Buffers that are not row-packed are returned unchanged.
fn unpack_bilevel(packed: &[u16], width: u32, height: u32) -> Vec<u16> {
    let width = width as usize;
    let height = height as usize;
    let row_bytes = width.div_ceil(8);
    let is_packed = packed.len() == row_bytes * height
        && (packed.len() != width * height || packed.iter().any(|&v| v > 1));
    if !is_packed {
        return packed.to_vec();
    }

    let mut unpacked = Vec::with_capacity(width * height);
    for row in packed.chunks(row_bytes) {
        for x in 0..width {
            let byte = row[x / 8];
            unpacked.push((byte >> (7 - (x % 8))) & 1);
        }
    }
    unpacked
}

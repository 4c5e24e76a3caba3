//! Decoded source image types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pixel_format::ColorMode;

/// Pixel samples widened to the u16 working precision.
///
/// Samples are stored row-major and channel-interleaved. Sources deeper than
/// 16 bits are cast down, which is lossy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// Number of interleaved samples per pixel
    pub channels: u16,
    /// Interleaved sample data
    pub data: Vec<u16>,
}

impl RasterBuffer {
    /// Bit depth of every sample held in the buffer.
    pub const BITS_PER_SAMPLE: u16 = 16;

    pub fn new(width: u32, height: u32, channels: u16, data: Vec<u16>) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(ConversionError::RasterSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.data.len()
    }
}

/// Everything the decoder hands over to the tag assembly stage.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub raster: RasterBuffer,
    pub color_mode: ColorMode,
    /// Raw embedded XMP packet, when the source carries one
    pub xmp: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_accepts_matching_length() {
        let raster = RasterBuffer::new(4, 2, 3, vec![0u16; 24]).unwrap();
        assert_eq!(raster.sample_count(), 24);
    }

    #[test]
    fn test_raster_rejects_short_data() {
        let err = RasterBuffer::new(4, 2, 3, vec![0u16; 8]).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::RasterSizeMismatch { expected: 24, actual: 8 }
        ));
    }
}

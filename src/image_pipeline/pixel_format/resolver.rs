use crate::image_pipeline::pixel_format::color_mode::ColorMode;

/// Depth used when a mode is not in the registry.
pub const FALLBACK_BITS_PER_SAMPLE: u16 = 16;

/// Sample layout inferred from the source color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
}

impl PixelFormat {
    /// One depth entry per channel, all equal.
    pub fn per_channel_bits(&self) -> Vec<u16> {
        vec![self.bits_per_sample; self.samples_per_pixel as usize]
    }

    /// Single-channel images may leave SamplesPerPixel implicit.
    pub fn is_single_channel(&self) -> bool {
        self.samples_per_pixel == 1
    }
}

pub fn bits_for_mode(mode: &ColorMode) -> u16 {
    match mode {
        ColorMode::Binary => 1,
        ColorMode::Gray8
        | ColorMode::Palette
        | ColorMode::Rgb8
        | ColorMode::Rgba8
        | ColorMode::Cmyk8
        | ColorMode::YCbCr8 => 8,
        ColorMode::Int32 | ColorMode::Float32 => 32,
        ColorMode::Int16
        | ColorMode::Int16Big
        | ColorMode::Int16Little
        | ColorMode::Int16Native
        | ColorMode::Rgb16
        | ColorMode::Rgba16 => 16,
        ColorMode::Unrecognized(_) => FALLBACK_BITS_PER_SAMPLE,
    }
}

/// Maps a color mode and the decoder's channel count to a [`PixelFormat`].
///
/// Never fails: unrecognized modes fall back to 16 bits.
pub fn resolve(mode: &ColorMode, channels: u16) -> PixelFormat {
    PixelFormat {
        bits_per_sample: bits_for_mode(mode),
        samples_per_pixel: channels,
    }
}

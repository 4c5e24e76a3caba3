//! Pixel format resolution module
//!
//! Infers bits-per-sample and samples-per-pixel from the source color mode.

mod color_mode;
mod resolver;

pub use color_mode::ColorMode;
pub use resolver::{FALLBACK_BITS_PER_SAMPLE, PixelFormat, bits_for_mode, resolve};

//! Source color-mode identifiers

use std::fmt;

/// Color mode of the decoded source, named by its short mode string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// `1`
    Binary,
    /// `L`
    Gray8,
    /// `P`
    Palette,
    /// `RGB`
    Rgb8,
    /// `RGBA`
    Rgba8,
    /// `CMYK`
    Cmyk8,
    /// `YCbCr`
    YCbCr8,
    /// `I`
    Int32,
    /// `F`
    Float32,
    /// `I;16`
    Int16,
    /// `I;16B`
    Int16Big,
    /// `I;16L`
    Int16Little,
    /// `I;16N`
    Int16Native,
    /// `RGB;16`
    Rgb16,
    /// `RGBA;16`
    Rgba16,
    /// Any mode name outside the registry
    Unrecognized(String),
}

impl ColorMode {
    /// Every registered mode, in registry order.
    pub fn known() -> [ColorMode; 15] {
        [
            ColorMode::Binary,
            ColorMode::Gray8,
            ColorMode::Palette,
            ColorMode::Rgb8,
            ColorMode::Rgba8,
            ColorMode::Cmyk8,
            ColorMode::YCbCr8,
            ColorMode::Int32,
            ColorMode::Float32,
            ColorMode::Int16,
            ColorMode::Int16Big,
            ColorMode::Int16Little,
            ColorMode::Int16Native,
            ColorMode::Rgb16,
            ColorMode::Rgba16,
        ]
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "1" => ColorMode::Binary,
            "L" => ColorMode::Gray8,
            "P" => ColorMode::Palette,
            "RGB" => ColorMode::Rgb8,
            "RGBA" => ColorMode::Rgba8,
            "CMYK" => ColorMode::Cmyk8,
            "YCbCr" => ColorMode::YCbCr8,
            "I" => ColorMode::Int32,
            "F" => ColorMode::Float32,
            "I;16" => ColorMode::Int16,
            "I;16B" => ColorMode::Int16Big,
            "I;16L" => ColorMode::Int16Little,
            "I;16N" => ColorMode::Int16Native,
            "RGB;16" => ColorMode::Rgb16,
            "RGBA;16" => ColorMode::Rgba16,
            other => ColorMode::Unrecognized(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ColorMode::Binary => "1",
            ColorMode::Gray8 => "L",
            ColorMode::Palette => "P",
            ColorMode::Rgb8 => "RGB",
            ColorMode::Rgba8 => "RGBA",
            ColorMode::Cmyk8 => "CMYK",
            ColorMode::YCbCr8 => "YCbCr",
            ColorMode::Int32 => "I",
            ColorMode::Float32 => "F",
            ColorMode::Int16 => "I;16",
            ColorMode::Int16Big => "I;16B",
            ColorMode::Int16Little => "I;16L",
            ColorMode::Int16Native => "I;16N",
            ColorMode::Rgb16 => "RGB;16",
            ColorMode::Rgba16 => "RGBA;16",
            ColorMode::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

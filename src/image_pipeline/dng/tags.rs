//! DNG tag registry and the ordered tag table

use std::fmt;

/// `PhotometricInterpretation` value for linear raw data.
pub const PHOTOMETRIC_LINEAR_RAW: u16 = 34892;

/// `NewSubfileType` value for the full-resolution main image.
pub const SUBFILE_MAIN_IMAGE: u32 = 0;

/// Tags the assembler may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagId {
    NewSubfileType,
    ImageWidth,
    ImageLength,
    BitsPerSample,
    PhotometricInterpretation,
    SamplesPerPixel,
    Software,
    DateTime,
    DateTimeOriginal,
    DngVersion,
    DngBackwardVersion,
    UniqueCameraModel,
    OriginalRawFileName,
    ProfileName,
}

impl TagId {
    /// Numeric TIFF/EXIF/DNG tag code.
    pub const fn code(self) -> u16 {
        match self {
            TagId::NewSubfileType => 254,
            TagId::ImageWidth => 256,
            TagId::ImageLength => 257,
            TagId::BitsPerSample => 258,
            TagId::PhotometricInterpretation => 262,
            TagId::SamplesPerPixel => 277,
            TagId::Software => 305,
            TagId::DateTime => 306,
            TagId::DateTimeOriginal => 36867,
            TagId::DngVersion => 50706,
            TagId::DngBackwardVersion => 50707,
            TagId::UniqueCameraModel => 50708,
            TagId::OriginalRawFileName => 50827,
            TagId::ProfileName => 50936,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TagId::NewSubfileType => "NewSubfileType",
            TagId::ImageWidth => "ImageWidth",
            TagId::ImageLength => "ImageLength",
            TagId::BitsPerSample => "BitsPerSample",
            TagId::PhotometricInterpretation => "PhotometricInterpretation",
            TagId::SamplesPerPixel => "SamplesPerPixel",
            TagId::Software => "Software",
            TagId::DateTime => "DateTime",
            TagId::DateTimeOriginal => "DateTimeOriginal",
            TagId::DngVersion => "DNGVersion",
            TagId::DngBackwardVersion => "DNGBackwardVersion",
            TagId::UniqueCameraModel => "UniqueCameraModel",
            TagId::OriginalRawFileName => "OriginalRawFileName",
            TagId::ProfileName => "ProfileName",
        }
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Typed tag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Short(u16),
    Long(u32),
    Shorts(Vec<u16>),
    Bytes(Vec<u8>),
    Ascii(String),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub id: TagId,
    pub value: TagValue,
}

/// Ordered tag set with unique ids.
///
/// Setting an id that is already present replaces its value in place, so
/// the order of first insertion is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    entries: Vec<TagEntry>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: TagId, value: TagValue) {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.value = value,
            None => self.entries.push(TagEntry { id, value }),
        }
    }

    pub fn get(&self, id: TagId) -> Option<&TagValue> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.value)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<TagId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

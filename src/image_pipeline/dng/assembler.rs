//! Tag assembly
//!
//! Builds the ordered DNG tag table from the raster, the resolved pixel
//! format and the extracted XMP fields. The order of the steps is part of
//! the contract: CreateDate feeds DateTimeOriginal, ModifyDate overrides the
//! DateTime placeholder, and only then does the clock fallback apply.

use chrono::{Local, NaiveDateTime};
use tracing::{debug, instrument};

use crate::image_pipeline::dng::tags::{
    PHOTOMETRIC_LINEAR_RAW, SUBFILE_MAIN_IMAGE, TagId, TagTable, TagValue,
};
use crate::image_pipeline::dng::types::DngIdentity;
use crate::image_pipeline::metadata::{ExtractedField, XmpFields, file_name_component};
use crate::image_pipeline::pixel_format::PixelFormat;
use crate::image_pipeline::source::RasterBuffer;
use crate::image_pipeline::timestamp;

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct TagAssembler {
    identity: DngIdentity,
    clock: Clock,
}

impl TagAssembler {
    /// Assembler using the local wall clock for the DateTime fallback.
    pub fn new(identity: DngIdentity) -> Self {
        Self::with_clock(identity, || Local::now().naive_local())
    }

    pub fn with_clock<F>(identity: DngIdentity, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        Self {
            identity,
            clock: Box::new(clock),
        }
    }

    pub fn identity(&self) -> &DngIdentity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: DngIdentity) {
        self.identity = identity;
    }

    /// Produces the final tag table. Never fails; unusable metadata leaves
    /// its tag unset.
    #[instrument(skip_all, fields(width = raster.width, height = raster.height))]
    pub fn assemble(
        &self,
        raster: &RasterBuffer,
        format: &PixelFormat,
        fields: &XmpFields,
    ) -> TagTable {
        let mut table = TagTable::new();

        // The raster handed to the writer is always u16.
        let bits = vec![RasterBuffer::BITS_PER_SAMPLE; format.samples_per_pixel as usize];
        table.set(TagId::ImageWidth, TagValue::Long(raster.width));
        table.set(TagId::ImageLength, TagValue::Long(raster.height));
        table.set(TagId::BitsPerSample, TagValue::Shorts(bits));

        if !format.is_single_channel() {
            table.set(TagId::SamplesPerPixel, TagValue::Short(format.samples_per_pixel));
        }

        table.set(TagId::NewSubfileType, TagValue::Long(SUBFILE_MAIN_IMAGE));
        table.set(
            TagId::PhotometricInterpretation,
            TagValue::Short(PHOTOMETRIC_LINEAR_RAW),
        );
        table.set(TagId::Software, TagValue::Ascii(self.identity.software.clone()));
        table.set(TagId::DateTime, TagValue::Ascii(String::new()));

        if let Some(created) = normalized_date(fields, ExtractedField::CreateDate) {
            table.set(TagId::DateTimeOriginal, TagValue::Ascii(created));
        }

        if let Some(modified) = normalized_date(fields, ExtractedField::ModifyDate) {
            table.set(TagId::DateTime, TagValue::Ascii(modified));
        }

        let date_time_missing = table
            .get(TagId::DateTime)
            .and_then(TagValue::as_str)
            .is_none_or(str::is_empty);
        if date_time_missing {
            let now = timestamp::format_canonical(&(self.clock)());
            debug!("No usable ModifyDate, stamping DateTime with {}", now);
            table.set(TagId::DateTime, TagValue::Ascii(now));
        }

        if let Some(raw_name) = fields.get(ExtractedField::RawFileName) {
            table.set(
                TagId::OriginalRawFileName,
                TagValue::Ascii(file_name_component(raw_name).to_string()),
            );
        }

        if let Some(profile) = fields.get(ExtractedField::CameraProfileName) {
            table.set(TagId::ProfileName, TagValue::Ascii(profile.to_string()));
        }

        table.set(
            TagId::DngVersion,
            TagValue::Bytes(self.identity.dng_version.to_vec()),
        );
        table.set(
            TagId::DngBackwardVersion,
            TagValue::Bytes(self.identity.dng_backward_version.to_vec()),
        );
        table.set(
            TagId::UniqueCameraModel,
            TagValue::Ascii(self.identity.unique_camera_model.clone()),
        );

        debug!(
            "Assembled {} tags (source depth {} bits)",
            table.len(),
            format.bits_per_sample
        );
        table
    }
}

fn normalized_date(fields: &XmpFields, field: ExtractedField) -> Option<String> {
    let raw = fields.get(field)?;
    match timestamp::normalize(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Skipping {:?} {:?}: {}", field, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::pixel_format::{self, ColorMode};
    use chrono::NaiveDate;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 6))
            .unwrap()
    }

    fn assembler() -> TagAssembler {
        TagAssembler::with_clock(DngIdentity::default(), fixed_clock)
    }

    fn raster(width: u32, height: u32, channels: u16) -> RasterBuffer {
        let len = width as usize * height as usize * channels as usize;
        RasterBuffer::new(width, height, channels, vec![0u16; len]).unwrap()
    }

    fn fields(pairs: &[(ExtractedField, &str)]) -> XmpFields {
        let mut fields = XmpFields::new();
        for (field, value) in pairs {
            fields.insert_first(*field, value);
        }
        fields
    }

    fn ascii(table: &TagTable, id: TagId) -> Option<&str> {
        table.get(id).and_then(TagValue::as_str)
    }

    #[test]
    fn test_rgb8_without_metadata() {
        let raster = raster(100, 50, 3);
        let format = pixel_format::resolve(&ColorMode::Rgb8, 3);
        let table = assembler().assemble(&raster, &format, &XmpFields::new());

        assert_eq!(table.get(TagId::ImageWidth), Some(&TagValue::Long(100)));
        assert_eq!(table.get(TagId::ImageLength), Some(&TagValue::Long(50)));
        assert_eq!(
            table.get(TagId::BitsPerSample),
            Some(&TagValue::Shorts(vec![16, 16, 16]))
        );
        assert_eq!(table.get(TagId::SamplesPerPixel), Some(&TagValue::Short(3)));
        assert_eq!(
            table.get(TagId::PhotometricInterpretation),
            Some(&TagValue::Short(PHOTOMETRIC_LINEAR_RAW))
        );
        assert_eq!(table.get(TagId::NewSubfileType), Some(&TagValue::Long(0)));
        assert_eq!(ascii(&table, TagId::DateTime), Some("2024:03:09 14:05:06"));
        assert_eq!(table.get(TagId::DngVersion), Some(&TagValue::Bytes(vec![1, 4, 0, 0])));
        assert_eq!(
            table.get(TagId::DngBackwardVersion),
            Some(&TagValue::Bytes(vec![1, 0, 0, 0]))
        );
        assert!(!table.contains(TagId::DateTimeOriginal));
        assert!(!table.contains(TagId::OriginalRawFileName));
        assert!(!table.contains(TagId::ProfileName));
    }

    #[test]
    fn test_dates_from_metadata() {
        let raster = raster(100, 50, 3);
        let format = pixel_format::resolve(&ColorMode::Rgb8, 3);
        let fields = fields(&[
            (ExtractedField::CreateDate, "2022-01-01T00:00:00"),
            (ExtractedField::ModifyDate, "2022-01-02T00:00:00"),
        ]);
        let table = assembler().assemble(&raster, &format, &fields);

        assert_eq!(ascii(&table, TagId::DateTimeOriginal), Some("2022:01:01 00:00:00"));
        assert_eq!(ascii(&table, TagId::DateTime), Some("2022:01:02 00:00:00"));
    }

    #[test]
    fn test_unparseable_modify_date_falls_back_to_clock() {
        let raster = raster(4, 4, 1);
        let format = pixel_format::resolve(&ColorMode::Gray8, 1);
        let fields = fields(&[
            (ExtractedField::CreateDate, "yesterday"),
            (ExtractedField::ModifyDate, "not-a-date"),
        ]);
        let table = assembler().assemble(&raster, &format, &fields);

        assert_eq!(ascii(&table, TagId::DateTime), Some("2024:03:09 14:05:06"));
        assert!(!table.contains(TagId::DateTimeOriginal));
    }

    #[test]
    fn test_real_clock_gives_non_empty_date_time() {
        let raster = raster(2, 2, 1);
        let format = pixel_format::resolve(&ColorMode::Gray8, 1);
        let table = TagAssembler::new(DngIdentity::default())
            .assemble(&raster, &format, &XmpFields::new());

        let date_time = ascii(&table, TagId::DateTime).unwrap();
        assert_eq!(date_time.len(), "YYYY:MM:DD HH:MM:SS".len());
        assert!(timestamp::normalize(date_time).is_ok());
    }

    #[test]
    fn test_single_channel_omits_samples_per_pixel() {
        let raster = raster(8, 2, 1);
        let format = pixel_format::resolve(&ColorMode::Int16, 1);
        let table = assembler().assemble(&raster, &format, &XmpFields::new());

        assert!(!table.contains(TagId::SamplesPerPixel));
        assert_eq!(table.get(TagId::BitsPerSample), Some(&TagValue::Shorts(vec![16])));
    }

    #[test]
    fn test_provenance_fields() {
        let raster = raster(2, 2, 3);
        let format = pixel_format::resolve(&ColorMode::Rgb16, 3);
        let fields = fields(&[
            (ExtractedField::RawFileName, "/card/DCIM/DSC_0042.NEF"),
            (ExtractedField::CameraProfileName, "Adobe Standard"),
        ]);
        let table = assembler().assemble(&raster, &format, &fields);

        assert_eq!(ascii(&table, TagId::OriginalRawFileName), Some("DSC_0042.NEF"));
        assert_eq!(ascii(&table, TagId::ProfileName), Some("Adobe Standard"));
    }

    #[test]
    fn test_identity_strings_and_order() {
        let identity = DngIdentity {
            software: "darkroom".to_string(),
            unique_camera_model: "Scanner X".to_string(),
            ..DngIdentity::default()
        };
        let raster = raster(2, 2, 3);
        let format = pixel_format::resolve(&ColorMode::Rgb8, 3);
        let fields = fields(&[(ExtractedField::CreateDate, "2022-01-01T00:00:00")]);
        let table = TagAssembler::with_clock(identity, fixed_clock)
            .assemble(&raster, &format, &fields);

        assert_eq!(ascii(&table, TagId::Software), Some("darkroom"));
        assert_eq!(ascii(&table, TagId::UniqueCameraModel), Some("Scanner X"));
        assert_eq!(
            table.ids(),
            vec![
                TagId::ImageWidth,
                TagId::ImageLength,
                TagId::BitsPerSample,
                TagId::SamplesPerPixel,
                TagId::NewSubfileType,
                TagId::PhotometricInterpretation,
                TagId::Software,
                TagId::DateTime,
                TagId::DateTimeOriginal,
                TagId::DngVersion,
                TagId::DngBackwardVersion,
                TagId::UniqueCameraModel,
            ]
        );
    }
}

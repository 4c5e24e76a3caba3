use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    dng::{ConversionConfig, DngWriter, StandardDngWriter, TagAssembler, TagTable},
    metadata,
    pixel_format::{self, ColorMode},
    source::{RasterBuffer, SourceImageReader, TiffSourceReader},
};

/// What a finished conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    /// Depth of the source samples before widening to u16
    pub source_bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub xmp_fields: usize,
    pub tag_count: usize,
}

/// Decoded raster and its assembled tags, ready for the writer.
#[derive(Debug, Clone)]
pub struct PreparedDng {
    pub tags: TagTable,
    pub raster: RasterBuffer,
    pub summary: ConversionSummary,
}

pub struct TiffToDngPipeline<R: SourceImageReader, W: DngWriter> {
    reader: R,
    writer: W,
    assembler: TagAssembler,
    config: ConversionConfig,
}

impl TiffToDngPipeline<TiffSourceReader, StandardDngWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(TiffSourceReader, StandardDngWriter, config)
    }
}

impl<R: SourceImageReader, W: DngWriter> TiffToDngPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            assembler: TagAssembler::new(config.identity.clone()),
            config,
        }
    }

    /// Replaces the tag assembler, e.g. to pin the DateTime fallback clock.
    pub fn with_assembler(mut self, assembler: TagAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes the source and assembles its tag table without writing anything.
    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn prepare(&self, input_data: &[u8]) -> Result<PreparedDng> {
        let source = {
            let _span = tracing::info_span!("decode_source").entered();
            self.reader.read_source(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = source.raster.width,
                height = source.raster.height
            ).entered();
            self.validate_dimensions(source.raster.width, source.raster.height)?;
        }

        let format = {
            let _span = tracing::info_span!("resolve_pixel_format",
                mode = %source.color_mode
            ).entered();
            pixel_format::resolve(&source.color_mode, source.raster.channels)
        };

        let fields = {
            let _span = tracing::info_span!("extract_metadata").entered();
            metadata::extract(source.xmp.as_deref())
        };

        let tags = {
            let _span = tracing::info_span!("assemble_tags").entered();
            self.assembler.assemble(&source.raster, &format, &fields)
        };

        let summary = ConversionSummary {
            width: source.raster.width,
            height: source.raster.height,
            color_mode: source.color_mode,
            source_bits_per_sample: format.bits_per_sample,
            samples_per_pixel: format.samples_per_pixel,
            xmp_fields: fields.len(),
            tag_count: tags.len(),
        };

        Ok(PreparedDng {
            tags,
            raster: source.raster,
            summary,
        })
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<ConversionSummary> {
        info!("Starting TIFF to DNG conversion");

        let prepared = self.prepare(input_data)?;
        self.write_prepared(&prepared, output)?;

        Ok(prepared.summary)
    }

    fn write_prepared(&self, prepared: &PreparedDng, output: &mut dyn Write) -> Result<()> {
        {
            let _span = tracing::info_span!("encode_dng").entered();
            self.writer.write_dng(&prepared.tags, &prepared.raster, output)?;
        }

        info!(
            width = prepared.summary.width,
            height = prepared.summary.height,
            mode = %prepared.summary.color_mode,
            source_bits = prepared.summary.source_bits_per_sample,
            tags = prepared.summary.tag_count,
            "Conversion complete"
        );
        Ok(())
    }

    /// Converts `input_path` into `output_path`. The output file is only
    /// created once the source decoded successfully.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ConversionSummary> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let prepared = self.prepare(&input_data)?;

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        self.write_prepared(&prepared, &mut output_file)?;

        Ok(prepared.summary)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.assembler.set_identity(config.identity.clone());
        self.config = config;
    }
}

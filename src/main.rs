use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tiff_to_dng_rs::image_pipeline::{ConversionConfig, TiffToDngPipeline};
use tiff_to_dng_rs::logger;

use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tiff_to_dng", version, about = "Convert a TIFF file to a linear raw DNG file")]
struct Cli {
    /// Path to the input TIFF file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Path to the output DNG file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Verbose output (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,

    /// Override the Software tag
    #[arg(long)]
    software: Option<String>,

    /// Override the UniqueCameraModel tag
    #[arg(long = "camera-model")]
    camera_model: Option<String>,

    /// Reject images wider or taller than this
    #[arg(long = "max-dimension", value_name = "PIXELS")]
    max_dimension: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { "info" });

    info!("Starting tiff_to_dng...");

    let mut builder = ConversionConfig::builder();
    if let Some(software) = cli.software {
        builder = builder.software(software);
    }
    if let Some(model) = cli.camera_model {
        builder = builder.unique_camera_model(model);
    }
    if let Some(max) = cli.max_dimension {
        builder = builder.max_dimension(Some(max));
    }

    let pipeline = TiffToDngPipeline::new(builder.build());
    info!("Software: {}", pipeline.config().identity.software);

    let summary = pipeline
        .convert_file(&cli.input, &cli.output)
        .with_context(|| {
            format!(
                "converting {} to {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    info!(
        "Wrote {} ({}x{}, {} {}-bit source, {} tags)",
        cli.output.display(),
        summary.width,
        summary.height,
        summary.color_mode,
        summary.source_bits_per_sample,
        summary.tag_count
    );

    Ok(())
}

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::InvalidScale;
use crate::image_processing::frame::ScalePercent;
use crate::image_processing::{ProcessorConfig, DEFAULT_FONT};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gallery-framer",
    version,
    about = "Resize photos for a web gallery, add a white frame and stamp a copyright caption",
    long_about = "
Gallery Framer - Image Processor

Every .jpg file directly inside the input directory is scaled down, wrapped in a
20 pixel white frame with a thin black edge, stamped with a copyright caption in
the bottom-right corner and written as JPEG to the output directory under the
same file name. Existing files in the output directory are overwritten.

Example Usage:
  # Half-size copies with a caption
  gallery-framer -i ~/Photos/trip -o ~/Sites/gallery/trip -s 50 -c \"(c) 2026 Jane Doe\"

  # Use a specific font file and higher JPEG quality
  gallery-framer -i ~/Photos -o ~/out -c \"(c) Jane\" --font /usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf --quality 90

  # Take settings from a JSON config file, overriding the scale on the command line
  gallery-framer --config gallery.json -s 25

  # Machine-readable progress for other front ends
  gallery-framer -i ~/Photos -o ~/out --json-progress

  # Show what would be written without touching any file
  gallery-framer -i ~/Photos -o ~/out --dry-run"
)]
pub struct Args {
    /// Directory containing the source .jpg images
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Output directory for the framed images (created if missing)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Percentage applied to the longer side of each image (0-100)
    #[arg(
        short = 's',
        long = "scale",
        default_value = "50",
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub scale: u32,

    /// Copyright caption stamped in the bottom-right corner (empty = no caption)
    #[arg(short = 'c', long = "copyright", default_value = "", value_name = "TEXT")]
    pub copyright: String,

    /// Caption font. Supports three formats:
    /// - Font name: "Arial Bold" (matched against installed font files)
    /// - Font filename: "arialbd.ttf" (searched in font directories)
    /// - Full path: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf" (loads directly)
    #[arg(long = "font", default_value = DEFAULT_FONT, value_name = "FONT")]
    pub font: String,

    /// JPEG quality of the written images (1-100)
    #[arg(
        long = "quality",
        default_value = "75",
        value_name = "QUALITY",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Emit progress as JSON lines on stdout instead of the progress bar
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Print a table with the outcome of every file at the end
    #[arg(long = "report")]
    pub report: bool,

    /// Perform a dry run: list what would be written without creating files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    pub fn scale_percent(&self) -> Result<ScalePercent, InvalidScale> {
        ScalePercent::new(self.scale)
    }

    pub fn input_dir(&self) -> Result<&Path> {
        self.input_dir
            .as_deref()
            .ok_or_else(|| anyhow!("No input directory given (use -i/--input or inputPath in the config file)"))
    }

    pub fn output_dir(&self) -> Result<&Path> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| anyhow!("No output directory given (use -o/--output or outputPath in the config file)"))
    }

    /// Processor settings derived from the arguments
    pub fn processor_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::new(self.output_dir()?, self.copyright.clone());
        config.font_name = self.font.clone();
        config.jpeg_quality = self.quality;
        Ok(config)
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            scale: 50,
            copyright: String::new(),
            font: DEFAULT_FONT.to_string(),
            quality: 75,
            config_file: None,
            json_progress: false,
            report: false,
            dry_run: false,
            verbose: false,
        }
    }
}

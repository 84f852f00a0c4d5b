pub mod annotate;
pub mod batch;
pub mod frame;
pub mod notify;

use ab_glyph::FontArc;
use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, ImageReader, RgbImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;

use crate::error::ConvertError;
use annotate::{add_copyright_annotation, load_caption_font};
use batch::{list_source_images, BatchReport, FileOutcome};
use frame::{frame_image, ScalePercent};
use notify::{ImageProcessorListener, ListenerId, ListenerRegistry, UiDispatcher};

/// Font requested when none is configured
pub const DEFAULT_FONT: &str = "Arial Bold";

/// JPEG quality used when none is configured
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Directory receiving the framed images, under their original names
    pub destination_dir: PathBuf,
    /// Caption stamped in the bottom-right corner of every image
    pub copyright: String,
    /// Font name, file name or absolute path for the caption
    pub font_name: String,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl ProcessorConfig {
    pub fn new(destination_dir: impl Into<PathBuf>, copyright: impl Into<String>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            copyright: copyright.into(),
            font_name: DEFAULT_FONT.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Frames images for a web gallery and reports each finished file to its listeners
pub struct ImageProcessor {
    config: ProcessorConfig,
    font: Option<FontArc>,
    listeners: ListenerRegistry,
}

impl ImageProcessor {
    /// Create a processor, resolving the caption font up front.
    ///
    /// If no usable font is found the images are still framed, without caption.
    pub fn new(config: ProcessorConfig) -> Self {
        let font = if config.copyright.is_empty() {
            None
        } else {
            match load_caption_font(&config.font_name) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::warn!(font = %config.font_name, error = %e, "Copyright caption disabled");
                    None
                }
            }
        };

        Self {
            config,
            font,
            listeners: ListenerRegistry::default(),
        }
    }

    /// Route listener callbacks through `dispatcher` instead of the calling thread
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        self.listeners.set_dispatcher(dispatcher);
        self
    }

    pub fn has_caption_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn add_listener(&self, listener: impl ImageProcessorListener + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Where `source` ends up in the destination directory
    pub fn output_path(&self, source: &Path) -> Result<PathBuf, ConvertError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| ConvertError::InvalidSource(source.to_path_buf()))?;
        Ok(self.config.destination_dir.join(file_name))
    }

    /// Decode, frame, caption and write one image, then notify the listeners.
    ///
    /// Errors are logged and returned; listeners only hear about successes.
    pub fn convert_image(&self, source: &Path, scale: ScalePercent) -> Result<PathBuf, ConvertError> {
        match self.try_convert(source, scale) {
            Ok(output) => {
                tracing::debug!(source = %source.display(), output = %output.display(), "Converted image");
                self.listeners.notify(source);
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(error = %e, "An error occurred while converting the image");
                Err(e)
            }
        }
    }

    fn try_convert(&self, source: &Path, scale: ScalePercent) -> Result<PathBuf, ConvertError> {
        let output = self.output_path(source)?;

        let img = decode_image(source)?;
        let mut canvas = frame_image(&img, scale).map_err(|e| ConvertError::Render {
            path: source.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
        drop(img);

        if let Some(font) = &self.font {
            add_copyright_annotation(&mut canvas, font, &self.config.copyright);
        }

        write_jpeg(&canvas, &output, self.config.jpeg_quality).map_err(|source| {
            ConvertError::Encode {
                path: output.clone(),
                source,
            }
        })?;

        Ok(output)
    }

    /// Convert every `.jpg` directly inside `dir`, one after the other.
    ///
    /// Per-file failures end up in the report; only an unreadable `dir` is an error.
    pub fn process_directory(&self, dir: &Path, scale: ScalePercent) -> Result<BatchReport> {
        let files = list_source_images(dir)?;
        Ok(self.process_files(&files, scale))
    }

    /// Convert the given files in order
    pub fn process_files(&self, files: &[PathBuf], scale: ScalePercent) -> BatchReport {
        let start = Instant::now();

        let outcomes: Vec<FileOutcome> = files
            .iter()
            .map(|source| FileOutcome {
                source: source.clone(),
                result: self.convert_image(source, scale),
            })
            .collect();

        let report = BatchReport {
            outcomes,
            duration: start.elapsed(),
        };
        tracing::info!(
            total = report.total(),
            successful = report.successful(),
            failed = report.failed(),
            "Batch finished"
        );
        report
    }
}

/// Decode by content rather than extension
fn decode_image(path: &Path) -> Result<RgbImage, ConvertError> {
    let decode_error = |source: ImageError| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let img = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    Ok(img.to_rgb8())
}

/// Encode into a temporary file beside `path`, then move it into place.
///
/// A failed encode leaves any previous file at `path` untouched.
fn write_jpeg(canvas: &RgbImage, path: &Path, quality: u8) -> Result<(), ImageError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100)).encode_image(canvas)?;
        writer.flush()?;
    }

    // Temp files are created owner-only; gallery output should be world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    staged
        .persist(path)
        .map_err(|e| ImageError::IoError(e.error))?;
    Ok(())
}

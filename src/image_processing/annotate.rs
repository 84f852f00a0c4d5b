use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frame::FRAME_WIDTH;

/// Pixel size of the copyright caption
pub const CAPTION_FONT_SIZE: f32 = 16.0;

/// Gap kept between the caption and whatever sits to its left
const CAPTION_LEFT_PADDING: u32 = 5;

const CAPTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Bold faces tried when the requested font cannot be found
const BOLD_FALLBACKS: &[&str] = &[
    "Arial Bold",
    "arialbd",
    "Helvetica Bold",
    "DejaVuSans-Bold",
    "LiberationSans-Bold",
    "FreeSansBold",
    "NotoSans-Bold",
    "Ubuntu-B",
];

/// Stamp `text` in the bottom-right corner of the framed canvas.
///
/// The right edge of the caption sits [`FRAME_WIDTH`] pixels from the canvas
/// edge; its baseline sits one line height above the bottom frame. Text is
/// never wrapped and is clipped if it runs past the canvas.
pub fn add_copyright_annotation(canvas: &mut RgbImage, font: &FontArc, text: &str) {
    if text.is_empty() {
        return;
    }

    let scale = PxScale::from(CAPTION_FONT_SIZE);
    let (text_width, _) = text_size(scale, font, text);

    let scaled_font = font.as_scaled(scale);
    let ascent = scaled_font.ascent();
    let line_height = (scaled_font.height() + scaled_font.line_gap()).ceil() as i32;

    let (x, baseline) = caption_origin(canvas.dimensions(), text_width, line_height);

    // draw_text_mut positions the top of the line, not the baseline
    let y = baseline - ascent.round() as i32;

    draw_text_mut(canvas, CAPTION_COLOR, x, y, scale, font, text);
}

/// Left edge and baseline of the caption for a canvas of the given size
pub fn caption_origin(canvas: (u32, u32), text_width: u32, line_height: i32) -> (i32, i32) {
    let (width, height) = canvas;
    let advance = (text_width + CAPTION_LEFT_PADDING) as i32;

    let x = width as i32 - FRAME_WIDTH as i32 - advance;
    let baseline = height as i32 - FRAME_WIDTH as i32 - line_height;
    (x, baseline)
}

/// Load the caption font, preferring bold faces
///
/// Supports three formats:
/// 1. Full path: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf" -> loads directly
/// 2. Font filename: "arialbd.ttf" -> searched in the system font directories
/// 3. Font name: "Arial Bold" -> matched against font file names, ignoring case and separators
///
/// Names that cannot be resolved fall back to common bold sans faces.
pub fn load_caption_font(font_spec: &str) -> Result<FontArc> {
    if is_absolute_path(font_spec) {
        return load_font_from_path(Path::new(font_spec));
    }

    let font_files = system_font_files();

    if is_font_filename(font_spec) {
        let wanted = font_spec.to_lowercase();
        let found = font_files.iter().find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_lowercase() == wanted)
        });
        if let Some(path) = found {
            if let Ok(font) = load_font_from_path(path) {
                return Ok(font);
            }
        }
    } else if let Some(font) = find_font_by_name(&font_files, font_spec) {
        return Ok(font);
    }

    for fallback in BOLD_FALLBACKS {
        if let Some(font) = find_font_by_name(&font_files, fallback) {
            tracing::debug!(requested = font_spec, fallback, "using fallback caption font");
            return Ok(font);
        }
    }

    Err(anyhow!(
        "No suitable fonts found for '{}'. Please ensure system fonts are available or specify a valid font path.",
        font_spec
    ))
}

fn find_font_by_name(font_files: &[PathBuf], name: &str) -> Option<FontArc> {
    let wanted = normalize_font_name(name);
    font_files
        .iter()
        .filter(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| normalize_font_name(stem) == wanted)
        })
        .find_map(|path| load_font_from_path(path).ok())
}

/// Lowercase and drop spaces, dashes and underscores: "Arial-Bold" == "arial bold"
fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Check if the input is an absolute path
fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/') ||                           // Unix/Linux/macOS absolute path
    path.starts_with('\\') ||                          // Windows UNC path
    (path.len() > 2 && path.chars().nth(1) == Some(':')) // Windows drive path (C:, D:, etc.)
}

/// Check if the input looks like a font filename
fn is_font_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".ttf") || lower.ends_with(".otf") || lower.ends_with(".ttc")
}

fn load_font_from_path(font_path: &Path) -> Result<FontArc> {
    let font_data = std::fs::read(font_path)
        .with_context(|| format!("Failed to read font file: {}", font_path.display()))?;

    FontArc::try_from_vec(font_data)
        .map_err(|e| anyhow!("Failed to parse font file {}: {}", font_path.display(), e))
}

/// Every font file below the system font directories
fn system_font_files() -> Vec<PathBuf> {
    get_system_font_directories()
        .into_iter()
        .map(|dir| expand_path(dir))
        .filter(|dir| Path::new(dir).is_dir())
        .flat_map(|dir| {
            WalkDir::new(dir)
                .follow_links(true)
                .max_depth(4)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(is_font_filename)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Expand paths with ~ to home directory
fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{}/{}", home, rest);
        }
    }
    path.to_string()
}

/// Get common system font directories for different platforms
fn get_system_font_directories() -> Vec<&'static str> {
    vec![
        // macOS
        "/System/Library/Fonts",
        "/Library/Fonts",
        "~/Library/Fonts",
        // Linux
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "~/.fonts",
        "~/.local/share/fonts",
        // Windows
        "C:\\Windows\\Fonts",
        "/mnt/c/Windows/Fonts",
    ]
}

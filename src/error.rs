//! Error kinds reported by the framing pipeline.
//!
//! None of these escape a single-file conversion: the batch driver records
//! them in its per-file outcome list and moves on to the next image.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while converting one source image.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source is missing, unreadable or not a decodable image
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Framed image could not be written to the destination directory
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Scaling or composing the frame failed
    #[error("failed to render {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    /// Source path has no file name to reuse for the output
    #[error("source path has no file name: {0}")]
    InvalidSource(PathBuf),
}

impl ConvertError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConvertError::Decode { path, .. }
            | ConvertError::Encode { path, .. }
            | ConvertError::Render { path, .. }
            | ConvertError::InvalidSource(path) => path,
        }
    }
}

/// Failure handing a notification to the UI context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The UI context no longer accepts jobs
    #[error("UI context is unavailable")]
    Unavailable,

    /// The UI context accepted the job but dropped it without running it
    #[error("UI context dropped the notification before running it")]
    Abandoned,
}

/// Scale percentage outside `0..=100`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("scale must be between 0 and 100, got {0}")]
pub struct InvalidScale(pub u32);

//! JSON output for GUI integration
//!
//! When --json-progress flag is enabled, all progress and status information
//! is emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Batch started
    Started { total: usize, output_dir: String },
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        file: String,
        /// Estimated seconds left, once at least one file is done
        #[serde(skip_serializing_if = "Option::is_none", default)]
        eta_secs: Option<f64>,
    },
    /// File processing completed
    FileCompleted {
        input_path: String,
        output_path: String,
    },
    /// File processing failed
    FileFailed { input_path: String, error: String },
    /// Processing summary
    Summary {
        total_files: usize,
        processed: usize,
        failed: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Serialize to a single JSON line
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    pub fn started(total: usize, output_dir: &Path) {
        Self::Started {
            total,
            output_dir: output_dir.display().to_string(),
        }
        .emit();
    }

    pub fn progress(current: usize, total: usize, file: &Path, eta: Option<Duration>) {
        Self::Progress {
            current,
            total,
            file: file.display().to_string(),
            eta_secs: eta.map(|eta| eta.as_secs_f64()),
        }
        .emit();
    }

    pub fn file_completed(input_path: &Path, output_path: &Path) {
        Self::FileCompleted {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
        }
        .emit();
    }

    pub fn file_failed(input_path: &Path, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
        .emit();
    }

    pub fn summary(total_files: usize, processed: usize, failed: usize, duration_secs: f64) {
        Self::Summary {
            total_files,
            processed,
            failed,
            duration_secs,
        }
        .emit();
    }
}

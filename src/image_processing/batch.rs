use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::error::ConvertError;

/// Suffix (compared case-insensitively) of the files picked up from a directory
pub const SOURCE_SUFFIX: &str = ".jpg";

/// Check whether a file name ends in `.jpg`, ignoring case.
///
/// Works on the whole name, so a file called just `.jpg` qualifies.
pub fn has_jpg_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| {
            name.len()
                .checked_sub(SOURCE_SUFFIX.len())
                .and_then(|start| name.get(start..))
        })
        .is_some_and(|suffix| suffix.eq_ignore_ascii_case(SOURCE_SUFFIX))
}

/// List the `.jpg` files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that cannot be read are
/// logged and skipped; only an unreadable `dir` is an error.
pub fn list_source_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("Input path is not a directory: {}", dir.display()));
    }

    let mut image_files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to read directory: {}", dir.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && has_jpg_extension(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    Ok(image_files)
}

/// Result of converting one source file
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// Path of the written image, or why nothing was written
    pub result: Result<PathBuf, ConvertError>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of one directory run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            (self.successful() as f64 / self.total() as f64) * 100.0
        }
    }

    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ConvertError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.source.as_path(), e)))
    }

    /// Average time per attempted file
    pub fn average_duration(&self) -> Duration {
        if self.outcomes.is_empty() {
            Duration::ZERO
        } else {
            self.duration / self.outcomes.len() as u32
        }
    }
}

/// Progress tracking for front ends that know the file count up front
pub struct BatchProgress {
    pub total_files: usize,
    processed_count: AtomicUsize,
    start_time: Instant,
}

impl BatchProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            processed_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Increment processed count and return current count
    pub fn increment(&self) -> usize {
        self.processed_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn processed(&self) -> usize {
        self.processed_count.load(Ordering::Relaxed)
    }

    /// Get current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_files == 0 {
            1.0
        } else {
            (self.processed() as f64) / (self.total_files as f64)
        }
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Option<Duration> {
        let processed = self.processed();
        if processed == 0 {
            return None;
        }

        let remaining = self.total_files.saturating_sub(processed);
        if remaining == 0 {
            return Some(Duration::ZERO);
        }

        let time_per_item = self.start_time.elapsed() / processed as u32;
        Some(time_per_item * remaining as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;

    #[test]
    fn test_has_jpg_extension() {
        assert!(has_jpg_extension(Path::new("a.jpg")));
        assert!(has_jpg_extension(Path::new("b.JPG")));
        assert!(has_jpg_extension(Path::new("/photos/c.JpG")));
        assert!(has_jpg_extension(Path::new(".jpg")));
        assert!(has_jpg_extension(Path::new("/photos/.JPG")));

        assert!(!has_jpg_extension(Path::new("d.jpeg")));
        assert!(!has_jpg_extension(Path::new("e.png")));
        assert!(!has_jpg_extension(Path::new("jpg")));
        assert!(!has_jpg_extension(Path::new("f.jpg.bak")));
        assert!(!has_jpg_extension(Path::new("xjpg")));
        assert!(!has_jpg_extension(Path::new("ü.pg")));
    }

    #[test]
    fn test_list_source_images_immediate_children_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.JPG"), b"x").unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join(".jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        fs::write(dir.path().join("nested.jpg").join("deep.jpg"), b"x").unwrap();

        let files = list_source_images(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(files.len(), 3);
        assert!(names.contains(&".jpg".to_string()));
        assert!(names.contains(&"a.jpg".to_string()));
        assert!(names.contains(&"b.JPG".to_string()));
    }

    #[test]
    fn test_list_source_images_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_source_images(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_batch_report_counts() {
        let report = BatchReport {
            outcomes: vec![
                FileOutcome {
                    source: PathBuf::from("a.jpg"),
                    result: Ok(PathBuf::from("out/a.jpg")),
                },
                FileOutcome {
                    source: PathBuf::from("b.jpg"),
                    result: Err(ConvertError::InvalidSource(PathBuf::from("b.jpg"))),
                },
                FileOutcome {
                    source: PathBuf::from("c.jpg"),
                    result: Ok(PathBuf::from("out/c.jpg")),
                },
            ],
            duration: Duration::from_secs(3),
        };

        assert_eq!(report.total(), 3);
        assert_eq!(report.successful(), 2);
        assert_eq!(report.failed(), 1);
        assert!((report.success_rate() - 66.67).abs() < 0.1);
        assert_eq!(report.written().count(), 2);
        assert_eq!(report.failures().next().unwrap().0, Path::new("b.jpg"));
        assert_eq!(report.average_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_batch_report() {
        let report = BatchReport::default();
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.average_duration(), Duration::ZERO);
    }

    #[test]
    fn test_batch_progress() {
        let progress = BatchProgress::new(10);

        assert_eq!(progress.progress(), 0.0);
        assert!(progress.eta().is_none());

        thread::sleep(Duration::from_millis(10));
        assert_eq!(progress.increment(), 1);
        assert!((progress.progress() - 0.1).abs() < 0.01);
        assert!(progress.eta().unwrap() > Duration::ZERO);

        for _ in 0..9 {
            progress.increment();
        }
        assert!((progress.progress() - 1.0).abs() < 0.01);
        assert_eq!(progress.eta(), Some(Duration::ZERO));
    }
}

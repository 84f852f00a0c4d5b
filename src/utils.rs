use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
    );
    if let Ok(bar_style) = template {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` wins; otherwise `verbose` selects debug level for this crate.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "gallery_framer=debug"
    } else {
        "gallery_framer=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    let input_dir = args.input_dir()?;
    let output_dir = args.output_dir()?;

    if !input_dir.exists() {
        return Err(anyhow::anyhow!(
            "Input directory does not exist: {}",
            input_dir.display()
        ));
    }
    if !input_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Input path is not a directory: {}",
            input_dir.display()
        ));
    }

    if output_dir.exists() && !output_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Output path is not a directory: {}",
            output_dir.display()
        ));
    }

    // Writing next to the sources would overwrite the originals
    if same_directory(input_dir, output_dir) {
        return Err(anyhow::anyhow!(
            "Output directory must differ from the input directory: {}",
            output_dir.display()
        ));
    }

    if args.font.trim().is_empty() {
        return Err(anyhow::anyhow!("Font specification must not be empty"));
    }

    Ok(())
}

/// Whether two paths name the same directory, after resolving `.`/`..`,
/// trailing separators and symlinks where the paths exist
pub fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// File name of a path for display, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_millis(2250)), "2.250s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/photos/a.jpg")), "a.jpg");
        assert_eq!(display_name(Path::new("/")), "/");
    }

    #[test]
    fn test_validate_inputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let args = Args {
            input_dir: Some(input.path().to_path_buf()),
            output_dir: Some(output.path().join("new")),
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_ok());

        let args = Args {
            input_dir: Some(input.path().join("missing")),
            output_dir: Some(output.path().to_path_buf()),
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());

        let args = Args {
            input_dir: Some(input.path().to_path_buf()),
            output_dir: Some(input.path().to_path_buf()),
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());

        let args = Args {
            input_dir: Some(input.path().to_path_buf()),
            output_dir: None,
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());
    }

    #[test]
    fn test_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("photos");
        std::fs::create_dir(&nested).unwrap();

        let with_slash = PathBuf::from(format!("{}/", nested.display()));
        assert!(same_directory(&nested, &with_slash));
        assert!(same_directory(&nested, &nested.join("..").join("photos")));
        assert!(!same_directory(&nested, dir.path()));
        assert!(!same_directory(&nested, &dir.path().join("missing")));

        #[cfg(unix)]
        {
            let link = dir.path().join("link");
            std::os::unix::fs::symlink(&nested, &link).unwrap();
            assert!(same_directory(&nested, &link));
        }
    }

    #[test]
    fn test_validate_inputs_rejects_file_as_output() {
        let input = tempfile::tempdir().unwrap();
        let file = input.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let other = tempfile::tempdir().unwrap();

        let args = Args {
            input_dir: Some(other.path().to_path_buf()),
            output_dir: Some(PathBuf::from(&file)),
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());
    }
}

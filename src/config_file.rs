use crate::cli::Args;
use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::image_processing::frame::ScalePercent;

/// JSON configuration file, e.g.
///
/// ```json
/// { "inputPath": "photos", "outputPath": "web", "scale": 40, "copyright": "(c) Me" }
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub scale: Option<u32>,
    pub copyright: Option<String>,
    pub font: Option<String>,
    pub quality: Option<u8>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

impl Args {
    /// Parse the process arguments and merge in the config file, if any
    pub fn parse_with_config() -> Result<Self> {
        let matches = Args::command().get_matches();
        Self::from_matches_with_config(&matches)
    }

    /// Like [`Args::parse_with_config`] for an explicit argument list
    pub fn try_parse_with_config_from<I, T>(itr: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Args::command().try_get_matches_from(itr)?;
        Self::from_matches_with_config(&matches)
    }

    /// Load the `--config` file and merge it with the command-line arguments.
    /// Command-line arguments take precedence over config file values
    pub fn from_matches_with_config(matches: &ArgMatches) -> Result<Self> {
        let mut args = Args::from_arg_matches(matches)?;

        if let Some(config_path) = args.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            let from_cli = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);
            args.merge_from_config(config, from_cli)?;

            tracing::debug!(path = %config_path.display(), "Loaded configuration");
        }

        Ok(args)
    }

    fn merge_from_config(
        &mut self,
        config: ConfigFile,
        from_cli: impl Fn(&str) -> bool,
    ) -> Result<()> {
        if !from_cli("input_dir") {
            if let Some(input) = config.input_path {
                self.input_dir = Some(PathBuf::from(input));
            }
        }

        if !from_cli("output_dir") {
            if let Some(output) = config.output_path {
                self.output_dir = Some(PathBuf::from(output));
            }
        }

        if !from_cli("scale") {
            if let Some(scale) = config.scale {
                self.scale = ScalePercent::new(scale)
                    .context("Invalid scale in config file")?
                    .get() as u32;
            }
        }

        if !from_cli("copyright") {
            if let Some(copyright) = config.copyright {
                self.copyright = copyright;
            }
        }

        if !from_cli("font") {
            if let Some(font) = config.font {
                self.font = font;
            }
        }

        if !from_cli("quality") {
            if let Some(quality) = config.quality {
                if !(1..=100).contains(&quality) {
                    anyhow::bail!("Invalid quality in config file: {} (expected 1-100)", quality);
                }
                self.quality = quality;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("gallery.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_config_fills_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            r#"{"inputPath": "in", "outputPath": "out", "scale": 20, "copyright": "(c) Cfg", "quality": 88}"#,
        );

        let args = Args::try_parse_with_config_from([
            "gallery-framer".into(),
            OsString::from("--config"),
            config.into_os_string(),
        ])
        .unwrap();

        assert_eq!(args.input_dir, Some(PathBuf::from("in")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.scale, 20);
        assert_eq!(args.copyright, "(c) Cfg");
        assert_eq!(args.quality, 88);
    }

    #[test]
    fn test_command_line_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            r#"{"inputPath": "in", "scale": 20, "copyright": "(c) Cfg"}"#,
        );

        let args = Args::try_parse_with_config_from([
            OsString::from("gallery-framer"),
            "--config".into(),
            config.into_os_string(),
            "-s".into(),
            "50".into(),
            "-i".into(),
            "cli-in".into(),
        ])
        .unwrap();

        // Explicit flags win even when they equal the default
        assert_eq!(args.scale, 50);
        assert_eq!(args.input_dir, Some(PathBuf::from("cli-in")));
        assert_eq!(args.copyright, "(c) Cfg");
    }

    #[test]
    fn test_invalid_scale_in_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), r#"{"scale": 400}"#);

        let result = Args::try_parse_with_config_from([
            OsString::from("gallery-framer"),
            "--config".into(),
            config.into_os_string(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), "{ not json");

        let result = Args::try_parse_with_config_from([
            OsString::from("gallery-framer"),
            "--config".into(),
            config.into_os_string(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = Args::try_parse_with_config_from([
            "gallery-framer",
            "--config",
            "/definitely/not/here.json",
        ]);
        assert!(result.is_err());
    }
}

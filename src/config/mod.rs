//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod types;

pub use types::{DiffOptions, LogFormat, LoggingConfig};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Diff engine options
    #[serde(default)]
    pub diff: DiffOptions,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line, each replacing the file value when set
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--block-size`
    pub block_size: Option<u32>,
    /// `--window-size`
    pub window_size: Option<u32>,
    /// `--brush-width`
    pub brush_width: Option<u32>,
    /// `--outer-hl-window`
    pub outer_highlight_window: Option<u32>,
    /// `--inner-hl-window`
    pub inner_highlight_window: Option<u32>,
    /// `--intermediate-dir`
    pub intermediate_dir: Option<PathBuf>,
    /// Number of `-v` flags; zero keeps the configured level
    pub verbosity: u8,
    /// `--log-timestamp`; only ever turns timestamps on
    pub log_timestamp: bool,
    /// `--log-format`
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.diff.validate().context("Invalid diff options")?;

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let diff = &mut self.diff;
        if let Some(v) = overrides.block_size {
            diff.block_size = v;
        }
        if let Some(v) = overrides.window_size {
            diff.window_size = v;
        }
        if let Some(v) = overrides.brush_width {
            diff.brush_width = v;
        }
        if let Some(v) = overrides.outer_highlight_window {
            diff.outer_highlight_window = v;
        }
        if let Some(v) = overrides.inner_highlight_window {
            diff.inner_highlight_window = v;
        }
        if overrides.intermediate_dir.is_some() {
            diff.intermediate_dir = overrides.intermediate_dir;
        }

        let logging = &mut self.logging;
        if overrides.verbosity > 0 {
            logging.level = match overrides.verbosity {
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
            .to_string();
        }
        if overrides.log_timestamp {
            logging.timestamp = true;
        }
        if let Some(format) = overrides.log_format {
            logging.format = format;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.diff.block_size, 16);
        assert_eq!(config.diff.window_size, 200);
        assert_eq!(config.diff.brush_width, 9);
        assert_eq!(config.diff.outer_highlight_window, 21);
        assert_eq!(config.diff.inner_highlight_window, 5);
        assert!(config.diff.intermediate_dir.is_none());
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [diff]
            block_size = 8

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.diff.block_size, 8);
        assert_eq!(config.diff.window_size, 200);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff]\nwindow_size = 50\nintermediate_dir = \"/tmp/steps\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.diff.window_size, 50);
        assert_eq!(config.diff.intermediate_dir, Some(PathBuf::from("/tmp/steps")));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff]\nbrush_width = 4").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("brush width must be an odd number"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/uprightdiff.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_options_validation() {
        let mut options = DiffOptions::default();
        options.block_size = 0;
        assert!(options.validate().is_err());

        let mut options = DiffOptions::default();
        options.inner_highlight_window = 7;
        options.outer_highlight_window = 5;
        assert!(options.validate().is_err());

        let mut options = DiffOptions::default();
        options.inner_highlight_window = 1;
        options.outer_highlight_window = 1;
        options.brush_width = 1;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::default().with_overrides(Overrides {
            block_size: Some(32),
            inner_highlight_window: Some(3),
            verbosity: 2,
            log_timestamp: true,
            ..Default::default()
        });
        assert_eq!(config.diff.block_size, 32);
        assert_eq!(config.diff.inner_highlight_window, 3);
        assert_eq!(config.diff.window_size, 200);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.timestamp);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }
}

//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DiffError, Result};

/// Options of a single diff run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Side of the square blocks used for coarse motion search (pixels)
    #[serde(default = "default_block_size")]
    pub block_size: u32,

    /// Base search radius for block motion (pixels)
    #[serde(default = "default_window_size")]
    pub window_size: u32,

    /// Width of the consensus strip used when propagating motion (odd)
    #[serde(default = "default_brush_width")]
    pub brush_width: u32,

    /// Window that must be empty around an isolated residual (odd)
    #[serde(default = "default_outer_highlight_window")]
    pub outer_highlight_window: u32,

    /// Window that must contain an isolated residual (odd)
    #[serde(default = "default_inner_highlight_window")]
    pub inner_highlight_window: u32,

    /// Directory for intermediate debug images (None = not written)
    #[serde(default)]
    pub intermediate_dir: Option<PathBuf>,
}

fn default_block_size() -> u32 {
    16
}

fn default_window_size() -> u32 {
    200
}

fn default_brush_width() -> u32 {
    9
}

fn default_outer_highlight_window() -> u32 {
    21
}

fn default_inner_highlight_window() -> u32 {
    5
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            window_size: default_window_size(),
            brush_width: default_brush_width(),
            outer_highlight_window: default_outer_highlight_window(),
            inner_highlight_window: default_inner_highlight_window(),
            intermediate_dir: None,
        }
    }
}

impl DiffOptions {
    /// Check option values before any image is touched
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(DiffError::InvalidConfig(
                "block size must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("brush width", self.brush_width),
            ("outer highlight window", self.outer_highlight_window),
            ("inner highlight window", self.inner_highlight_window),
        ] {
            if value % 2 == 0 {
                return Err(DiffError::InvalidConfig(format!(
                    "{name} must be an odd number, got {value}"
                )));
            }
        }

        if self.inner_highlight_window > self.outer_highlight_window {
            return Err(DiffError::InvalidConfig(format!(
                "inner highlight window ({}) cannot be larger than outer highlight window ({})",
                self.inner_highlight_window, self.outer_highlight_window
            )));
        }

        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human readable output
    Pretty,
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Prefix log lines with a timestamp
    #[serde(default)]
    pub timestamp: bool,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamp: false,
            format: LogFormat::default(),
        }
    }
}

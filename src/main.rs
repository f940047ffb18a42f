//! uprightdiff - motion-compensated image diff
//!
//! Entry point for the command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use upright_diff::config::{Config, LogFormat, LoggingConfig, Overrides};
use upright_diff::utils::format_user_error;
use upright_diff::{DiffStats, UprightDiff};

/// Summary printed on stdout after a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per statistic
    #[default]
    Text,
    /// A single JSON object
    Json,
    /// Nothing
    None,
}

/// Command-line arguments for uprightdiff
#[derive(Parser, Debug)]
#[command(name = "uprightdiff")]
#[command(
    version,
    about = "Visual diff of two images, allowing for vertical motion",
    long_about = None
)]
pub struct Args {
    /// The baseline (old) image
    #[arg(value_name = "INPUT-1")]
    pub baseline: PathBuf,

    /// The current (new) image
    #[arg(value_name = "INPUT-2")]
    pub current: PathBuf,

    /// Where to write the visualization
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "UPRIGHTDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Block size for initial search [default: 16]
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Initial search window size [default: 200]
    #[arg(long)]
    pub window_size: Option<u32>,

    /// Brush width when painting motion; should be odd [default: 9]
    #[arg(long)]
    pub brush_width: Option<u32>,

    /// Outer window size for isolated residual highlighting; must be odd [default: 21]
    #[arg(long = "outer-hl-window")]
    pub outer_highlight_window: Option<u32>,

    /// Inner window size for isolated residual highlighting; must be odd [default: 5]
    #[arg(long = "inner-hl-window")]
    pub inner_highlight_window: Option<u32>,

    /// Directory for intermediate debug images
    #[arg(long)]
    pub intermediate_dir: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prefix log lines with a timestamp
    #[arg(long)]
    pub log_timestamp: bool,

    /// Log format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            block_size: self.block_size,
            window_size: self.window_size,
            brush_width: self.brush_width,
            outer_highlight_window: self.outer_highlight_window,
            inner_highlight_window: self.inner_highlight_window,
            intermediate_dir: self.intermediate_dir.clone(),
            verbosity: self.verbose,
            log_timestamp: self.log_timestamp,
            log_format: self.log_format,
        }
    }
}

/// JSON summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    modified_area: u64,
    moved_area: u64,
    residual_area: u64,
}

impl From<&DiffStats> for Summary {
    fn from(stats: &DiffStats) -> Self {
        Self {
            modified_area: stats.mask_area,
            moved_area: stats.moved_area,
            residual_area: stats.residual_area,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Options are checked before logging starts or any image is read
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }
    debug!("Config: {:?}", config);

    match run(&args, &config) {
        Ok(stats) => {
            print_summary(&stats, args.format);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = config.with_overrides(args.overrides());
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &Config) -> Result<DiffStats> {
    let differ = UprightDiff::new(config.diff.clone()).context("Invalid diff options")?;

    let baseline = open_rgb(&args.baseline, "first")?;
    let current = open_rgb(&args.current, "second")?;

    let output = differ.diff(&baseline, &current)?;

    output
        .visual
        .save(&args.output)
        .with_context(|| format!("Failed to write output image: {}", args.output.display()))?;
    info!("Wrote {}", args.output.display());

    Ok(output.stats)
}

/// Decode an input and flatten it to 8-bit RGB
fn open_rgb(path: &Path, label: &str) -> Result<image::DynamicImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open {} input image: {}", label, path.display()))?;
    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image::DynamicImage::ImageRgb8(image.into_rgb8()))
}

fn print_summary(stats: &DiffStats, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("Modified area: {} pixels", stats.mask_area);
            println!("Moved area: {} pixels", stats.moved_area);
            println!("Residual area: {} pixels", stats.residual_area);
        }
        OutputFormat::Json => match serde_json::to_string(&Summary::from(stats)) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize summary: {e}"),
        },
        OutputFormat::None => {}
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!(
            "upright_diff={level},uprightdiff={level},warn",
            level = logging.level
        ))
    })?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let layer = match (logging.format, logging.timestamp) {
        (LogFormat::Json, true) => layer.json().boxed(),
        (LogFormat::Json, false) => layer.json().without_time().boxed(),
        (LogFormat::Pretty, true) => layer.pretty().boxed(),
        (LogFormat::Pretty, false) => layer.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

//! # upright-diff
//!
//! Motion-compensated visual diff for screenshots of scrolling content.
//!
//! A plain pixel diff of two page renders lights up everything below the
//! first inserted line. This crate first estimates, per pixel, how far the
//! content moved vertically, and only reports what the motion does not
//! explain.
//!
//! # Architecture
//!
//! ```text
//! upright-diff
//!   ├─> raster    (pad inputs to a shared canvas, colour helpers)
//!   ├─> motion    (block search → upscale → line painting)
//!   ├─> residual  (classify unexplained pixels, circle isolated ones)
//!   ├─> annotate  (arrows, labels and outlines for moved regions)
//!   └─> diff      (runs the stages, intermediate dumps, statistics)
//! ```
//!
//! # Output
//!
//! The visualization shows unchanged and moved content as faded grey,
//! residual pixels with the old luma in red and the new luma in green,
//! isolated residuals circled in yellow, and moved regions marked with
//! arrows pointing from where the content was to where it is now.

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// Pipeline
// =============================================================================

/// Motion annotation layer
pub mod annotate;

/// Diff orchestration
pub mod diff;

/// Vertical motion estimation
pub mod motion;

/// Residual classification and highlighting
pub mod residual;

// =============================================================================
// Supporting modules
// =============================================================================

/// Diff and logging configuration
pub mod config;

/// Error types
pub mod error;

/// Dense 2-D grids
pub mod grid;

/// Input preparation and pixel colour helpers
pub mod raster;

/// Utility functions
pub mod utils;

pub use config::{Config, DiffOptions};
pub use diff::{diff, DiffOutput, DiffStats, UprightDiff};
pub use error::{DiffError, Result};
pub use motion::{Displacement, MotionField};

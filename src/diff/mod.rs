//! Diff Orchestration
//!
//! Runs the whole pipeline for one pair of images.
//!
//! # Stages
//!
//! ```text
//! baseline, current ──▶ pad to shared size ──▶ mask area (no motion)
//!                              │
//!                              ▼
//!                   BlockMotionSearch ──▶ scale_up ──▶ LinePainter
//!                                                          │
//!                                                          ▼
//!                        classify residuals ──▶ highlight ──▶ annotate motion
//! ```
//!
//! Every stage consumes the complete output of the previous one. Any error
//! aborts the run; nothing partial is returned.
//!
//! # Usage
//!
//! ```rust,no_run
//! use upright_diff::{DiffOptions, UprightDiff};
//!
//! let baseline = image::open("before.png")?.into_rgb8().into();
//! let current = image::open("after.png")?.into_rgb8().into();
//! let output = UprightDiff::new(DiffOptions::default())?.diff(&baseline, &current)?;
//! println!("{} pixels moved", output.stats.moved_area);
//! output.visual.save("diff.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Instant;

use image::{DynamicImage, RgbImage};
use serde::Serialize;
use tracing::{debug, info};

use crate::annotate::{annotate_motion, MotionRegion};
use crate::config::DiffOptions;
use crate::error::Result;
use crate::motion::{moved_area, scale_up, BlockMotionSearch, LinePainter, MotionField};
use crate::raster::{difference_mask, prepare_input, shared_size};
use crate::residual::{classify, highlight_isolated, HighlightWindows};

pub mod intermediate;

pub use intermediate::IntermediateWriter;

// =============================================================================
// Types
// =============================================================================

/// Pixel counts of one diff run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    /// Pixels in the shared canvas
    pub total_area: u64,
    /// Pixels that differ at identical coordinates, ignoring motion
    pub mask_area: u64,
    /// Pixels with a found, nonzero displacement
    pub moved_area: u64,
    /// Pixels not explained by the motion field
    pub residual_area: u64,
}

/// Everything produced by one diff run
#[derive(Debug, Clone)]
pub struct DiffOutput {
    /// Counts
    pub stats: DiffStats,
    /// Composited visualization, sized to the shared canvas
    pub visual: RgbImage,
    /// Final per-pixel motion field
    pub motion: MotionField,
    /// Centres of isolated-residual circles
    pub highlights: Vec<(u32, u32)>,
    /// Annotated motion regions
    pub regions: Vec<MotionRegion>,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Motion-compensated image differ
#[derive(Debug, Clone)]
pub struct UprightDiff {
    options: DiffOptions,
    intermediate: IntermediateWriter,
}

impl UprightDiff {
    /// Create a differ, rejecting invalid options up front
    pub fn new(options: DiffOptions) -> Result<Self> {
        options.validate()?;
        let intermediate = IntermediateWriter::new(options.intermediate_dir.as_deref());
        Ok(Self {
            options,
            intermediate,
        })
    }

    /// Diff `current` against `baseline`
    ///
    /// Both images must be 8-bit RGB. They are extended to their shared
    /// (elementwise maximum) size with grey before comparison.
    pub fn diff(&self, baseline: &DynamicImage, current: &DynamicImage) -> Result<DiffOutput> {
        let start = Instant::now();
        let opts = &self.options;

        let (width, height) = shared_size(baseline, current);
        info!("Extending images to {}x{}", width, height);
        let baseline = prepare_input("first", baseline, width, height)?;
        let current = prepare_input("second", current, width, height)?;

        let (mask, mask_area) = difference_mask(&baseline, &current);
        debug!(mask_area, "Computed difference mask");
        self.intermediate.write_gray("mask", &mask);

        info!("Searching for block motion");
        let blocks = BlockMotionSearch::new(&current, &baseline, opts.block_size, opts.window_size).search();
        let mut motion = scale_up(&blocks, opts.block_size, width, height);
        self.intermediate.write_motion("prepaint", &motion);

        info!("Expanding motion regions");
        LinePainter::new(&mut motion, &current, &baseline, opts.brush_width).paint_all();
        self.intermediate.write_motion("postpaint", &motion);
        let moved_area = moved_area(&motion);

        info!("Calculating residuals");
        let mut residual = classify(&baseline, &current, &motion)?;
        self.intermediate.write_rgb("moved", &residual.moved);
        self.intermediate.write_mask("residual-mask", &residual.mask);
        self.intermediate.write_rgb("plain-residual", &residual.visual);

        let windows = HighlightWindows {
            inner: opts.inner_highlight_window,
            outer: opts.outer_highlight_window,
        };
        let highlights = highlight_isolated(&mut residual.visual, &mut residual.mask, windows);
        self.intermediate.write_rgb("circled-residual", &residual.visual);

        info!("Annotating motion");
        let mut visual = residual.visual;
        let regions = annotate_motion(&mut visual, &motion);

        let stats = DiffStats {
            total_area: width as u64 * height as u64,
            mask_area,
            moved_area,
            residual_area: residual.residual_area,
        };
        info!(
            mask_area = stats.mask_area,
            moved_area = stats.moved_area,
            residual_area = stats.residual_area,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Done"
        );

        Ok(DiffOutput {
            stats,
            visual,
            motion,
            highlights,
            regions,
        })
    }
}

/// Diff two images with the given options
pub fn diff(baseline: &DynamicImage, current: &DynamicImage, options: &DiffOptions) -> Result<DiffOutput> {
    UprightDiff::new(options.clone())?.diff(baseline, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use image::Rgb;

    fn rgb(image: RgbImage) -> DynamicImage {
        DynamicImage::ImageRgb8(image)
    }

    #[test]
    fn test_identical_images() {
        let image = rgb(RgbImage::from_fn(40, 30, |x, y| Rgb([x as u8, y as u8, 7])));
        let output = diff(&image, &image, &DiffOptions::default()).unwrap();
        assert_eq!(
            output.stats,
            DiffStats {
                total_area: 1200,
                mask_area: 0,
                moved_area: 0,
                residual_area: 0,
            }
        );
        assert!(output.highlights.is_empty());
        assert!(output.regions.is_empty());
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let options = DiffOptions {
            brush_width: 8,
            ..Default::default()
        };
        assert!(matches!(UprightDiff::new(options), Err(DiffError::InvalidConfig(_))));
    }

    #[test]
    fn test_wrong_pixel_type_rejected() {
        let good = rgb(RgbImage::new(4, 4));
        let bad = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
        let err = diff(&good, &bad, &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::InvalidInput { label: "second", .. }));
        let err = diff(&bad, &good, &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::InvalidInput { label: "first", .. }));
    }

    #[test]
    fn test_output_has_shared_size() {
        let small = rgb(RgbImage::from_pixel(10, 20, Rgb([1, 2, 3])));
        let wide = rgb(RgbImage::from_pixel(25, 5, Rgb([1, 2, 3])));
        let output = diff(&small, &wide, &DiffOptions::default()).unwrap();
        assert_eq!(output.visual.dimensions(), (25, 20));
        assert_eq!(output.stats.total_area, 500);
        assert_eq!(output.motion.width(), 25);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = DiffStats {
            total_area: 4,
            mask_area: 3,
            moved_area: 2,
            residual_area: 1,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"totalArea":4,"maskArea":3,"movedArea":2,"residualArea":1}"#
        );
    }
}

//! Residual Classification
//!
//! Applies the motion field to the baseline and compares the result with the
//! current image. Pixels explained by the motion (or unchanged where no motion
//! was found) are drawn as faded grey; the rest are residuals, drawn with the
//! old luma in red and the new luma in green.
//!
//! Isolated residuals are circled afterwards by [`highlight::highlight_isolated`].

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::error::{DiffError, Result};
use crate::grid::Grid;
use crate::motion::{Displacement, MotionField};
use crate::raster::{change_color, faded_grey};

pub mod counter;
pub mod highlight;

pub use counter::RollingBlockCounter;
pub use highlight::{highlight_isolated, HighlightWindows, HIGHLIGHT_COLOR};

/// Colour of the moved image where no motion was found
pub const UNMOVED_COLOR: Rgb<u8> = Rgb([255, 0, 255]);

/// Result of residual classification
#[derive(Debug, Clone)]
pub struct Residual {
    /// Faded-grey rendering with residuals in red/green
    pub visual: RgbImage,
    /// 1 where the pixel is a residual, 0 elsewhere
    pub mask: Grid<u8>,
    /// Baseline with the motion field applied
    pub moved: RgbImage,
    /// Number of residual pixels
    pub residual_area: u64,
}

/// Baseline content moved by `field`
///
/// Fails with [`DiffError::MotionOutOfBounds`] if any displacement reads
/// outside the baseline.
pub fn apply_motion(baseline: &RgbImage, field: &MotionField) -> Result<RgbImage> {
    let (width, height) = baseline.dimensions();
    let mut moved = RgbImage::from_pixel(width, height, UNMOVED_COLOR);
    for y in 0..height {
        for x in 0..width {
            let Displacement::Found(dy) = field.get(x as usize, y as usize) else {
                continue;
            };
            let src_y = y
                .checked_add_signed(dy)
                .filter(|&sy| sy < height)
                .ok_or(DiffError::MotionOutOfBounds { x, y, dy })?;
            moved.put_pixel(x, y, *baseline.get_pixel(x, src_y));
        }
    }
    Ok(moved)
}

/// Classify every pixel as explained or residual
pub fn classify(baseline: &RgbImage, current: &RgbImage, field: &MotionField) -> Result<Residual> {
    debug_assert_eq!(baseline.dimensions(), current.dimensions());
    let moved = apply_motion(baseline, field)?;
    let (width, height) = current.dimensions();

    let mut visual = RgbImage::new(width, height);
    let mut mask = Grid::filled(width as usize, height as usize, 0u8);
    let mut residual_area = 0u64;

    for (x, y, now) in current.enumerate_pixels() {
        // Where nothing moved, compare against the baseline in place
        let before = match field.get(x as usize, y as usize) {
            Displacement::Found(_) => moved.get_pixel(x, y),
            Displacement::NotFound => baseline.get_pixel(x, y),
        };
        if before == now {
            visual.put_pixel(x, y, faded_grey(now));
        } else {
            visual.put_pixel(x, y, change_color(before, now));
            mask.set(x as usize, y as usize, 1);
            residual_area += 1;
        }
    }

    debug!(residual_area, "Residuals classified");
    Ok(Residual {
        visual,
        mask,
        moved,
        residual_area,
    })
}

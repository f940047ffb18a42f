//! Isolated-Feature Highlighting
//!
//! A residual that is small and alone is easy to miss in the visualization.
//! Two concentric windows slide down every column of the residual mask; when
//! the inner window holds residuals and the ring between inner and outer
//! window is empty, the feature is circled.
//!
//! Once circled, the feature is erased from the mask so it cannot trigger
//! again from a neighbouring window position.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use tracing::{debug, trace};

use super::counter::RollingBlockCounter;
use crate::grid::Grid;

/// Colour of highlight circles
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Largest circle radius
const MAX_RADIUS: u32 = 10;

/// Stroke width of highlight circles in pixels
const STROKE: u32 = 2;

/// Inner and outer window sizes of the isolation test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightWindows {
    /// Window that must contain the feature
    pub inner: u32,
    /// Window whose ring around `inner` must be empty
    pub outer: u32,
}

impl HighlightWindows {
    fn circle_radius(&self) -> u32 {
        MAX_RADIUS.min(self.inner * 2)
    }
}

/// Circle isolated residuals on `visual`, consuming them from `mask`
///
/// Returns the circle centres in the order they were drawn. Each circle is
/// centred on the mean position of the residual pixels inside the inner
/// window that triggered it.
pub fn highlight_isolated(
    visual: &mut RgbImage,
    mask: &mut Grid<u8>,
    windows: HighlightWindows,
) -> Vec<(u32, u32)> {
    let (width, height) = (mask.width(), mask.height());
    let inner_half = windows.inner.saturating_sub(1) as usize / 2;
    let radius = windows.circle_radius();
    let mut centres = Vec::new();

    for cx in 0..width {
        let mut inner = RollingBlockCounter::new(cx, windows.inner as usize, width);
        let mut outer = RollingBlockCounter::new(cx, windows.outer as usize, width);

        for cy in 0..height {
            let inner_count = inner.query(mask, cy);
            let outer_count = outer.query(mask, cy);
            if inner_count == 0 || inner_count != outer_count {
                continue;
            }

            let x0 = cx.saturating_sub(inner_half);
            let y0 = cy.saturating_sub(inner_half);
            let x1 = (cx + inner_half + 1).min(width);
            let y1 = (cy + inner_half + 1).min(height);

            let centre = feature_centre(mask, (x0, y0), (x1, y1), inner_count);
            trace!(cx, cy, ?centre, inner_count, "Isolated residual");
            draw_circle(visual, centre, radius);
            centres.push(centre);

            mask.fill_rect(x0, y0, x1, y1, 0);
            inner.purge();
            outer.purge();
        }
    }

    debug!(count = centres.len(), "Isolated residuals highlighted");
    centres
}

/// Mean position of the set cells of `mask` inside `[start, end)`
fn feature_centre(mask: &Grid<u8>, start: (usize, usize), end: (usize, usize), count: u32) -> (u32, u32) {
    let (mut sum_x, mut sum_y, mut total) = (0u64, 0u64, 0u64);
    for y in start.1..end.1 {
        for x in start.0..end.0 {
            let weight = mask.get(x, y) as u64;
            sum_x += x as u64 * weight;
            sum_y += y as u64 * weight;
            total += weight;
        }
    }
    debug_assert_eq!(total, count as u64);
    let total = total.max(1);
    ((sum_x / total) as u32, (sum_y / total) as u32)
}

fn draw_circle(visual: &mut RgbImage, centre: (u32, u32), radius: u32) {
    let centre = (centre.0 as i32, centre.1 as i32);
    for r in radius.saturating_sub(STROKE - 1)..=radius {
        draw_hollow_circle_mut(visual, centre, r as i32, HIGHLIGHT_COLOR);
    }
}

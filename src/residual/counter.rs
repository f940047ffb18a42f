//! Rolling Block Counter
//!
//! Sum of mask values in a square window sliding down a fixed column strip.
//! Stepping from `cy - 1` to `cy` costs one strip width: the row leaving the
//! top of the window is subtracted and the row entering at the bottom is
//! added. Any other query recomputes the window from scratch.
//!
//! The counter does not hold the mask, so the mask can be edited between
//! queries. Call [`RollingBlockCounter::purge`] after editing it.

use crate::grid::Grid;

/// Incremental windowed sum over a vertical strip of a mask
#[derive(Debug, Clone)]
pub struct RollingBlockCounter {
    half_window: usize,
    left: usize,
    right: usize,
    cy: usize,
    count: u32,
    valid: bool,
}

impl RollingBlockCounter {
    /// Counter for the `window`-wide strip centred on column `centre_x`
    ///
    /// The strip is clipped to `[0, mask_width)`.
    pub fn new(centre_x: usize, window: usize, mask_width: usize) -> Self {
        let half_window = window.saturating_sub(1) / 2;
        Self {
            half_window,
            left: centre_x.saturating_sub(half_window),
            right: (centre_x + half_window + 1).min(mask_width),
            cy: 0,
            count: 0,
            valid: false,
        }
    }

    /// Force the next query to recompute from scratch
    pub fn purge(&mut self) {
        self.valid = false;
    }

    /// Sum of `mask` over rows `[cy - hw, cy + hw]` of the strip, clipped to the mask
    pub fn query(&mut self, mask: &Grid<u8>, cy: usize) -> u32 {
        if self.valid && cy == self.cy {
            return self.count;
        }

        if self.valid && cy == self.cy + 1 {
            if let Some(top) = cy.checked_sub(self.half_window + 1) {
                self.count -= self.row_sum(mask, top);
            }
            let bottom = cy + self.half_window;
            if bottom < mask.height() {
                self.count += self.row_sum(mask, bottom);
            }
        } else {
            let top = cy.saturating_sub(self.half_window);
            let bottom = (cy + self.half_window + 1).min(mask.height());
            self.count = (top..bottom).map(|y| self.row_sum(mask, y)).sum();
        }

        self.valid = true;
        self.cy = cy;
        self.count
    }

    #[inline]
    fn row_sum(&self, mask: &Grid<u8>, y: usize) -> u32 {
        mask.row(y)[self.left..self.right]
            .iter()
            .map(|&v| v as u32)
            .sum()
    }
}

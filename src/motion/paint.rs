//! Sub-block Line Painter
//!
//! Block search only resolves whole blocks. The painter pushes known
//! displacements into unassigned pixels next to them by scanning every row
//! (left→right, right→left) and every column (top→bottom, bottom→top).
//!
//! At each scan position a strip of `brush_width` cells perpendicular to the
//! scan direction is inspected. A displacement carried over from the previous
//! position is painted into the strip when:
//!
//! - the strip's weak consensus is unassigned or equal to the carried value
//! - for each painted pixel, the baseline at the shifted position has the
//!   same colour as the current image
//!
//! The value carried to the next position is the strip's strong consensus,
//! taken after painting.

use image::RgbImage;

use super::{Consensus, Displacement, MotionField};

/// Value shared by every cell; any disagreement is `Invalid`
pub fn strong_consensus(cells: impl IntoIterator<Item = Displacement>) -> Consensus {
    let mut cells = cells.into_iter();
    let Some(first) = cells.next() else {
        return Consensus::NotFound;
    };
    if cells.any(|d| d != first) {
        return Consensus::Invalid;
    }
    match first {
        Displacement::Found(dy) => Consensus::Found(dy),
        Displacement::NotFound => Consensus::NotFound,
    }
}

/// Value shared by every assigned cell, ignoring unassigned ones
pub fn weak_consensus(cells: impl IntoIterator<Item = Displacement>) -> Consensus {
    let mut consensus = Consensus::NotFound;
    for cell in cells {
        match (cell, consensus) {
            (Displacement::NotFound, _) => {}
            (Displacement::Found(dy), Consensus::NotFound) => consensus = Consensus::Found(dy),
            (Displacement::Found(dy), Consensus::Found(agreed)) if dy == agreed => {}
            (Displacement::Found(_), _) => return Consensus::Invalid,
        }
    }
    consensus
}

/// Propagates displacements along scan lines of a motion field
pub struct LinePainter<'a> {
    field: &'a mut MotionField,
    current: &'a RgbImage,
    baseline: &'a RgbImage,
    half_width: i64,
}

impl<'a> LinePainter<'a> {
    /// Create a painter with an odd `brush_width`
    pub fn new(
        field: &'a mut MotionField,
        current: &'a RgbImage,
        baseline: &'a RgbImage,
        brush_width: u32,
    ) -> Self {
        debug_assert_eq!(field.width(), current.width() as usize);
        debug_assert_eq!(field.height(), current.height() as usize);
        Self {
            field,
            current,
            baseline,
            half_width: (brush_width.max(1) as i64 - 1) / 2,
        }
    }

    /// Paint every row in both directions, then every column in both directions
    pub fn paint_all(&mut self) {
        let width = self.field.width() as i64;
        let height = self.field.height() as i64;
        for y in 0..height {
            self.paint_line((0, y), (1, 0));
            self.paint_line((width - 1, y), (-1, 0));
        }
        for x in 0..width {
            self.paint_line((x, 0), (0, 1));
            self.paint_line((x, height - 1), (0, -1));
        }
    }

    /// Scan from `start` in direction `step` until the strip leaves the field
    pub fn paint_line(&mut self, start: (i64, i64), step: (i64, i64)) {
        // The brush lies across the scan direction
        let brush = (step.1, step.0);
        let mut pos = start;
        let mut carried = Consensus::NotFound;

        while self.field.contains(pos.0, pos.1) {
            let hw = self.half_width;
            let first = (pos.0 - hw * brush.0, pos.1 - hw * brush.1);
            let last = (pos.0 + hw * brush.0, pos.1 + hw * brush.1);
            if !self.field.contains(first.0, first.1) || !self.field.contains(last.0, last.1) {
                break;
            }

            if let Consensus::Found(dy) = carried {
                let here = weak_consensus(self.strip(pos, brush));
                if here == Consensus::NotFound || here == carried {
                    self.paint_strip(pos, brush, dy);
                }
            }

            carried = strong_consensus(self.strip(pos, brush));
            pos = (pos.0 + step.0, pos.1 + step.1);
        }
    }

    /// Cells of the strip centred on `pos`
    fn strip(&self, pos: (i64, i64), brush: (i64, i64)) -> impl Iterator<Item = Displacement> + '_ {
        (-self.half_width..=self.half_width)
            .map(move |b| self.field.get((pos.0 + b * brush.0) as usize, (pos.1 + b * brush.1) as usize))
    }

    /// Assign `dy` to strip pixels whose shifted baseline colour matches
    fn paint_strip(&mut self, pos: (i64, i64), brush: (i64, i64), dy: i32) {
        for b in -self.half_width..=self.half_width {
            let (sx, sy) = (pos.0 + b * brush.0, pos.1 + b * brush.1);
            let dest_y = sy + dy as i64;
            if !self.field.contains(sx, dest_y) {
                continue;
            }
            let (sx, sy, dest_y) = (sx as u32, sy as u32, dest_y as u32);
            if self.baseline.get_pixel(sx, dest_y) == self.current.get_pixel(sx, sy) {
                self.field.set(sx as usize, sy as usize, Displacement::Found(dy));
            }
        }
    }
}

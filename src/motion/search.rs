//! Block Motion Search
//!
//! Splits the current image into `block_size × block_size` blocks (a partial
//! trailing row or column is left out) and finds, for each block, a vertical
//! shift at which the baseline holds byte-identical content.
//!
//! # Candidate priority
//!
//! 1. The left neighbour's shift, accepted without further search if it matches
//! 2. Otherwise an outward search centred on the above neighbour's shift,
//!    else the left neighbour's shift, else no motion
//!
//! The search centre is clamped so the shifted block stays inside the
//! baseline, and the radius is widened so the no-motion position is always
//! reachable.
//!
//! Blocks are visited in row-major order; each block only reads results of
//! blocks already visited (left and above).

use image::RgbImage;
use tracing::debug;

use super::sequencer::AlternatingWindow;
use super::{BlockMotionGrid, Displacement};

/// A square block of an image, addressed by its top-left corner
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    image: &'a RgbImage,
    x: u32,
    y: u32,
    size: u32,
}

impl<'a> BlockRef<'a> {
    /// Block of `size × size` pixels at `(x, y)`, `None` if it leaves the image
    pub fn new(image: &'a RgbImage, x: u32, y: u32, size: u32) -> Option<Self> {
        let fits_x = x.checked_add(size).is_some_and(|r| r <= image.width());
        let fits_y = y.checked_add(size).is_some_and(|b| b <= image.height());
        (fits_x && fits_y).then_some(Self { image, x, y, size })
    }

    /// Raw bytes of one row of the block
    #[inline]
    fn row(&self, row: u32) -> &'a [u8] {
        let stride = self.image.width() as usize * 3;
        let start = (self.y + row) as usize * stride + self.x as usize * 3;
        let raw: &'a [u8] = self.image.as_raw();
        &raw[start..start + self.size as usize * 3]
    }
}

/// Exact, byte-for-byte comparison of two blocks, row by row
pub fn block_equal(a: &BlockRef<'_>, b: &BlockRef<'_>) -> bool {
    if a.size != b.size {
        return false;
    }
    (0..a.size).all(|row| a.row(row) == b.row(row))
}

/// Where to search for a block and how far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchWindow {
    /// Baseline row the search starts from
    pub(crate) centre: i32,
    /// Exclusive upper bound of valid baseline rows for the block's top edge
    pub(crate) bound: i32,
    /// Effective search radius
    pub(crate) radius: u32,
}

impl SearchWindow {
    /// Search window for a block whose top edge is at row `y`
    ///
    /// Valid top rows in the baseline are `[0, height - block_size]`.
    pub(crate) fn new(y: i32, hint: Option<i32>, height: u32, block_size: u32, window: u32) -> Self {
        let last_row = height as i32 - block_size as i32;
        let centre = (y + hint.unwrap_or(0)).clamp(0, last_row.max(0));
        let radius = window.max(centre.abs_diff(y));
        Self {
            centre,
            bound: last_row + 1,
            radius,
        }
    }
}

/// Block-level vertical motion estimator
#[derive(Debug)]
pub struct BlockMotionSearch<'a> {
    current: &'a RgbImage,
    baseline: &'a RgbImage,
    block_size: u32,
    window_size: u32,
}

impl<'a> BlockMotionSearch<'a> {
    /// Create a search of `current` against `baseline`
    ///
    /// # Panics
    ///
    /// Panics if the two images differ in size or `block_size` is zero
    pub fn new(
        current: &'a RgbImage,
        baseline: &'a RgbImage,
        block_size: u32,
        window_size: u32,
    ) -> Self {
        assert_eq!(
            current.dimensions(),
            baseline.dimensions(),
            "Image size mismatch: current {:?}, baseline {:?}",
            current.dimensions(),
            baseline.dimensions()
        );
        assert!(block_size > 0, "block size must be positive");
        Self {
            current,
            baseline,
            block_size,
            window_size,
        }
    }

    /// Find the displacement of every full block
    pub fn search(&self) -> BlockMotionGrid {
        let blocks_x = (self.current.width() / self.block_size) as usize;
        let blocks_y = (self.current.height() / self.block_size) as usize;
        let mut grid = BlockMotionGrid::filled(blocks_x, blocks_y, Displacement::NotFound);

        let mut found = 0usize;
        for by in 0..blocks_y {
            for bx in 0..blocks_x {
                let left = if bx > 0 { grid.get(bx - 1, by).dy() } else { None };
                let above = if by > 0 { grid.get(bx, by - 1).dy() } else { None };
                let motion = self.search_block(bx, by, left, above);
                if motion != Displacement::NotFound {
                    found += 1;
                }
                grid.set(bx, by, motion);
            }
        }

        debug!(
            "Block search: {}/{} blocks matched ({}×{} grid)",
            found,
            blocks_x * blocks_y,
            blocks_x,
            blocks_y
        );
        grid
    }

    /// Search one block given the results of its left and above neighbours
    fn search_block(
        &self,
        bx: usize,
        by: usize,
        left: Option<i32>,
        above: Option<i32>,
    ) -> Displacement {
        let x = bx as u32 * self.block_size;
        let y = by as u32 * self.block_size;
        let Some(source) = BlockRef::new(self.current, x, y, self.block_size) else {
            return Displacement::NotFound;
        };

        // Continuation of a horizontal run
        if let Some(dy) = left {
            if self.try_motion(&source, dy) {
                return Displacement::Found(dy);
            }
        }

        let window = SearchWindow::new(
            y as i32,
            above.or(left),
            self.baseline.height(),
            self.block_size,
            self.window_size,
        );
        AlternatingWindow::new(window.centre, window.bound, window.radius)
            .map(|pos| pos - y as i32)
            .find(|&dy| self.try_motion(&source, dy))
            .map_or(Displacement::NotFound, Displacement::Found)
    }

    /// Compare `source` against the baseline shifted by `dy`
    fn try_motion(&self, source: &BlockRef<'_>, dy: i32) -> bool {
        let Some(top) = source.y.checked_add_signed(dy) else {
            return false;
        };
        match BlockRef::new(self.baseline, source.x, top, self.block_size) {
            Some(dest) => block_equal(source, &dest),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const GREY: Rgb<u8> = Rgb([128, 128, 128]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, color);
            }
        }
    }

    /// Rows carry distinct colours so every vertical shift is unambiguous
    fn striped(width: u32, height: u32, offset: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = y + offset;
            Rgb([(v % 251) as u8, (v / 251) as u8, (x % 7) as u8])
        })
    }

    // -------------------------------------------------------------------------
    // Block equality tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_block_equal_reflexive() {
        let img = striped(32, 32, 0);
        let block = BlockRef::new(&img, 8, 8, 16).unwrap();
        assert!(block_equal(&block, &block));
    }

    #[test]
    fn test_block_equal_detects_single_pixel() {
        let a = striped(16, 16, 0);
        let mut b = a.clone();
        b.put_pixel(15, 15, Rgb([1, 2, 3]));
        let ba = BlockRef::new(&a, 0, 0, 16).unwrap();
        let bb = BlockRef::new(&b, 0, 0, 16).unwrap();
        assert!(!block_equal(&ba, &bb));
    }

    #[test]
    fn test_block_ref_rejects_out_of_bounds() {
        let img = striped(20, 20, 0);
        assert!(BlockRef::new(&img, 4, 4, 16).is_some());
        assert!(BlockRef::new(&img, 5, 4, 16).is_none());
        assert!(BlockRef::new(&img, 0, 5, 16).is_none());
    }

    // -------------------------------------------------------------------------
    // Search window tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_window_without_hint_starts_at_own_row() {
        let w = SearchWindow::new(32, None, 100, 16, 200);
        assert_eq!(w, SearchWindow { centre: 32, bound: 85, radius: 200 });
    }

    #[test]
    fn test_window_clamped_at_bottom_edge() {
        // Block at the last full row, hint pointing far past the bottom
        let w = SearchWindow::new(80, Some(50), 100, 16, 10);
        assert_eq!(w.centre, 84);
        assert_eq!(w.bound, 85);
        assert!(w.radius >= 4);
        for pos in AlternatingWindow::new(w.centre, w.bound, w.radius) {
            assert!(pos + 16 <= 100, "candidate {} reads past the bottom", pos);
        }
    }

    #[test]
    fn test_window_clamped_at_top_edge() {
        let w = SearchWindow::new(16, Some(-300), 100, 16, 10);
        assert_eq!(w.centre, 0);
        // Radius widened so that the unmoved position stays reachable
        assert_eq!(w.radius, 16);
    }

    // -------------------------------------------------------------------------
    // Search tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_identical_images_have_zero_motion() {
        let img = striped(48, 40, 0);
        let grid = BlockMotionSearch::new(&img, &img, 16, 200).search();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.iter().all(|&d| d == Displacement::Found(0)));
    }

    #[test]
    fn test_scrolled_content_found() {
        // Current shows the page scrolled down by 10 rows
        let baseline = striped(32, 64, 0);
        let current = striped(32, 64, 10);
        let grid = BlockMotionSearch::new(&current, &baseline, 16, 200).search();

        // Every block whose shifted position is still inside the baseline moves by 10
        for by in 0..3 {
            for bx in 0..2 {
                assert_eq!(grid.get(bx, by), Displacement::Found(10), "block ({bx}, {by})");
            }
        }
        // The last row of blocks has no counterpart
        assert_eq!(grid.get(0, 3), Displacement::NotFound);
    }

    #[test]
    fn test_square_moved_up_by_block() {
        let mut baseline = RgbImage::from_pixel(32, 32, GREY);
        let mut current = RgbImage::from_pixel(32, 32, GREY);
        fill_rect(&mut baseline, 16, 16, 16, 16, WHITE);
        fill_rect(&mut current, 16, 0, 16, 16, WHITE);

        let grid = BlockMotionSearch::new(&current, &baseline, 16, 200).search();
        assert_eq!(grid.get(0, 0), Displacement::Found(0));
        assert_eq!(grid.get(1, 0), Displacement::Found(16));
        assert_eq!(grid.get(0, 1), Displacement::Found(0));
        // The vacated area matches the grey above the old square
        assert_eq!(grid.get(1, 1), Displacement::Found(-16));
    }

    #[test]
    fn test_unmatched_block_not_found() {
        let baseline = RgbImage::from_pixel(32, 32, GREY);
        let mut current = baseline.clone();
        current.put_pixel(20, 20, WHITE);

        let grid = BlockMotionSearch::new(&current, &baseline, 16, 200).search();
        assert_eq!(grid.get(1, 1), Displacement::NotFound);
        assert_eq!(grid.get(0, 0), Displacement::Found(0));
    }

    #[test]
    fn test_image_smaller_than_block() {
        let img = striped(10, 10, 0);
        let grid = BlockMotionSearch::new(&img, &img, 16, 200).search();
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), 0);
    }

    #[test]
    fn test_bottom_block_never_reads_out_of_bounds() {
        // Height leaves a partial block row; the hint from the first block
        // row points the second row past the bottom of the baseline.
        let baseline = striped(32, 41, 0);
        let current = striped(32, 41, 25);
        let grid = BlockMotionSearch::new(&current, &baseline, 16, 30).search();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Displacement::Found(25));
        assert_eq!(grid.get(1, 0), Displacement::Found(25));
        assert_eq!(grid.get(0, 1), Displacement::NotFound);
        assert_eq!(grid.get(1, 1), Displacement::NotFound);
    }

    #[test]
    #[should_panic(expected = "Image size mismatch")]
    fn test_size_mismatch_panics() {
        let a = striped(16, 16, 0);
        let b = striped(16, 32, 0);
        let _ = BlockMotionSearch::new(&a, &b, 16, 10);
    }
}

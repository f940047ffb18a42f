//! Row-major 2-D grid
//!
//! Backing store for the block motion grid, the per-pixel motion field and
//! the residual mask. Coordinates are `(x, y)` with `x` the column.

/// A dense 2-D grid of `T`, stored row by row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Create a grid with every cell set to `value`
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid from row-major data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is not `width * height`
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "Grid size mismatch: got {} cells, expected {} for {}×{}",
            data.len(),
            width * height,
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Grid width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read the cell at `(x, y)`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    /// Write the cell at `(x, y)`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Whether signed coordinates fall inside the grid
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// One row of cells
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Set every cell of the rectangle `[x0, x1) × [y0, y1)` to `value`
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: T) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            let start = y * self.width;
            for cell in &mut self.data[start + x0.min(x1)..start + x1] {
                *cell = value;
            }
        }
    }

    /// Iterate over all cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_and_access() {
        let mut grid = Grid::filled(4, 3, 0u8);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        grid.set(3, 2, 7);
        assert_eq!(grid.get(3, 2), 7);
        assert_eq!(grid.row(2), &[0, 0, 0, 7]);
    }

    #[test]
    fn test_contains_signed() {
        let grid = Grid::from_vec(2, 2, vec![1, 2, 3, 4]);
        assert!(grid.contains(1, 1));
        assert!(!grid.contains(-1, 0));
        assert!(!grid.contains(0, 2));
    }

    #[test]
    fn test_fill_rect_clamps() {
        let mut grid = Grid::filled(4, 4, 1u8);
        grid.fill_rect(2, 2, 10, 10, 0);
        assert_eq!(grid.iter().filter(|&&v| v == 0).count(), 4);
        assert_eq!(grid.get(1, 1), 1);
        assert_eq!(grid.get(3, 3), 0);
    }

    #[test]
    #[should_panic(expected = "Grid size mismatch")]
    fn test_from_vec_wrong_size_panics() {
        let _ = Grid::from_vec(3, 3, vec![0u8; 8]);
    }
}

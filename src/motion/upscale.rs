//! Block grid → per-pixel motion field

use super::{BlockMotionGrid, Displacement, MotionField};

/// Replicate every block displacement over its `block_size²` pixels
///
/// Margins to the right of the last full block column and below the last
/// full block row are left as [`Displacement::NotFound`].
pub fn scale_up(blocks: &BlockMotionGrid, block_size: u32, width: u32, height: u32) -> MotionField {
    let bs = block_size as usize;
    let mut field = MotionField::filled(width as usize, height as usize, Displacement::NotFound);
    for by in 0..blocks.height() {
        for bx in 0..blocks.width() {
            let (x0, y0) = (bx * bs, by * bs);
            field.fill_rect(x0, y0, x0 + bs, y0 + bs, blocks.get(bx, by));
        }
    }
    field
}

//! Vertical Motion Estimation
//!
//! Estimates, for every pixel of the current image, the vertical shift that
//! maps it onto identical content in the baseline image.
//!
//! # Pipeline
//!
//! ```text
//! current + baseline → BlockMotionSearch → BlockMotionGrid
//!                                              │ scale_up
//!                                              ▼
//!                          MotionField (block resolution, margins unassigned)
//!                                              │ LinePainter (→ ← ↓ ↑)
//!                                              ▼
//!                          MotionField (refined at pixel level)
//! ```
//!
//! # Search order
//!
//! Candidate displacements are visited by [`AlternatingWindow`], nearest
//! guess first. The guess comes from the already-solved neighbour on the left
//! or above, so a scrolled column is usually confirmed on the first compare.

use crate::grid::Grid;

pub mod paint;
pub mod search;
pub mod sequencer;
pub mod upscale;

pub use paint::{strong_consensus, weak_consensus, LinePainter};
pub use search::{block_equal, BlockMotionSearch, BlockRef};
pub use sequencer::AlternatingWindow;
pub use upscale::scale_up;

/// Vertical displacement of a pixel or block
///
/// `Found(dy)` means the content at `(x, y)` in the current image equals the
/// baseline content at `(x, y + dy)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Displacement {
    /// A confirmed vertical shift in pixels
    Found(i32),
    /// No shift has been assigned
    #[default]
    NotFound,
}

impl Displacement {
    /// The shift, if one was found
    #[inline]
    pub fn dy(self) -> Option<i32> {
        match self {
            Displacement::Found(dy) => Some(dy),
            Displacement::NotFound => None,
        }
    }

    /// Whether this is a found, nonzero shift
    #[inline]
    pub fn is_moved(self) -> bool {
        matches!(self, Displacement::Found(dy) if dy != 0)
    }
}

/// Agreement of a neighbourhood of displacements
///
/// `Invalid` only exists here; it can never be written into a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consensus {
    /// Every considered cell holds this shift
    Found(i32),
    /// Every considered cell is unassigned
    NotFound,
    /// Cells disagree
    Invalid,
}

impl Consensus {
    /// The agreed shift, if there is one
    #[inline]
    pub fn dy(self) -> Option<i32> {
        match self {
            Consensus::Found(dy) => Some(dy),
            Consensus::NotFound | Consensus::Invalid => None,
        }
    }
}

/// One displacement per `block_size × block_size` block of the current image
pub type BlockMotionGrid = Grid<Displacement>;

/// One displacement per pixel of the shared canvas
pub type MotionField = Grid<Displacement>;

/// Number of pixels with a found, nonzero displacement
pub fn moved_area(field: &MotionField) -> u64 {
    field.iter().filter(|d| d.is_moved()).count() as u64
}

//! Diff Error Types
//!
//! Every failure of a diff run aborts the whole run. There are no retries:
//! the pipeline is deterministic and single-pass.

use thiserror::Error;

/// Result type for diff operations
pub type Result<T> = std::result::Result<T, DiffError>;

/// Diff error types
#[derive(Error, Debug)]
pub enum DiffError {
    /// An input image does not have the 8-bit 3-channel layout the engine needs
    #[error("The {label} image is invalid or has the wrong pixel type ({reason})")]
    InvalidInput {
        /// Which input ("first" or "second")
        label: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A motion vector points outside the baseline image.
    ///
    /// This cannot be caused by bad input; it means the motion field was
    /// built incorrectly.
    #[error("Motion out of bounds: ({x}, {y} + {dy})")]
    MotionOutOfBounds {
        /// Column of the offending pixel
        x: u32,
        /// Row of the offending pixel
        y: u32,
        /// Displacement that left the image
        dy: i32,
    },

    /// An option failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Image encode/decode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiffError {
    /// Whether the error points at a bug in the engine rather than at the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, DiffError::MotionOutOfBounds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = DiffError::InvalidInput {
            label: "second",
            reason: "expected Rgb8, got Rgba8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("The second image is invalid"));
        assert!(msg.contains("Rgba8"));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_out_of_bounds_is_internal() {
        let err = DiffError::MotionOutOfBounds { x: 3, y: 10, dy: -20 };
        assert_eq!(err.to_string(), "Motion out of bounds: (3, 10 + -20)");
        assert!(err.is_internal());
    }
}

//! Intermediate debug images
//!
//! When a directory is configured, named checkpoints of a diff run are saved
//! there as `<label>.png`. Writing is best effort: failures are logged and
//! the run carries on.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, RgbImage};
use tracing::{debug, warn};

use crate::grid::Grid;
use crate::motion::{Displacement, MotionField};

/// Grey level for unassigned motion
const UNASSIGNED_LEVEL: u8 = 255;

/// Saves checkpoints into an optional directory
#[derive(Debug, Clone, Default)]
pub struct IntermediateWriter {
    dir: Option<PathBuf>,
}

impl IntermediateWriter {
    /// Writer for `dir`; `None` disables all output
    pub fn new(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
        }
    }

    /// Whether anything will be written
    pub fn enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Save a colour checkpoint
    pub fn write_rgb(&self, label: &str, image: &RgbImage) {
        if let Some(path) = self.path_for(label) {
            Self::report(label, &path, image.save(&path));
        }
    }

    /// Save a greyscale checkpoint
    pub fn write_gray(&self, label: &str, image: &GrayImage) {
        if let Some(path) = self.path_for(label) {
            Self::report(label, &path, image.save(&path));
        }
    }

    /// Motion rendered as `dy * 10 + 128`, unassigned pixels white
    pub fn write_motion(&self, label: &str, field: &MotionField) {
        if self.enabled() {
            self.write_gray(label, &render_motion(field));
        }
    }

    /// Binary mask rendered black and white
    pub fn write_mask(&self, label: &str, mask: &Grid<u8>) {
        if self.enabled() {
            let image = GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
                Luma([if mask.get(x as usize, y as usize) != 0 { 255 } else { 0 }])
            });
            self.write_gray(label, &image);
        }
    }

    fn path_for(&self, label: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Cannot create intermediate directory {}: {}", dir.display(), e);
            return None;
        }
        Some(dir.join(format!("{label}.png")))
    }

    fn report(label: &str, path: &Path, result: image::ImageResult<()>) {
        match result {
            Ok(()) => debug!(label, path = %path.display(), "Wrote intermediate image"),
            Err(e) => warn!("Failed to write intermediate image {}: {}", path.display(), e),
        }
    }
}

/// Grey-level rendering of a motion field
pub fn render_motion(field: &MotionField) -> GrayImage {
    GrayImage::from_fn(field.width() as u32, field.height() as u32, |x, y| {
        let level = match field.get(x as usize, y as usize) {
            Displacement::Found(dy) => (dy as i64 * 10 + 128).clamp(0, 255) as u8,
            Displacement::NotFound => UNASSIGNED_LEVEL,
        };
        Luma([level])
    })
}

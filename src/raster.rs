//! Input preparation and pixel colour helpers
//!
//! Both inputs are extended to a shared canvas (the elementwise maximum of
//! their dimensions). Pixels outside an input are filled with neutral grey.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::error::{DiffError, Result};

/// Fill colour for canvas area not covered by an input
pub const PADDING_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Shared canvas size of two images
pub fn shared_size(a: &DynamicImage, b: &DynamicImage) -> (u32, u32) {
    (a.width().max(b.width()), a.height().max(b.height()))
}

/// Validate an input and copy it onto a canvas of `width × height`
///
/// Only 8-bit 3-channel images are accepted; anything else is reported as
/// [`DiffError::InvalidInput`] and no output is produced.
pub fn prepare_input(
    label: &'static str,
    input: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let rgb = match input {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            return Err(DiffError::InvalidInput {
                label,
                reason: format!("expected 8-bit RGB, got {:?}", other.color()),
            })
        }
    };
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(DiffError::InvalidInput {
            label,
            reason: "image is empty".to_string(),
        });
    }

    if rgb.width() == width && rgb.height() == height {
        return Ok(rgb.clone());
    }

    let mut canvas = RgbImage::from_pixel(width, height, PADDING_COLOR);
    let row_bytes = rgb.width() as usize * 3;
    let canvas_stride = width as usize * 3;
    let dst: &mut [u8] = &mut canvas;
    for (y, src_row) in rgb.as_raw().chunks_exact(row_bytes).enumerate() {
        let start = y * canvas_stride;
        dst[start..start + row_bytes].copy_from_slice(src_row);
    }
    Ok(canvas)
}

/// Luma of an RGB pixel with fixed integer BT.601-style weights
#[inline]
pub fn luma(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let value = 76 * r as u32 / 255 + 150 * g as u32 / 255 + 29 * b as u32 / 255;
    value.min(255) as u8
}

/// Washed-out grey rendering of an unchanged pixel
#[inline]
pub fn faded_grey(px: &Rgb<u8>) -> Rgb<u8> {
    let value = 127 + luma(px) / 2;
    Rgb([value, value, value])
}

/// Two-channel rendering of a changed pixel: old luma in red, new luma in green
#[inline]
pub fn change_color(old: &Rgb<u8>, new: &Rgb<u8>) -> Rgb<u8> {
    Rgb([luma(old), luma(new), 0])
}

/// Pixels that differ between the two canvases at identical coordinates
///
/// Returns the mask (255 = differs) and the number of differing pixels. This
/// ignores motion entirely.
pub fn difference_mask(baseline: &RgbImage, current: &RgbImage) -> (GrayImage, u64) {
    let mut mask = GrayImage::new(current.width(), current.height());
    let mut area = 0u64;
    for ((dst, a), b) in mask
        .pixels_mut()
        .zip(baseline.pixels())
        .zip(current.pixels())
    {
        if a != b {
            *dst = Luma([255]);
            area += 1;
        }
    }
    (mask, area)
}

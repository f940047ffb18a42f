//! Digit labels
//!
//! Arrow labels are displacement magnitudes, so only `0`–`9` are needed. Each
//! digit is a 3×5 bitmap drawn at [`SCALE`]× with one scaled column of
//! spacing between glyphs.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Pixel size of one bitmap cell
pub const SCALE: u32 = 2;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
const ADVANCE: u32 = (GLYPH_WIDTH + 1) * SCALE;

// One row per byte, bit 2 is the left column
#[rustfmt::skip]
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Width and height in pixels of rendered `text`
pub fn text_size(text: &str) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    let width = if chars == 0 {
        0
    } else {
        chars * ADVANCE - SCALE
    };
    (width, GLYPH_HEIGHT * SCALE)
}

/// Draw the digits of `text` with the bottom-left corner at `origin`
///
/// Characters other than ASCII digits leave a blank. Parts outside the
/// canvas are clipped.
pub fn draw_digits(canvas: &mut RgbImage, text: &str, origin: (i32, i32), color: Rgb<u8>) {
    let top = origin.1 - (GLYPH_HEIGHT * SCALE) as i32;
    for (i, ch) in text.chars().enumerate() {
        let Some(digit) = ch.to_digit(10) else {
            continue;
        };
        let left = origin.0 + (i as u32 * ADVANCE) as i32;
        for (row, bits) in DIGITS[digit as usize].iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let x = left + (col * SCALE) as i32;
                let y = top + (row as u32 * SCALE) as i32;
                draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(SCALE, SCALE), color);
            }
        }
    }
}

//! Motion Annotation
//!
//! Draws what moved on top of the residual visualization. Every maximal
//! 4-connected region of one nonzero displacement becomes either:
//!
//! - an arrow from where the content was to where it is now, labelled with
//!   the distance and outlined by the region's contour, or
//! - for regions smaller than [`MIN_ARROW_AREA`], a solid fill
//!
//! Annotations are drawn on a separate layer and blended 50/50 into the
//! visualization wherever the layer was touched.

use std::collections::HashMap;

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::Serialize;
use tracing::debug;

use crate::motion::{Displacement, MotionField};

pub mod glyphs;

/// Regions smaller than this are filled rather than given an arrow
pub const MIN_ARROW_AREA: u64 = 50;

/// Annotation colours, used in rotation
pub const PALETTE: [Rgb<u8>; 3] = [
    Rgb([0x00, 0x00, 0xff]),
    Rgb([0x00, 0x80, 0xff]),
    Rgb([0x80, 0x00, 0xff]),
];

/// Layer value meaning "nothing drawn here"
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Arrow head length relative to the arrow
const TIP_RATIO: f64 = 0.1;

/// Shortest arrow head in pixels
const MIN_TIP: f64 = 3.0;

/// How a region was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStyle {
    /// Arrow, distance label and outline
    Arrow,
    /// Solid fill
    Filled,
}

/// One annotated motion region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotionRegion {
    /// Displacement shared by every pixel of the region
    pub dy: i32,
    /// Pixel count
    pub area: u64,
    /// Mean pixel position, rounded down
    pub centroid: (u32, u32),
    /// Top-left and bottom-right (exclusive) corners
    pub bounds: ((u32, u32), (u32, u32)),
    /// Drawing style
    pub style: RegionStyle,
    /// Palette colour used
    pub color: [u8; 3],
}

/// Region statistics gathered in one raster pass
struct RegionStats {
    label: u32,
    dy: i32,
    area: u64,
    sum_x: u64,
    sum_y: u64,
    min: (u32, u32),
    max: (u32, u32),
}

impl RegionStats {
    fn new(label: u32, dy: i32, x: u32, y: u32) -> Self {
        Self {
            label,
            dy,
            area: 0,
            sum_x: 0,
            sum_y: 0,
            min: (x, y),
            max: (x, y),
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.min = (self.min.0.min(x), self.min.1.min(y));
        self.max = (self.max.0.max(x), self.max.1.max(y));
    }

    fn centroid(&self) -> (u32, u32) {
        ((self.sum_x / self.area) as u32, (self.sum_y / self.area) as u32)
    }
}

/// Annotate every moved region of `field` onto `visual`
///
/// Regions are processed in order of first appearance in a raster scan.
pub fn annotate_motion(visual: &mut RgbImage, field: &MotionField) -> Vec<MotionRegion> {
    let labels = label_regions(field);
    let regions = collect_regions(&labels, field);

    let mut layer = RgbImage::from_pixel(visual.width(), visual.height(), BACKGROUND);
    let mut arrow_index = 0usize;
    let mut fill_index = 0usize;
    let mut annotated = Vec::with_capacity(regions.len());

    for region in &regions {
        let (style, color) = if region.area < MIN_ARROW_AREA {
            let color = PALETTE[fill_index % PALETTE.len()];
            fill_index += 1;
            fill_region(&mut layer, &labels, region, color);
            (RegionStyle::Filled, color)
        } else {
            let color = PALETTE[arrow_index % PALETTE.len()];
            arrow_index += 1;
            draw_arrow_region(&mut layer, &labels, region, color);
            (RegionStyle::Arrow, color)
        };
        annotated.push(MotionRegion {
            dy: region.dy,
            area: region.area,
            centroid: region.centroid(),
            bounds: (region.min, (region.max.0 + 1, region.max.1 + 1)),
            style,
            color: color.0,
        });
    }

    blend(visual, &layer);
    debug!(
        regions = annotated.len(),
        arrows = arrow_index,
        fills = fill_index,
        "Motion annotated"
    );
    annotated
}

/// Connected components of equal nonzero displacement
///
/// Zero and unassigned cells share the background label.
fn label_regions(field: &MotionField) -> ImageBuffer<Luma<u32>, Vec<u32>> {
    let keys = ImageBuffer::from_fn(field.width() as u32, field.height() as u32, |x, y| {
        match field.get(x as usize, y as usize) {
            // Bit pattern of a nonzero shift is never 0
            Displacement::Found(dy) if dy != 0 => Luma([dy as u32]),
            _ => Luma([0u32]),
        }
    });
    connected_components(&keys, Connectivity::Four, Luma([0u32]))
}

fn collect_regions(labels: &ImageBuffer<Luma<u32>, Vec<u32>>, field: &MotionField) -> Vec<RegionStats> {
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut regions: Vec<RegionStats> = Vec::new();
    for (x, y, &Luma([label])) in labels.enumerate_pixels() {
        if label == 0 {
            continue;
        }
        let slot = *index.entry(label).or_insert_with(|| {
            let dy = field.get(x as usize, y as usize).dy().unwrap_or_default();
            regions.push(RegionStats::new(label, dy, x, y));
            regions.len() - 1
        });
        regions[slot].add(x, y);
    }
    regions
}

fn fill_region(
    layer: &mut RgbImage,
    labels: &ImageBuffer<Luma<u32>, Vec<u32>>,
    region: &RegionStats,
    color: Rgb<u8>,
) {
    for y in region.min.1..=region.max.1 {
        for x in region.min.0..=region.max.0 {
            if labels.get_pixel(x, y)[0] == region.label {
                layer.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_arrow_region(
    layer: &mut RgbImage,
    labels: &ImageBuffer<Luma<u32>, Vec<u32>>,
    region: &RegionStats,
    color: Rgb<u8>,
) {
    let (cx, cy) = region.centroid();
    let (cx, cy) = (cx as i32, cy as i32);
    draw_arrow(layer, (cx, cy + region.dy), (cx, cy), color);

    let text = region.dy.unsigned_abs().to_string();
    let (_, text_height) = glyphs::text_size(&text);
    let origin = (cx + 2, cy + region.dy / 2 + text_height as i32 / 2);
    glyphs::draw_digits(layer, &text, origin, color);

    draw_outline(layer, labels, region, color);
}

/// Line from `from` to `to` with a head at `to`
fn draw_arrow(layer: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let point = |p: (i32, i32)| (p.0 as f32, p.1 as f32);
    draw_line_segment_mut(layer, point(from), point(to), color);

    let (dx, dy) = ((from.0 - to.0) as f64, (from.1 - to.1) as f64);
    let tip = MIN_TIP.max(dx.hypot(dy) * TIP_RATIO);
    let angle = dy.atan2(dx);
    for side in [std::f64::consts::FRAC_PI_4, -std::f64::consts::FRAC_PI_4] {
        let head = (
            (to.0 as f64 + tip * (angle + side).cos()).round() as f32,
            (to.1 as f64 + tip * (angle + side).sin()).round() as f32,
        );
        draw_line_segment_mut(layer, head, point(to), color);
    }
}

/// Trace the region's borders and draw them as closed polylines
fn draw_outline(
    layer: &mut RgbImage,
    labels: &ImageBuffer<Luma<u32>, Vec<u32>>,
    region: &RegionStats,
    color: Rgb<u8>,
) {
    // Crop to the bounding box with a one-pixel empty margin
    let (x0, y0) = region.min;
    let width = region.max.0 - x0 + 3;
    let height = region.max.1 - y0 + 3;
    let crop = GrayImage::from_fn(width, height, |x, y| {
        let inside = x >= 1 && y >= 1 && x < width - 1 && y < height - 1;
        if inside && labels.get_pixel(x0 + x - 1, y0 + y - 1)[0] == region.label {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    let offset = (x0 as f32 - 1.0, y0 as f32 - 1.0);
    for contour in find_contours::<i32>(&crop) {
        let points: Vec<(f32, f32)> = contour
            .points
            .iter()
            .map(|p| (p.x as f32 + offset.0, p.y as f32 + offset.1))
            .collect();
        match points.as_slice() {
            [] => {}
            [only] => draw_line_segment_mut(layer, *only, *only, color),
            _ => {
                for pair in points.windows(2) {
                    draw_line_segment_mut(layer, pair[0], pair[1], color);
                }
                if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                    draw_line_segment_mut(layer, last, first, color);
                }
            }
        }
    }
}

/// Average `layer` into `visual` wherever the layer is not background
fn blend(visual: &mut RgbImage, layer: &RgbImage) {
    for (dst, src) in visual.pixels_mut().zip(layer.pixels()) {
        if *src == BACKGROUND {
            continue;
        }
        for (d, s) in dst.0.iter_mut().zip(src.0) {
            *d = *d / 2 + s / 2;
        }
    }
}

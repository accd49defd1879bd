//! Visualizing differences.
//!
//! Pixels whose local dissimilarity exceeds the threshold are tinted red over
//! the first (resized) image; everything else passes through unchanged.

use image::imageops;
use image::{Rgb, RgbImage};
use imgref::ImgRef;
use serde::Serialize;

/// Highlight color.
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Width of the gap between the two halves of a side-by-side composite.
pub const SEPARATOR_WIDTH: u32 = 4;

/// Color of that gap.
pub const SEPARATOR_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Columns covered.
    pub width: u32,
    /// Rows covered.
    pub height: u32,
}

impl Region {
    /// True if the pixel lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Blends [`HIGHLIGHT_COLOR`] at `opacity` over `base` wherever
/// `dissimilarity > threshold`.
///
/// # Panics
/// Panics if the map and image differ in size.
pub fn highlight_differences(
    base: &RgbImage,
    dissimilarity: ImgRef<'_, f32>,
    threshold: f32,
    opacity: f32,
) -> RgbImage {
    assert_eq!(
        (base.width() as usize, base.height() as usize),
        (dissimilarity.width(), dissimilarity.height()),
        "difference map must align with the image"
    );

    let mut out = base.clone();
    for (y, row) in dissimilarity.rows().enumerate() {
        for (x, &d) in row.iter().enumerate() {
            if d > threshold {
                let px = out.get_pixel_mut(x as u32, y as u32);
                *px = blend(*px, HIGHLIGHT_COLOR, opacity);
            }
        }
    }
    out
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, opacity: f32) -> Rgb<u8> {
    let mix = |u: u8, o: u8| {
        let v = f32::from(u) * (1.0 - opacity) + f32::from(o) * opacity;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
    ])
}

/// Bounding box of all pixels above `threshold`, or `None` if there are none.
pub fn changed_region(dissimilarity: ImgRef<'_, f32>, threshold: f32) -> Option<Region> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (y, row) in dissimilarity.rows().enumerate() {
        for (x, &d) in row.iter().enumerate() {
            if d > threshold {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    bounds.map(|(x0, y0, x1, y1)| Region {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0 + 1) as u32,
        height: (y1 - y0 + 1) as u32,
    })
}

/// Count of pixels above `threshold`.
pub fn highlighted_pixels(dissimilarity: ImgRef<'_, f32>, threshold: f32) -> usize {
    dissimilarity.pixels().filter(|&d| d > threshold).count()
}

/// Places `left` and `right` next to each other with a separator between.
///
/// # Panics
/// Panics if the images differ in size.
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
    assert_eq!(
        left.dimensions(),
        right.dimensions(),
        "side-by-side halves must share a shape"
    );
    let (width, height) = left.dimensions();
    let mut out = RgbImage::from_pixel(width * 2 + SEPARATOR_WIDTH, height, SEPARATOR_COLOR);
    imageops::replace(&mut out, left, 0, 0);
    imageops::replace(&mut out, right, i64::from(width + SEPARATOR_WIDTH), 0);
    out
}

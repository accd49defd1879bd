//! Bringing two grids to a common shape.
//!
//! Both inputs are converted to RGB and resized to the element-wise minimum of
//! their heights and widths with bilinear interpolation. Luma planes for
//! scoring use the BT.601 weights.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use log::debug;

use crate::{CompareError, PixelGrid, Shape};

/// Interpolation used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Channel count every grid is normalized to before scoring.
pub const NORMALIZED_CHANNELS: u8 = 3;

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Two color images of one shape plus their luma planes.
#[derive(Debug, Clone)]
pub struct NormalizedPair {
    /// First input, resized.
    pub first: RgbImage,
    /// Second input, resized.
    pub second: RgbImage,
    /// Luma of `first`.
    pub first_luma: GrayImage,
    /// Luma of `second`.
    pub second_luma: GrayImage,
}

impl NormalizedPair {
    /// The shared shape, always with [`NORMALIZED_CHANNELS`] channels.
    pub fn shape(&self) -> Shape {
        Shape::new(self.first.height(), self.first.width(), NORMALIZED_CHANNELS)
    }
}

/// Element-wise minimum of height and width.
pub fn common_shape(a: Shape, b: Shape) -> Shape {
    Shape::new(
        a.height.min(b.height),
        a.width.min(b.width),
        NORMALIZED_CHANNELS,
    )
}

/// Resizes both grids to their common shape and derives luma planes.
pub fn normalize_pair(a: &PixelGrid, b: &PixelGrid) -> Result<NormalizedPair, CompareError> {
    for grid in [a, b] {
        if grid.shape().is_empty() {
            return Err(CompareError::Dimension {
                origin: grid.origin().to_string(),
                width: grid.width(),
                height: grid.height(),
            });
        }
    }

    let target = common_shape(a.shape(), b.shape());
    debug!(
        "normalizing {} and {} to {}",
        a.shape(),
        b.shape(),
        target
    );

    let first = resize_to(a.to_rgb(), target.width, target.height);
    let second = resize_to(b.to_rgb(), target.width, target.height);
    let first_luma = to_luma(&first);
    let second_luma = to_luma(&second);

    Ok(NormalizedPair {
        first,
        second,
        first_luma,
        second_luma,
    })
}

/// Resizes with [`RESIZE_FILTER`]; returns the input untouched if it already
/// has the requested size.
pub fn resize_to(image: RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, RESIZE_FILTER)
}

/// BT.601 luma, rounded to the nearest integer.
pub fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = LUMA_R * f32::from(r) + LUMA_G * f32::from(g) + LUMA_B * f32::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}
